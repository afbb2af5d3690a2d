//! Register addresses for MMC3416x sensor.

/// Default 7-bit I2C address
pub const DEFAULT_ADDRESS: u8 = 0x30;

/// Value of [`Register::ProductId`] on a genuine MMC3416x
pub const PRODUCT_ID: u8 = 0x06;

/// Register addresses for MMC3416x
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[repr(u8)]
pub enum Register {
    /// X output, low byte. Start of the 6-byte sample block
    XoutLow = 0x00,
    /// X output, high byte
    XoutHigh = 0x01,
    /// Y output, low byte
    YoutLow = 0x02,
    /// Y output, high byte
    YoutHigh = 0x03,
    /// Z output, low byte
    ZoutLow = 0x04,
    /// Z output, high byte
    ZoutHigh = 0x05,
    /// Device status
    Status = 0x06,
    /// Internal control 0
    Control0 = 0x07,
    /// Internal control 1
    Control1 = 0x08,
    /// Product id
    ProductId = 0x20,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg as u8
    }
}

bitfield::bitfield! {
    /// STATUS
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct StatusRegister(u8);
    impl Debug;
    u8;
    /// Measurement done: a triggered measurement can be read from the output
    /// registers
    pub meas_done, _: 0;
}

bitfield::bitfield! {
    /// CONTROL0
    ///
    /// All bits are self-clearing commands, so the register is only ever
    /// written with a single command bit set
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Control0Register(u8);
    impl Debug;
    u8;
    /// Refill the capacitor that drives the SET/RESET coil
    pub refill_cap, set_refill_cap: 7;
    /// RESET pulse (reverse polarity, unused by this driver)
    pub reset, set_reset: 6;
    /// SET pulse: magnetize the sensing element into its reference state
    pub set, set_set: 5;
    /// Disable the charge pump boost
    pub no_boost, set_no_boost: 4;
    /// Continuous measurement mode
    pub cm, set_cm: 1;
    /// Take a single measurement
    pub tm, set_tm: 0;
}

impl From<u8> for StatusRegister {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<Control0Register> for u8 {
    fn from(reg: Control0Register) -> u8 {
        reg.0
    }
}

impl Control0Register {
    /// Trigger a single measurement
    #[must_use]
    pub fn take_measurement() -> Self {
        let mut reg = Self(0);
        reg.set_tm(true);
        reg
    }

    /// Issue a SET pulse
    #[must_use]
    pub fn set_pulse() -> Self {
        let mut reg = Self(0);
        reg.set_set(true);
        reg
    }

    /// Recharge the SET/RESET capacitor (degauss)
    #[must_use]
    pub fn refill() -> Self {
        let mut reg = Self(0);
        reg.set_refill_cap(true);
        reg
    }
}
