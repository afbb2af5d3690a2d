//! Measurement polling and sample decoding

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    error::Error,
    register::{Register, StatusRegister},
    transport::Transport,
};

/// Number of status reads before a measurement is declared lost
pub const POLL_ATTEMPTS: u8 = 10;

/// Pause between two status reads
const POLL_INTERVAL_US: u32 = 1_000;

/// Offset of the unsigned output words; a zero field reads as 0x8000
const ZERO_OFFSET: i32 = 32_768;

/// Output channel of the magnetometer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Channel 0
    X,
    /// Channel 1
    Y,
    /// Channel 2
    Z,
}

impl Axis {
    /// All channels in index order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Map a channel index (0, 1, 2) to its axis
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }

    /// Channel index of this axis
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Signed integer field vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    /// X component
    pub x: i32,
    /// Y component
    pub y: i32,
    /// Z component
    pub z: i32,
}

impl Vector3 {
    /// Vector from its three components
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`
    #[must_use]
    pub const fn component(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Raw output words as read from the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// X, Y and Z output words, offset by 0x8000
    pub words: [u16; 3],
}

impl RawSample {
    /// Parse the 6-byte output block (three little-endian words)
    #[must_use]
    pub fn from_le_bytes(bytes: [u8; 6]) -> Self {
        Self {
            words: [
                u16::from_le_bytes([bytes[0], bytes[1]]),
                u16::from_le_bytes([bytes[2], bytes[3]]),
                u16::from_le_bytes([bytes[4], bytes[5]]),
            ],
        }
    }

    /// Remove the zero offset, giving the field in the sensor frame
    ///
    /// The Z coil is wired inverted, so Z is negated here.
    #[must_use]
    pub fn centered(&self) -> Vector3 {
        let [x, y, z] = self.words.map(|w| i32::from(w) - ZERO_OFFSET);
        Vector3 { x, y, z: -z }
    }
}

/// Wait for the pending measurement and read it out
///
/// Reads the status register at most [`POLL_ATTEMPTS`] times, sleeping
/// between attempts. Bus errors abort immediately.
pub(crate) async fn acquire<I2C, D, P>(
    bus: &mut Transport<I2C>,
    delay: &mut D,
) -> Result<RawSample, Error<I2C::Error, P>>
where
    I2C: I2c,
    D: DelayNs,
{
    let mut attempts = 0;
    loop {
        let status = bus
            .read_register(Register::Status)
            .await
            .map(StatusRegister::from)
            .map_err(Error::Communication)?;
        attempts += 1;

        if status.meas_done() {
            break;
        }

        if attempts >= POLL_ATTEMPTS {
            #[cfg(feature = "defmt")]
            defmt::error!("Measurement not done after {} status reads", attempts);
            return Err(Error::PollTimeout);
        }

        delay.delay_us(POLL_INTERVAL_US).await;
    }

    let mut data = [0u8; 6];
    bus.bulk_read(Register::XoutLow, &mut data)
        .await
        .map_err(Error::Communication)?;

    Ok(RawSample::from_le_bytes(data))
}
