//! Supply rail sequencing
//!
//! The sensor has two supplies: VDD for the analog core and VIO for the I2C
//! interface. VDD always comes up first and goes down first. A failure
//! halfway through a transition is rolled back so the rails are never left
//! in a mixed state.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

/// VDD operating range in microvolts
pub const VDD_RANGE_UV: (u32, u32) = (2_000_000, 3_300_000);

/// VIO operating range in microvolts
pub const VIO_RANGE_UV: (u32, u32) = (1_750_000, 1_950_000);

/// Minimum time between VDD valid and the first bus access is 10 ms
const POWER_SETTLE_MS: u32 = 15;

/// A switchable, possibly adjustable, voltage supply
#[allow(async_fn_in_trait)]
pub trait Regulator {
    /// Error reported by the supply
    type Error;

    /// Whether [`Self::set_voltage_range`] has any effect on this supply
    fn supports_voltage_range(&self) -> bool {
        false
    }

    /// Constrain the output voltage to `min_uv..=max_uv`
    async fn set_voltage_range(&mut self, min_uv: u32, max_uv: u32) -> Result<(), Self::Error>;

    /// Turn the supply on
    async fn enable(&mut self) -> Result<(), Self::Error>;

    /// Turn the supply off
    async fn disable(&mut self) -> Result<(), Self::Error>;
}

/// Supply rail of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rail {
    /// Core supply (supply A)
    Vdd,
    /// Interface supply (supply B)
    Vio,
}

/// Regulator operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerStep {
    /// Constraining the output voltage range
    SetVoltage,
    /// Switching the supply on
    Enable,
    /// Switching the supply off
    Disable,
}

/// A rail transition failed
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerError<P> {
    /// Rail that was being switched
    pub rail: Rail,
    /// Operation that failed on that rail
    pub step: PowerStep,
    /// Error reported by the regulator
    pub source: P,
}

impl<P> PowerError<P> {
    fn at(rail: Rail, step: PowerStep) -> impl FnOnce(P) -> Self {
        move |source| Self { rail, step, source }
    }
}

/// The two supplies of the sensor together with their combined state
#[derive(Debug)]
pub(crate) struct PowerRails<VDD, VIO> {
    vdd: VDD,
    vio: VIO,
    enabled: bool,
}

impl<VDD, VIO> PowerRails<VDD, VIO>
where
    VDD: Regulator,
    VIO: Regulator<Error = VDD::Error>,
{
    /// Wrap two supplies that are currently off
    pub(crate) fn new(vdd: VDD, vio: VIO) -> Self {
        Self {
            vdd,
            vio,
            enabled: false,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn release(self) -> (VDD, VIO) {
        (self.vdd, self.vio)
    }

    /// Bring up VDD, then VIO, then wait for the sensor to come out of reset
    ///
    /// If VIO fails, VDD is switched off again and its voltage floor dropped
    /// before the error is returned.
    pub(crate) async fn power_up<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<(), PowerError<VDD::Error>> {
        if self.enabled {
            #[cfg(feature = "defmt")]
            defmt::warn!("Power up requested while already powered");
            return Ok(());
        }

        bring_up(&mut self.vdd, Rail::Vdd, VDD_RANGE_UV).await?;

        if let Err(err) = bring_up(&mut self.vio, Rail::Vio, VIO_RANGE_UV).await {
            #[cfg(feature = "defmt")]
            defmt::error!("VIO bring-up failed at {}, rolling back VDD", err.step);

            if relax_and_disable(&mut self.vdd, VDD_RANGE_UV.1).await.is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("VDD rollback failed");
            }
            return Err(err);
        }

        delay.delay_ms(POWER_SETTLE_MS).await;
        self.enabled = true;

        Ok(())
    }

    /// Switch off VDD, then VIO
    ///
    /// If VIO fails to switch off, VDD is switched back on so the sensor is
    /// left fully powered.
    pub(crate) async fn power_down(&mut self) -> Result<(), PowerError<VDD::Error>> {
        if !self.enabled {
            #[cfg(feature = "defmt")]
            defmt::warn!("Power down requested while already unpowered");
            return Ok(());
        }

        self.vdd
            .disable()
            .await
            .map_err(PowerError::at(Rail::Vdd, PowerStep::Disable))?;

        if let Err(source) = self.vio.disable().await {
            #[cfg(feature = "defmt")]
            defmt::error!("VIO disable failed, re-enabling VDD");

            if self.vdd.enable().await.is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("VDD re-enable failed");
            }
            return Err(PowerError {
                rail: Rail::Vio,
                step: PowerStep::Disable,
                source,
            });
        }

        self.enabled = false;

        Ok(())
    }

    /// Best-effort shutdown, ignoring individual failures
    ///
    /// Also drops the voltage floor of adjustable supplies so they may be
    /// shared with other consumers.
    pub(crate) async fn force_off(&mut self) {
        if relax_and_disable(&mut self.vio, VIO_RANGE_UV.1).await.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Forced VIO shutdown failed");
        }
        if relax_and_disable(&mut self.vdd, VDD_RANGE_UV.1).await.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Forced VDD shutdown failed");
        }
        self.enabled = false;
    }
}

async fn bring_up<R: Regulator>(
    regulator: &mut R,
    rail: Rail,
    (min_uv, max_uv): (u32, u32),
) -> Result<(), PowerError<R::Error>> {
    if regulator.supports_voltage_range() {
        regulator
            .set_voltage_range(min_uv, max_uv)
            .await
            .map_err(PowerError::at(rail, PowerStep::SetVoltage))?;
    }

    regulator
        .enable()
        .await
        .map_err(PowerError::at(rail, PowerStep::Enable))
}

async fn relax_and_disable<R: Regulator>(regulator: &mut R, max_uv: u32) -> Result<(), R::Error> {
    let relaxed = if regulator.supports_voltage_range() {
        regulator.set_voltage_range(0, max_uv).await
    } else {
        Ok(())
    };
    let disabled = regulator.disable().await;

    relaxed.and(disabled)
}

/// Fixed supply switched by a load-switch GPIO
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioRegulator<PIN> {
    pin: PIN,
    active_low: bool,
}

impl<PIN: OutputPin> GpioRegulator<PIN> {
    /// Supply that is on while `pin` is high
    pub fn new(pin: PIN) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Supply that is on while `pin` is low
    pub fn active_low(pin: PIN) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Release the GPIO, consuming the regulator
    pub fn release(self) -> PIN {
        self.pin
    }
}

impl<PIN: OutputPin> Regulator for GpioRegulator<PIN> {
    type Error = PIN::Error;

    async fn set_voltage_range(&mut self, _min_uv: u32, _max_uv: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn enable(&mut self) -> Result<(), Self::Error> {
        if self.active_low {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        }
    }

    async fn disable(&mut self) -> Result<(), Self::Error> {
        if self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}
