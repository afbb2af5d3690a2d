//! Periodic SET/RESET recalibration of the sensing element
//!
//! The magnetoresistive bridge slowly accumulates bias. Every
//! [`REFRESH_INTERVAL_MS`] the SET/RESET capacitor is refilled and a SET
//! pulse re-magnetizes the element before the next measurement.

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    clock::Clock,
    error::Error,
    register::{Control0Register, Register},
    transport::Transport,
};

/// Time between two recalibrations
pub const REFRESH_INTERVAL_MS: u64 = 15_000;

/// Time for the refill capacitor to reach operating charge
const REFILL_SETTLE_MS: u32 = 75;

/// Time for the SET pulse to complete
const SET_SETTLE_US: u32 = 1_000;

/// Recalibration deadline bookkeeping
#[derive(Debug, Default)]
pub(crate) struct RefreshController {
    /// `None` until the first recalibration, which makes it due immediately
    deadline_ms: Option<u64>,
}

impl RefreshController {
    /// Make the next measurement recalibrate, e.g. after a power cycle
    pub(crate) fn expire(&mut self) {
        self.deadline_ms = None;
    }

    fn is_due(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_none_or(|deadline| now_ms > deadline)
    }

    /// Recalibrate if the deadline has passed
    ///
    /// Re-issues the measurement trigger afterwards so the measurement that
    /// was pending before the SET pulse is replaced by a valid one.
    pub(crate) async fn run_if_due<I2C, D, C, P>(
        &mut self,
        bus: &mut Transport<I2C>,
        delay: &mut D,
        clock: &C,
    ) -> Result<(), Error<I2C::Error, P>>
    where
        I2C: I2c,
        D: DelayNs,
        C: Clock,
    {
        if !self.is_due(clock.now_ms()) {
            return Ok(());
        }

        write_control::<I2C, P>(bus, Control0Register::refill()).await?;
        delay.delay_ms(REFILL_SETTLE_MS).await;

        write_control::<I2C, P>(bus, Control0Register::set_pulse()).await?;
        delay.delay_us(SET_SETTLE_US).await;

        let deadline = clock.now_ms().saturating_add(REFRESH_INTERVAL_MS);
        self.deadline_ms = Some(deadline);

        #[cfg(feature = "defmt")]
        defmt::debug!("SET done, next recalibration after {} ms", deadline);

        write_control::<I2C, P>(bus, Control0Register::take_measurement()).await?;

        Ok(())
    }
}

async fn write_control<I2C: I2c, P>(
    bus: &mut Transport<I2C>,
    command: Control0Register,
) -> Result<(), Error<I2C::Error, P>> {
    bus.write_register(Register::Control0, u8::from(command))
        .await
        .map_err(Error::Communication)
}
