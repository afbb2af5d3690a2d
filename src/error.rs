use crate::{orientation::UnknownOrientation, power::PowerError};

/// Error type for MMC3416x operations
///
/// `E` is the I2C bus error, `P` the error reported by the supply regulators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E, P> {
    /// Communication error with the sensor
    Communication(E),
    /// The data-ready bit never came up within the polling budget
    PollTimeout,
    /// The product id register did not identify an MMC3416x
    DeviceMismatch {
        /// Product id that was read back
        found: u8,
    },
    /// The configured mounting orientation is not one of the known names
    Configuration,
    /// Bringing a supply rail up or down failed
    Power(PowerError<P>),
    /// The sensor rails are off; no bus traffic was attempted
    PoweredDown,
}

impl<E, P> From<PowerError<P>> for Error<E, P> {
    fn from(err: PowerError<P>) -> Self {
        Error::Power(err)
    }
}

impl<E, P> From<UnknownOrientation> for Error<E, P> {
    fn from(_: UnknownOrientation) -> Self {
        Error::Configuration
    }
}
