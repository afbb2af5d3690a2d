#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod clock;
mod driver;
mod error;
mod measurement;
mod orientation;
mod power;
mod refresh;
mod register;
mod transport;

#[cfg(feature = "embassy-time")]
pub use clock::EmbassyClock;
pub use clock::Clock;
pub use driver::{Config, Mmc3416x};
pub use error::Error;
pub use measurement::{Axis, POLL_ATTEMPTS, RawSample, Vector3};
pub use orientation::{MountingOrientation, RotationMatrix, UnknownOrientation};
pub use power::{GpioRegulator, PowerError, PowerStep, Rail, Regulator, VDD_RANGE_UV, VIO_RANGE_UV};
pub use refresh::REFRESH_INTERVAL_MS;
pub use register::{
    Control0Register, DEFAULT_ADDRESS, PRODUCT_ID, Register, StatusRegister,
};
