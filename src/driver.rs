//! Asynchronous driver for MMC3416x magnetometer

use embassy_sync::{blocking_mutex::raw::RawMutex, mutex::Mutex};
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::{
    clock::Clock,
    error::Error,
    measurement::{self, Axis, Vector3},
    orientation::{MountingOrientation, UnknownOrientation},
    power::{PowerRails, Regulator},
    refresh::RefreshController,
    register::{Control0Register, DEFAULT_ADDRESS, PRODUCT_ID, Register},
    transport::Transport,
};

/// Static configuration of a sensor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// How the package is mounted on the board
    pub orientation: MountingOrientation,
    /// 7-bit I2C address
    pub address: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orientation: MountingOrientation::default(),
            address: DEFAULT_ADDRESS,
        }
    }
}

impl Config {
    /// Default configuration with the orientation given by its name
    ///
    /// # Errors
    ///
    /// Returns [`UnknownOrientation`] if `name` is not one of the eight
    /// orientation names, see [`MountingOrientation::name`]
    pub fn from_orientation_name(name: &str) -> Result<Self, UnknownOrientation> {
        Ok(Self {
            orientation: name.parse()?,
            ..Self::default()
        })
    }
}

/// Everything that is only touched while holding the device lock
struct State<I2C, VDD, VIO, D, C> {
    bus: Transport<I2C>,
    rails: PowerRails<VDD, VIO>,
    refresh: RefreshController,
    delay: D,
    clock: C,
}

impl<I2C, VDD, VIO, D, C> State<I2C, VDD, VIO, D, C>
where
    I2C: I2c,
    VDD: Regulator,
    VIO: Regulator<Error = VDD::Error>,
    D: DelayNs,
    C: Clock,
{
    async fn check_device(&mut self) -> Result<(), Error<I2C::Error, VDD::Error>> {
        let id = self
            .bus
            .read_register(Register::ProductId)
            .await
            .map_err(Error::Communication)?;

        if id != PRODUCT_ID {
            #[cfg(feature = "defmt")]
            defmt::error!("Product id mismatch: expected 0x{:02X}, got 0x{:02X}", PRODUCT_ID, id);
            return Err(Error::DeviceMismatch { found: id });
        }

        Ok(())
    }

    /// One full measurement cycle, always ending with a fresh trigger
    async fn measure(&mut self) -> Result<Vector3, Error<I2C::Error, VDD::Error>> {
        if !self.rails.is_enabled() {
            return Err(Error::PoweredDown);
        }

        let result = self.sample().await;

        // Keep a measurement in flight so the next call does not wait for
        // a full conversion
        if self
            .bus
            .write_register(Register::Control0, u8::from(Control0Register::take_measurement()))
            .await
            .is_err()
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to trigger the next measurement");
        }

        result
    }

    async fn sample(&mut self) -> Result<Vector3, Error<I2C::Error, VDD::Error>> {
        self.refresh
            .run_if_due::<I2C, D, C, VDD::Error>(&mut self.bus, &mut self.delay, &self.clock)
            .await?;

        let raw = measurement::acquire::<I2C, D, VDD::Error>(&mut self.bus, &mut self.delay).await?;

        Ok(raw.centered())
    }

    /// Orderly power down, falling back to a forced one
    async fn shut_down(&mut self) {
        if self.rails.power_down().await.is_err() {
            self.rails.force_off().await;
        }
    }
}

/// MMC3416x driver instance (asynchronous)
///
/// All operations are serialized by an internal mutex, so the driver can be
/// shared by reference between tasks. `M` selects the mutex flavour, e.g.
/// `NoopRawMutex` for a single executor or `CriticalSectionRawMutex` when
/// shared across executors.
pub struct Mmc3416x<M: RawMutex, I2C, VDD, VIO, D, C> {
    orientation: MountingOrientation,
    state: Mutex<M, State<I2C, VDD, VIO, D, C>>,
}

impl<M, I2C, VDD, VIO, D, C> Mmc3416x<M, I2C, VDD, VIO, D, C>
where
    M: RawMutex,
    I2C: I2c,
    VDD: Regulator,
    VIO: Regulator<Error = VDD::Error>,
    D: DelayNs,
    C: Clock,
{
    /// Power up the sensor and verify its product id
    ///
    /// `vdd` and `vio` must be off. If anything fails after the rails came
    /// up, they are switched off again and no driver is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the rails cannot be brought up, I2C communication
    /// fails, or the product id does not identify an MMC3416x
    pub async fn attach(
        i2c: I2C,
        vdd: VDD,
        vio: VIO,
        delay: D,
        clock: C,
        config: Config,
    ) -> Result<Self, Error<I2C::Error, VDD::Error>> {
        let mut state = State {
            bus: Transport::new(i2c, config.address),
            rails: PowerRails::new(vdd, vio),
            refresh: RefreshController::default(),
            delay,
            clock,
        };

        state.rails.power_up(&mut state.delay).await?;

        if let Err(err) = state.check_device().await {
            state.shut_down().await;
            return Err(err);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("MMC3416x attached, mounted {}", config.orientation);

        Ok(Self {
            orientation: config.orientation,
            state: Mutex::new(state),
        })
    }

    /// Power down the sensor and release the bus, supplies, delay and clock
    pub async fn release(self) -> (I2C, VDD, VIO, D, C) {
        let mut state = self.state.into_inner();
        state.shut_down().await;

        let (vdd, vio) = state.rails.release();
        (state.bus.release(), vdd, vio, state.delay, state.clock)
    }

    /// Mounting orientation applied to every reading
    #[must_use]
    pub fn orientation(&self) -> MountingOrientation {
        self.orientation
    }

    /// Whether both supply rails are up
    pub async fn is_powered(&self) -> bool {
        self.state.lock().await.rails.is_enabled()
    }

    /// Read the field vector in the board frame
    ///
    /// Adds about 77 ms of latency whenever the periodic SET recalibration
    /// is due.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor is powered down, I2C communication
    /// fails, or the measurement does not complete in time
    pub async fn read(&self) -> Result<Vector3, Error<I2C::Error, VDD::Error>> {
        let sensor_frame = self.state.lock().await.measure().await?;
        Ok(self.orientation.apply(sensor_frame))
    }

    /// Read a single channel of the field vector
    ///
    /// # Errors
    ///
    /// See [`Self::read`]
    pub async fn read_axis(&self, axis: Axis) -> Result<i32, Error<I2C::Error, VDD::Error>> {
        self.read().await.map(|v| v.component(axis))
    }

    /// Switch both supply rails on; does nothing if they already are
    ///
    /// The next read after the rails came up runs the SET recalibration.
    ///
    /// # Errors
    ///
    /// Returns an error if a regulator fails. VDD is switched off again if
    /// VIO fails.
    pub async fn power_up(&self) -> Result<(), Error<I2C::Error, VDD::Error>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let was_enabled = state.rails.is_enabled();
        state.rails.power_up(&mut state.delay).await?;
        if !was_enabled {
            state.refresh.expire();
        }

        Ok(())
    }

    /// Switch both supply rails off; does nothing if they already are
    ///
    /// # Errors
    ///
    /// Returns an error if a regulator fails. VDD is switched back on if VIO
    /// fails.
    pub async fn power_down(&self) -> Result<(), Error<I2C::Error, VDD::Error>> {
        let mut state = self.state.lock().await;
        state.rails.power_down().await?;
        Ok(())
    }
}
