//! Register access over I2C

use embedded_hal_async::i2c::I2c;

use crate::register::Register;

/// I2C register transport bound to one device address
#[derive(Debug)]
pub(crate) struct Transport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Transport<I2C> {
    pub(crate) fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub(crate) fn release(self) -> I2C {
        self.i2c
    }

    /// Read a single register
    pub(crate) async fn read_register(&mut self, register: Register) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[u8::from(register)], &mut buf)
            .await?;

        #[cfg(feature = "defmt")]
        defmt::trace!("Register 0x{:02X} value: 0x{:02X}", u8::from(register), buf[0]);

        Ok(buf[0])
    }

    /// Write a single register
    pub(crate) async fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), I2C::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("Writing 0x{:02X} to register 0x{:02X}", value, u8::from(register));

        self.i2c
            .write(self.address, &[u8::from(register), value])
            .await
    }

    /// Read `buf.len()` consecutive registers starting at `register`
    pub(crate) async fn bulk_read(
        &mut self,
        register: Register,
        buf: &mut [u8],
    ) -> Result<(), I2C::Error> {
        self.i2c
            .write_read(self.address, &[u8::from(register)], buf)
            .await
    }
}
