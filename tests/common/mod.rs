//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_hal::i2c::ErrorKind;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use mmc3416x_async::{Clock, Config, Error, Mmc3416x, MountingOrientation, Regulator};

pub const ADDR: u8 = 0x30;

pub const CMD_TM: u8 = 0x01;
pub const CMD_SET: u8 = 0x20;
pub const CMD_REFILL: u8 = 0x80;

pub type Driver = Mmc3416x<NoopRawMutex, I2cMock, FakeSupply, FakeSupply, TestDelay, TestClock>;
pub type DriverError = Error<ErrorKind, SupplyFault>;

/// Nanosecond clock advanced only by [`TestDelay`] or by hand
#[derive(Debug, Clone, Default)]
pub struct TestClock(Rc<Cell<u64>>);

impl TestClock {
    pub fn advance_ms(&self, ms: u64) {
        self.0.set(self.0.get() + ms * 1_000_000);
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }
}

/// Delay that advances the test clock and yields to the executor, so
/// concurrent callers get a chance to run in the middle of a sequence
#[derive(Debug, Clone)]
pub struct TestDelay {
    clock: TestClock,
}

impl DelayNs for TestDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let now = self.clock.0.get();
        self.clock.0.set(now + u64::from(ns));
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    SetVoltage(&'static str, u32, u32),
    Enable(&'static str),
    Disable(&'static str),
}

pub type OpLog = Rc<RefCell<Vec<Op>>>;

/// In-memory regulator that records every call and can be told to fail
#[derive(Debug, Clone)]
pub struct FakeSupply {
    name: &'static str,
    adjustable: bool,
    log: OpLog,
    on: Rc<Cell<bool>>,
    pub fail_set_voltage: Rc<Cell<bool>>,
    pub fail_enable: Rc<Cell<bool>>,
    pub fail_disable: Rc<Cell<bool>>,
}

impl FakeSupply {
    pub fn new(name: &'static str, adjustable: bool, log: &OpLog) -> Self {
        Self {
            name,
            adjustable,
            log: log.clone(),
            on: Rc::default(),
            fail_set_voltage: Rc::default(),
            fail_enable: Rc::default(),
            fail_disable: Rc::default(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    fn record(&self, op: Op, fail: &Cell<bool>) -> Result<(), SupplyFault> {
        self.log.borrow_mut().push(op);
        if fail.get() { Err(SupplyFault) } else { Ok(()) }
    }
}

impl Regulator for FakeSupply {
    type Error = SupplyFault;

    fn supports_voltage_range(&self) -> bool {
        self.adjustable
    }

    async fn set_voltage_range(&mut self, min_uv: u32, max_uv: u32) -> Result<(), SupplyFault> {
        self.record(Op::SetVoltage(self.name, min_uv, max_uv), &self.fail_set_voltage)
    }

    async fn enable(&mut self) -> Result<(), SupplyFault> {
        self.record(Op::Enable(self.name), &self.fail_enable)?;
        self.on.set(true);
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), SupplyFault> {
        self.record(Op::Disable(self.name), &self.fail_disable)?;
        self.on.set(false);
        Ok(())
    }
}

/// Supplies, clock and operation log of one simulated board
pub struct Bench {
    pub clock: TestClock,
    pub log: OpLog,
    pub vdd: FakeSupply,
    pub vio: FakeSupply,
}

impl Bench {
    pub fn new() -> Self {
        Self::with_adjustable_supplies(true)
    }

    pub fn with_adjustable_supplies(adjustable: bool) -> Self {
        let log = OpLog::default();
        Self {
            clock: TestClock::default(),
            vdd: FakeSupply::new("vdd", adjustable, &log),
            vio: FakeSupply::new("vio", adjustable, &log),
            log,
        }
    }

    pub fn delay(&self) -> TestDelay {
        TestDelay {
            clock: self.clock.clone(),
        }
    }

    pub fn ops(&self) -> Vec<Op> {
        self.log.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.log.borrow_mut().clear();
    }

    pub async fn attach(&self, i2c: &I2cMock, config: Config) -> Result<Driver, DriverError> {
        Driver::attach(
            i2c.clone(),
            self.vdd.clone(),
            self.vio.clone(),
            self.delay(),
            self.clock.clone(),
            config,
        )
        .await
    }

    /// Attach with the identity orientation
    pub async fn attach_identity(&self, i2c: &I2cMock) -> Driver {
        let config = Config {
            orientation: MountingOrientation::ObverseXAxisRightward,
            ..Config::default()
        };
        self.attach(i2c, config).await.unwrap()
    }
}

pub fn product_id(id: u8) -> I2cTransaction {
    I2cTransaction::write_read(ADDR, vec![0x20], vec![id])
}

pub fn status(done: bool) -> I2cTransaction {
    I2cTransaction::write_read(ADDR, vec![0x06], vec![u8::from(done)])
}

pub fn command(cmd: u8) -> I2cTransaction {
    I2cTransaction::write(ADDR, vec![0x07, cmd])
}

pub fn sample(x: u16, y: u16, z: u16) -> I2cTransaction {
    let mut data = Vec::with_capacity(6);
    for word in [x, y, z] {
        data.extend_from_slice(&word.to_le_bytes());
    }
    I2cTransaction::write_read(ADDR, vec![0x00], data)
}

/// Refill, SET and the replacement measurement trigger
pub fn recalibration() -> [I2cTransaction; 3] {
    [command(CMD_REFILL), command(CMD_SET), command(CMD_TM)]
}

/// A measurement cycle without recalibration
pub fn measurement(x: u16, y: u16, z: u16) -> [I2cTransaction; 3] {
    [status(true), sample(x, y, z), command(CMD_TM)]
}
