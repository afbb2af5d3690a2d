//! GPIO load-switch regulator.

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use mmc3416x_async::{GpioRegulator, Regulator};

#[tokio::test]
async fn drives_enable_pin_high_when_on() {
    let expectations = [
        PinTransaction::set(State::High),
        PinTransaction::set(State::Low),
    ];
    let pin = PinMock::new(&expectations);
    let mut rail = GpioRegulator::new(pin);

    assert!(!rail.supports_voltage_range());
    rail.enable().await.unwrap();
    rail.disable().await.unwrap();

    rail.release().done();
}

#[tokio::test]
async fn active_low_switch_is_inverted() {
    let expectations = [
        PinTransaction::set(State::Low),
        PinTransaction::set(State::High),
    ];
    let pin = PinMock::new(&expectations);
    let mut rail = GpioRegulator::active_low(pin);

    rail.enable().await.unwrap();
    // Fixed supply: range requests are accepted without touching the pin
    rail.set_voltage_range(1_750_000, 1_950_000).await.unwrap();
    rail.disable().await.unwrap();

    rail.release().done();
}
