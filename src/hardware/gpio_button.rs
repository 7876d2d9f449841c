use core::convert::Infallible;

use embedded_hal::digital::InputPin;

use super::traits::{DigitalInput, PinState, Polarity};

/// Push button on a GPIO input.
///
/// Works with any pin whose reads cannot fail, e.g. `embassy_stm32::gpio::Input`.
pub struct GpioButton<P> {
    pin: P,
    polarity: Polarity,
}

impl<P> GpioButton<P>
where
    P: InputPin<Error = Infallible>,
{
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    pub fn is_pressed(&mut self) -> bool {
        self.read() == PinState::Asserted
    }
}

impl<P> DigitalInput for GpioButton<P>
where
    P: InputPin<Error = Infallible>,
{
    fn read(&mut self) -> PinState {
        let high = match self.pin.is_high() {
            Ok(high) => high,
            Err(never) => match never {},
        };
        match (self.polarity, high) {
            (Polarity::ActiveHigh, true) | (Polarity::ActiveLow, false) => PinState::Asserted,
            _ => PinState::Deasserted,
        }
    }
}
