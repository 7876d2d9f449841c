use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, StatefulOutputPin};

use super::traits::{Led, Polarity};

/// LED on a GPIO output. The DISC1 user LEDs (PD12..PD15) are active-high.
pub struct GpioLed<P> {
    pin: P,
    polarity: Polarity,
}

impl<P> GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self { pin, polarity }
    }

    pub fn is_on(&mut self) -> bool {
        let high = match self.pin.is_set_high() {
            Ok(high) => high,
            Err(never) => match never {},
        };
        high == (self.polarity == Polarity::ActiveHigh)
    }
}

fn drive<P: OutputPin<Error = Infallible>>(pin: &mut P, high: bool) {
    let result = if high { pin.set_high() } else { pin.set_low() };
    if let Err(never) = result {
        match never {}
    }
}

impl<P> Led for GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn on(&mut self) {
        drive(&mut self.pin, self.polarity == Polarity::ActiveHigh);
    }

    fn off(&mut self) {
        drive(&mut self.pin, self.polarity == Polarity::ActiveLow);
    }

    fn toggle(&mut self) {
        if let Err(never) = self.pin.toggle() {
            match never {}
        }
    }
}
