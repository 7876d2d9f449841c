//! STM32F407G-DISC1 interrupt-driven user button
//!
//! The four user LEDs chase clockwise (green, orange, red, blue), 500 ms each.
//! Every debounced press of the blue USER button lights all four at once; the
//! chase then switches them off again one by one.
//!
//! Hardware:
//!   - LEDs: PD12 green, PD13 orange, PD14 red, PD15 blue (active-high)
//!   - USER button: PA0, active-high, external pull-down
//!
//! The press is detected on EXTI0 (rising edge), debounced with TIM7 in
//! one-pulse mode, and forwarded from the TIM7 handler to the main task
//! through a `Signal`.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("button_exti is firmware for the STM32F407G-DISC1.");
    eprintln!("Build with --target thumbv7em-none-eabihf instead.");
}

#[cfg(target_arch = "arm")]
mod app {
    use defmt::{info, unwrap};
    use disc1_button_exti::board::{self, BoardSink};
    use disc1_button_exti::{InputLine, Led, Polarity};
    use disc1_button_exti::hardware::gpio_led::GpioLed;
    use embassy_executor::Spawner;
    use embassy_futures::select::{Either, select};
    use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;
    use embassy_time::{Duration, Instant, Timer};
    use {defmt_rtt as _, panic_probe as _};

    const STEP: Duration = Duration::from_millis(500);

    // Written from the TIM7 handler, awaited by the main task
    static PRESSED: Signal<CriticalSectionRawMutex, InputLine> = Signal::new();

    fn on_press(line: InputLine) {
        PRESSED.signal(line);
    }

    #[embassy_executor::main]
    async fn main(_spawner: Spawner) {
        let p = embassy_stm32::init(board::clock_config());
        info!("Button EXTI example");

        let mut leds = [
            GpioLed::new(Output::new(p.PD12, Level::Low, Speed::Low), Polarity::ActiveHigh),
            GpioLed::new(Output::new(p.PD13, Level::Low, Speed::Low), Polarity::ActiveHigh),
            GpioLed::new(Output::new(p.PD14, Level::Low, Speed::Low), Polarity::ActiveHigh),
            GpioLed::new(Output::new(p.PD15, Level::Low, Speed::Low), Polarity::ActiveHigh),
        ];

        let button = Input::new(p.PA0, Pull::Down);
        unwrap!(board::init_user_button(button, BoardSink::Handler(on_press)));

        loop {
            for i in 0..leds.len() {
                leds[i].on();

                let deadline = Instant::now() + STEP;
                loop {
                    match select(Timer::at(deadline), PRESSED.wait()).await {
                        Either::First(()) => break,
                        Either::Second(line) => {
                            info!("press on P{=u8}{=u8}", line.port(), line.pin());
                            leds.iter_mut().for_each(|led| led.on());
                        }
                    }
                }

                leds[i].off();
            }
        }
    }
}
