//! STM32F407G-DISC1 user button in polled mode
//!
//! The USER button (PA0) is read every 10 ms without EXTI or the debounce
//! timer. The blue LED (PD15) follows the button level; each change is logged
//! once, using the LED's own state to notice it.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("button_poll is firmware for the STM32F407G-DISC1.");
    eprintln!("Build with --target thumbv7em-none-eabihf instead.");
}

#[cfg(target_arch = "arm")]
mod app {
    use defmt::info;
    use disc1_button_exti::board;
    use disc1_button_exti::hardware::gpio_led::GpioLed;
    use disc1_button_exti::{Led, Polarity};
    use embassy_executor::Spawner;
    use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
    use embassy_time::Timer;
    use {defmt_rtt as _, panic_probe as _};

    #[embassy_executor::main]
    async fn main(_spawner: Spawner) {
        let p = embassy_stm32::init(board::clock_config());
        info!("Button poll example");

        let mut button = board::user_button_polled(Input::new(p.PA0, Pull::Down));
        let mut blue = GpioLed::new(Output::new(p.PD15, Level::Low, Speed::Low), Polarity::ActiveHigh);

        loop {
            let pressed = button.is_pressed();
            if pressed != blue.is_on() {
                if pressed {
                    info!("pressed");
                    blue.on();
                } else {
                    info!("released");
                    blue.off();
                }
            }
            Timer::after_millis(10).await;
        }
    }
}
