//! STM32F407G-DISC1 debounced button with the board's default press action
//!
//! No application handler is installed, so every debounced press of the USER
//! button (PA0) toggles the orange LED (PD13). The green LED (PD12) is a
//! one-second heartbeat showing the main task keeps running while the
//! button is handled entirely in interrupt context.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(not(target_arch = "arm"))]
fn main() {
    eprintln!("button_toggle is firmware for the STM32F407G-DISC1.");
    eprintln!("Build with --target thumbv7em-none-eabihf instead.");
}

#[cfg(target_arch = "arm")]
mod app {
    use defmt::{info, unwrap};
    use disc1_button_exti::board::{self, BoardSink};
    use disc1_button_exti::hardware::gpio_led::GpioLed;
    use disc1_button_exti::{Led, Polarity};
    use embassy_executor::Spawner;
    use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
    use embassy_time::Timer;
    use {defmt_rtt as _, panic_probe as _};

    #[embassy_executor::main]
    async fn main(_spawner: Spawner) {
        let p = embassy_stm32::init(board::clock_config());
        info!("Button toggle example");

        let orange = Output::new(p.PD13, Level::Low, Speed::Low);
        let mut heartbeat = GpioLed::new(Output::new(p.PD12, Level::Low, Speed::Low), Polarity::ActiveHigh);

        let button = Input::new(p.PA0, Pull::Down);
        unwrap!(board::init_user_button(button, BoardSink::indicator(orange)));

        loop {
            heartbeat.toggle();
            Timer::after_millis(1000).await;
        }
    }
}
