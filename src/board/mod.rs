//! STM32F407G-DISC1 board layer.
//!
//! Binds the debounce controller to the user button (PA0), EXTI0 and TIM7,
//! and owns the two interrupt handlers that drive it.
//!
//! The controller and its sink are stored in one global [`SharedDebouncer`].
//! It is written once by [`init_user_button`] before either interrupt is
//! enabled in the NVIC, and after that only the `EXTI0` and `TIM7` handlers
//! touch it. The press sink runs from `TIM7` with interrupts enabled.

pub mod exti;
pub mod one_pulse;

use embassy_stm32::gpio::{Input, Output};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};

use crate::config::{ConfigError, DebounceConfig, Priorities, USER_BUTTON_LINE};
use crate::hardware::debouncer::DebounceController;
use crate::hardware::gpio_button::GpioButton;
use crate::hardware::gpio_led::GpioLed;
use crate::hardware::shared::SharedDebouncer;
use crate::hardware::traits::{CallbackSink, InputLine, Led, NoopSink, Polarity};

use self::exti::ExtiLine;
use self::one_pulse::OnePulseTimer;

/// Application press handler, installed once at startup.
pub type PressHandler = fn(InputLine);

/// Where confirmed presses go.
pub enum BoardSink {
    /// Application-supplied handler.
    Handler(PressHandler),
    /// Board default: toggle an indicator LED (the orange one on the DISC1).
    ToggleIndicator(GpioLed<Output<'static>>),
}

impl BoardSink {
    pub fn indicator(led: Output<'static>) -> Self {
        Self::ToggleIndicator(GpioLed::new(led, Polarity::ActiveHigh))
    }
}

impl CallbackSink for BoardSink {
    fn on_press(&mut self, line: InputLine) {
        match self {
            Self::Handler(handler) => handler(line),
            Self::ToggleIndicator(led) => led.toggle(),
        }
    }
}

static BUTTON: SharedDebouncer<GpioButton<Input<'static>>, ExtiLine, OnePulseTimer, BoardSink> =
    SharedDebouncer::new();

/// Clock tree expected by [`crate::config::TIMER_CLOCK_HZ`]:
/// HSE 8 MHz → PLL 168 MHz, APB1 42 MHz (timers 84 MHz).
pub fn clock_config() -> embassy_stm32::Config {
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        use embassy_stm32::time::Hertz;
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL168,
            divp: Some(PllPDiv::DIV2), // 168 MHz
            divq: Some(PllQDiv::DIV7), // 48 MHz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
    }
    config
}

/// Configure the interrupt-driven debounced user button.
///
/// `pin` must be PA0 configured as an input with pull-down. Call once, from
/// thread mode, before anything else enables `EXTI0` or `TIM7`. On return the
/// button is armed and presses are delivered to `sink`.
pub fn init_user_button(pin: Input<'static>, sink: BoardSink) -> Result<(), ConfigError> {
    let config = DebounceConfig::DEFAULT;
    let mut controller = DebounceController::new(
        USER_BUTTON_LINE,
        GpioButton::new(pin, Polarity::ActiveHigh),
        ExtiLine::new(USER_BUTTON_LINE),
        OnePulseTimer::new(),
        NoopSink,
        config,
    );
    controller.configure()?;
    BUTTON.install(controller, sink);

    let Priorities { timer, edge } = config.priorities;
    interrupt::TIM7.set_priority(Priority::from(Priorities::to_nvic(timer)));
    interrupt::EXTI0.set_priority(Priority::from(Priorities::to_nvic(edge)));
    // SAFETY: both handlers below only touch BUTTON, which is now populated.
    unsafe {
        interrupt::TIM7.enable();
        interrupt::EXTI0.enable();
    }

    info!("user button armed (EXTI0 prio {=u8}, TIM7 prio {=u8})", edge, timer);
    Ok(())
}

/// Polled user button: plain GPIO reads, no EXTI line and no debounce timer.
///
/// `pin` must be PA0 configured as an input with pull-down. Do not combine
/// with [`init_user_button`]; both take the same pin.
pub fn user_button_polled(pin: Input<'static>) -> GpioButton<Input<'static>> {
    info!("user button in polled mode");
    GpioButton::new(pin, Polarity::ActiveHigh)
}

#[interrupt]
fn EXTI0() {
    if !exti::pending(USER_BUTTON_LINE) {
        return;
    }
    BUTTON.on_edge();
}

#[interrupt]
fn TIM7() {
    if !one_pulse::take_update() {
        return;
    }
    BUTTON.on_timer_expired();
}
