//! Debounced user button for the STM32F407G-DISC1.
//!
//! The debounce state machine and the capability traits it drives are plain
//! `no_std` Rust and are tested on the host. The `board` module binds them to
//! EXTI0, TIM7 and PA0 and only exists when building for the target.
//!
//! # Testing
//!
//! ```bash
//! cargo test --lib
//! ```

// Tests need std for the harness; the firmware itself is no_std
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod hardware;

#[cfg(target_arch = "arm")]
pub mod board;

pub use config::{ConfigError, DebounceConfig, Priorities};
pub use hardware::debouncer::{DebounceController, DebounceState};
pub use hardware::shared::SharedDebouncer;
pub use hardware::traits::{
    CallbackSink, DigitalInput, Edge, EdgeInterrupt, InputLine, Led, NoopSink, OneShotTimer,
    PinState, Polarity,
};
