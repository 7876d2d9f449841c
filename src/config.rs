//! Board configuration for the debounced user button.
//!
//! Everything here is fixed at build time. `DebounceConfig::DEFAULT` is what
//! the board layer installs; the validation lives here so it can be tested on
//! the host.

use core::fmt;

use crate::hardware::traits::{Edge, InputLine};

/// Debounce interval in milliseconds.
pub const DEBOUNCE_MS: u32 = 20;

/// NVIC priority of the button's EXTI line (lower value = more urgent).
pub const EXTI_PRIORITY: u8 = 14;

/// NVIC priority of the debounce timer. Must be more urgent than
/// [`EXTI_PRIORITY`] so an expiration can preempt the edge handler.
pub const TIMER_PRIORITY: u8 = 13;

/// Implemented priority bits on the STM32F4 NVIC.
pub const NVIC_PRIO_BITS: u8 = 4;

/// TIM7 input clock: APB1 at 42 MHz, doubled for the timers.
pub const TIMER_CLOCK_HZ: u32 = 84_000_000;

/// Debounce timer counting rate (0.1 ms resolution).
pub const TIMER_TICK_HZ: u32 = 10_000;

/// Longest interval the 16-bit auto-reload register can hold at [`TIMER_TICK_HZ`].
pub const MAX_INTERVAL_MS: u32 = (u16::MAX as u32 + 1) * 1000 / TIMER_TICK_HZ;

/// The user button: PA0 (port A = 0), wired active-high with a pull-down.
pub const USER_BUTTON_LINE: InputLine = InputLine::new(0, 0);

/// Fatal configuration errors, reported once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum ConfigError {
    /// A debounce interval of zero would expire immediately.
    ZeroInterval,
    /// The interval does not fit the timer's auto-reload register.
    IntervalOutOfRange { interval_ms: u32, max_ms: u32 },
    /// A press is a single transition; only `Rising` or `Falling` can mark it.
    UnsupportedEdge,
    /// Priority level beyond the implemented NVIC bits.
    InvalidPriority(u8),
    /// The timer must preempt the edge handler, never the other way round.
    PriorityInversion { timer: u8, edge: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInterval => write!(f, "debounce interval must be non-zero"),
            Self::IntervalOutOfRange { interval_ms, max_ms } => {
                write!(f, "debounce interval {interval_ms} ms exceeds {max_ms} ms")
            }
            Self::UnsupportedEdge => write!(f, "only rising or falling edge triggers are supported"),
            Self::InvalidPriority(level) => {
                write!(f, "priority {level} needs more than {NVIC_PRIO_BITS} bits")
            }
            Self::PriorityInversion { timer, edge } => write!(
                f,
                "timer priority {timer} must be more urgent than edge priority {edge}"
            ),
        }
    }
}

/// Relative NVIC priorities of the two notification sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct Priorities {
    pub timer: u8,
    pub edge: u8,
}

impl Priorities {
    pub const DEFAULT: Self = Self {
        timer: TIMER_PRIORITY,
        edge: EXTI_PRIORITY,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = (1u8 << NVIC_PRIO_BITS) - 1;
        for level in [self.timer, self.edge] {
            if level > max {
                return Err(ConfigError::InvalidPriority(level));
            }
        }
        if self.timer >= self.edge {
            return Err(ConfigError::PriorityInversion {
                timer: self.timer,
                edge: self.edge,
            });
        }
        Ok(())
    }

    /// Raw value for the NVIC IPR register (priority in the upper bits).
    pub const fn to_nvic(level: u8) -> u8 {
        level << (8 - NVIC_PRIO_BITS)
    }
}

/// Everything the debounce pipeline needs to know at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct DebounceConfig {
    pub interval_ms: u32,
    pub edge: Edge,
    pub priorities: Priorities,
}

impl DebounceConfig {
    pub const DEFAULT: Self = Self {
        interval_ms: DEBOUNCE_MS,
        edge: Edge::Rising,
        priorities: Priorities::DEFAULT,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.edge == Edge::Both {
            return Err(ConfigError::UnsupportedEdge);
        }
        self.priorities.validate()
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// TIM7 prescaler register value for [`TIMER_TICK_HZ`].
pub const fn timer_prescaler() -> u16 {
    (TIMER_CLOCK_HZ / TIMER_TICK_HZ - 1) as u16
}

/// Auto-reload value giving exactly `interval_ms` in one-pulse mode.
///
/// The update event fires after `ARR + 1` ticks.
pub fn timer_reload(interval_ms: u32) -> Result<u16, ConfigError> {
    if interval_ms == 0 {
        return Err(ConfigError::ZeroInterval);
    }
    if interval_ms > MAX_INTERVAL_MS {
        return Err(ConfigError::IntervalOutOfRange {
            interval_ms,
            max_ms: MAX_INTERVAL_MS,
        });
    }
    let ticks = interval_ms * TIMER_TICK_HZ / 1000;
    Ok((ticks - 1) as u16)
}
