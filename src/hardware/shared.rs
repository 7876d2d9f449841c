//! Interrupt-safe home for one debounce controller and its press sink.
//!
//! The controller and the sink sit in separate slots. Transitions run inside
//! a short critical section; the sink runs after it is released, so a slow
//! press handler never holds off other interrupts.

use core::cell::RefCell;

use critical_section::Mutex;

use super::debouncer::DebounceController;
use super::traits::{CallbackSink, DigitalInput, EdgeInterrupt, NoopSink, OneShotTimer};

pub struct SharedDebouncer<I, E, T, S> {
    controller: Mutex<RefCell<Option<DebounceController<I, E, T, NoopSink>>>>,
    sink: Mutex<RefCell<Option<S>>>,
}

impl<I, E, T, S> SharedDebouncer<I, E, T, S> {
    pub const fn new() -> Self {
        Self {
            controller: Mutex::new(RefCell::new(None)),
            sink: Mutex::new(RefCell::new(None)),
        }
    }
}

impl<I, E, T, S> SharedDebouncer<I, E, T, S>
where
    I: DigitalInput,
    E: EdgeInterrupt,
    T: OneShotTimer,
    S: CallbackSink,
{
    /// Store a configured controller and the sink that receives its presses.
    pub fn install(&self, controller: DebounceController<I, E, T, NoopSink>, sink: S) {
        critical_section::with(|cs| {
            self.controller.borrow(cs).replace(Some(controller));
            self.sink.borrow(cs).replace(Some(sink));
        });
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.controller.borrow(cs).borrow().is_some())
    }

    /// Forward an edge notification. No-op until installed.
    pub fn on_edge(&self) {
        critical_section::with(|cs| {
            if let Some(controller) = self.controller.borrow_ref_mut(cs).as_mut() {
                controller.on_edge();
            }
        });
    }

    /// Forward an expiration, then deliver a confirmed press outside the lock.
    ///
    /// Must only be called from one context (the timer handler): the sink is
    /// taken out of its slot while it runs.
    pub fn on_timer_expired(&self) {
        let press = critical_section::with(|cs| {
            self.controller
                .borrow_ref_mut(cs)
                .as_mut()
                .and_then(|controller| controller.expire())
        });
        let Some(line) = press else {
            return;
        };

        let Some(mut sink) = critical_section::with(|cs| self.sink.borrow(cs).take()) else {
            return;
        };
        sink.on_press(line);
        critical_section::with(|cs| {
            self.sink.borrow(cs).replace(Some(sink));
        });
    }
}

impl<I, E, T, S> Default for SharedDebouncer<I, E, T, S> {
    fn default() -> Self {
        Self::new()
    }
}
