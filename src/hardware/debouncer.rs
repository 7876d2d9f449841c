//! Edge-triggered debounce state machine.
//!
//! A raw edge masks its interrupt line and starts a one-shot timer. When the
//! timer expires the line is re-armed first, then the input is sampled once:
//! still asserted means a press. There is no counter and no history, so a
//! glitch costs exactly one debounce interval of blindness.
//!
//! ```text
//!            edge: ack, mask, start
//!   ARMED ───────────────────────────▶ DEBOUNCING
//!     ▲                                    │
//!     └────────────────────────────────────┘
//!      expired: unmask, sample, on_press if asserted
//! ```
//!
//! Both entry points are meant to be called straight from the interrupt
//! handlers and never block.

use crate::config::{ConfigError, DebounceConfig};

use super::traits::{
    CallbackSink, DigitalInput, EdgeInterrupt, InputLine, OneShotTimer, PinState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum DebounceState {
    /// Constructed, `configure` not yet called. Notifications are ignored.
    Unconfigured,
    /// Interrupt unmasked, timer idle.
    Armed,
    /// Interrupt masked, timer running.
    Debouncing,
}

/// Owns the three capabilities of one input line plus the press sink.
pub struct DebounceController<I, E, T, S> {
    line: InputLine,
    input: I,
    edge: E,
    timer: T,
    sink: S,
    config: DebounceConfig,
    state: DebounceState,
}

impl<I, E, T, S> DebounceController<I, E, T, S>
where
    I: DigitalInput,
    E: EdgeInterrupt,
    T: OneShotTimer,
    S: CallbackSink,
{
    pub fn new(line: InputLine, input: I, edge: E, timer: T, sink: S, config: DebounceConfig) -> Self {
        Self {
            line,
            input,
            edge,
            timer,
            sink,
            config,
            state: DebounceState::Unconfigured,
        }
    }

    /// Program the edge trigger and the timer, then arm the line.
    ///
    /// Must run before notifications are enabled. Calling it again yields the
    /// same `Armed` state and interval.
    pub fn configure(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.edge.configure(self.config.edge)?;
        self.timer.configure(self.config.interval_ms)?;

        self.edge.acknowledge();
        self.edge.unmask();
        self.state = DebounceState::Armed;

        info!(
            "debounce configured: line P{=u8}{=u8}, {=u32} ms",
            self.line.port(),
            self.line.pin(),
            self.config.interval_ms
        );
        Ok(())
    }

    /// Edge notification from the interrupt line.
    pub fn on_edge(&mut self) {
        if self.state != DebounceState::Armed {
            // Raced the mask; the run in progress already covers this edge.
            return;
        }

        self.edge.acknowledge();
        self.edge.mask();
        self.timer.start();
        self.state = DebounceState::Debouncing;
        trace!("edge: debouncing");
    }

    /// Expiration notification from the one-shot timer.
    pub fn on_timer_expired(&mut self) {
        if let Some(line) = self.expire() {
            self.sink.on_press(line);
        }
    }

    /// Expiration without dispatch: re-arm, sample, and return the line if
    /// the press is confirmed. The caller delivers it to a sink of its own.
    pub fn expire(&mut self) -> Option<InputLine> {
        if self.state != DebounceState::Debouncing {
            warn!("debounce timer expired while not debouncing");
            return None;
        }

        // Re-arm before anything can go wrong in the sample or the sink.
        // Edges seen while masked are stale.
        self.edge.acknowledge();
        self.edge.unmask();
        self.state = DebounceState::Armed;

        if self.input.read() == PinState::Asserted {
            debug!("press confirmed");
            Some(self.line)
        } else {
            trace!("bounce discarded");
            None
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn interval_ms(&self) -> u32 {
        self.config.interval_ms
    }

    pub fn line(&self) -> InputLine {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEBOUNCE_MS, Priorities};
    use crate::hardware::traits::Edge;
    use core::cell::{Cell, RefCell};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    const LINE: InputLine = InputLine::new(0, 0);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        EdgeConfigure(Edge),
        Mask,
        Unmask,
        Acknowledge,
        TimerConfigure(u32),
        Start,
        Read,
        Press(InputLine),
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct FakeInput {
        log: Log,
        level: Rc<Cell<PinState>>,
    }

    impl DigitalInput for FakeInput {
        fn read(&mut self) -> PinState {
            self.log.borrow_mut().push(Call::Read);
            self.level.get()
        }
    }

    struct FakeEdge {
        log: Log,
        masked: Rc<Cell<bool>>,
    }

    impl EdgeInterrupt for FakeEdge {
        fn configure(&mut self, edge: Edge) -> Result<(), ConfigError> {
            self.log.borrow_mut().push(Call::EdgeConfigure(edge));
            Ok(())
        }

        fn mask(&mut self) {
            self.masked.set(true);
            self.log.borrow_mut().push(Call::Mask);
        }

        fn unmask(&mut self) {
            self.masked.set(false);
            self.log.borrow_mut().push(Call::Unmask);
        }

        fn acknowledge(&mut self) {
            self.log.borrow_mut().push(Call::Acknowledge);
        }
    }

    struct FakeTimer {
        log: Log,
        max_ms: u32,
    }

    impl OneShotTimer for FakeTimer {
        fn configure(&mut self, interval_ms: u32) -> Result<(), ConfigError> {
            if interval_ms > self.max_ms {
                return Err(ConfigError::IntervalOutOfRange {
                    interval_ms,
                    max_ms: self.max_ms,
                });
            }
            self.log.borrow_mut().push(Call::TimerConfigure(interval_ms));
            Ok(())
        }

        fn start(&mut self) {
            self.log.borrow_mut().push(Call::Start);
        }
    }

    struct Rig {
        log: Log,
        level: Rc<Cell<PinState>>,
        masked: Rc<Cell<bool>>,
        controller: DebounceController<FakeInput, FakeEdge, FakeTimer, Box<dyn FnMut(InputLine)>>,
    }

    impl Rig {
        fn with_config(config: DebounceConfig) -> Self {
            let log: Log = Rc::default();
            let level = Rc::new(Cell::new(PinState::Deasserted));
            let masked = Rc::new(Cell::new(true));
            let sink_log = log.clone();
            let sink: Box<dyn FnMut(InputLine)> =
                Box::new(move |line| sink_log.borrow_mut().push(Call::Press(line)));
            let controller = DebounceController::new(
                LINE,
                FakeInput {
                    log: log.clone(),
                    level: level.clone(),
                },
                FakeEdge {
                    log: log.clone(),
                    masked: masked.clone(),
                },
                FakeTimer {
                    log: log.clone(),
                    max_ms: 6553,
                },
                sink,
                config,
            );
            Self {
                log,
                level,
                masked,
                controller,
            }
        }

        fn configured() -> Self {
            let mut rig = Self::with_config(DebounceConfig::DEFAULT);
            rig.controller.configure().unwrap();
            rig.log.borrow_mut().clear();
            rig
        }

        fn take_log(&self) -> Vec<Call> {
            self.log.borrow_mut().drain(..).collect()
        }

        fn presses(&self) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|c| matches!(c, Call::Press(_)))
                .count()
        }
    }

    #[test]
    fn test_new_is_unconfigured() {
        let rig = Rig::with_config(DebounceConfig::DEFAULT);
        assert_eq!(rig.controller.state(), DebounceState::Unconfigured);
        assert_eq!(rig.controller.line(), LINE);
        assert!(rig.take_log().is_empty());
    }

    #[test]
    fn test_configure_arms_line() {
        let mut rig = Rig::with_config(DebounceConfig::DEFAULT);
        rig.controller.configure().unwrap();

        assert_eq!(rig.controller.state(), DebounceState::Armed);
        assert_eq!(rig.controller.interval_ms(), DEBOUNCE_MS);
        assert!(!rig.masked.get());
        assert_eq!(
            rig.take_log(),
            [
                Call::EdgeConfigure(Edge::Rising),
                Call::TimerConfigure(DEBOUNCE_MS),
                Call::Acknowledge,
                Call::Unmask,
            ]
        );
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut rig = Rig::with_config(DebounceConfig::DEFAULT);
        rig.controller.configure().unwrap();
        let first = rig.take_log();
        rig.controller.configure().unwrap();
        let second = rig.take_log();

        assert_eq!(first, second);
        assert_eq!(rig.controller.state(), DebounceState::Armed);
        assert_eq!(rig.controller.interval_ms(), DEBOUNCE_MS);
    }

    #[test]
    fn test_invalid_config_leaves_line_untouched() {
        let mut rig = Rig::with_config(DebounceConfig {
            priorities: Priorities { timer: 15, edge: 14 },
            ..DebounceConfig::DEFAULT
        });
        assert!(matches!(
            rig.controller.configure(),
            Err(ConfigError::PriorityInversion { .. })
        ));
        assert_eq!(rig.controller.state(), DebounceState::Unconfigured);
        assert!(rig.take_log().is_empty());
    }

    #[test]
    fn test_timer_rejecting_interval_is_fatal() {
        let mut rig = Rig::with_config(DebounceConfig {
            interval_ms: 10_000,
            ..DebounceConfig::DEFAULT
        });
        assert_eq!(
            rig.controller.configure(),
            Err(ConfigError::IntervalOutOfRange {
                interval_ms: 10_000,
                max_ms: 6553
            })
        );
        assert_eq!(rig.controller.state(), DebounceState::Unconfigured);
        assert!(rig.masked.get());
    }

    #[test]
    fn test_edge_before_configure_ignored() {
        let mut rig = Rig::with_config(DebounceConfig::DEFAULT);
        rig.controller.on_edge();
        rig.controller.on_timer_expired();
        assert_eq!(rig.controller.state(), DebounceState::Unconfigured);
        assert!(rig.take_log().is_empty());
    }

    #[test]
    fn test_edge_acknowledges_then_masks_then_starts() {
        let mut rig = Rig::configured();
        rig.controller.on_edge();

        assert_eq!(rig.controller.state(), DebounceState::Debouncing);
        assert!(rig.masked.get());
        assert_eq!(rig.take_log(), [Call::Acknowledge, Call::Mask, Call::Start]);
    }

    #[test]
    fn test_expiry_unmasks_before_sampling() {
        let mut rig = Rig::configured();
        rig.controller.on_edge();
        rig.take_log();

        rig.controller.on_timer_expired();
        let log = rig.take_log();
        let unmask = log.iter().position(|c| *c == Call::Unmask).unwrap();
        let read = log.iter().position(|c| *c == Call::Read).unwrap();
        assert!(unmask < read);
    }

    #[test]
    fn test_line_rearmed_even_if_sampling_panics() {
        struct PanickingInput;

        impl DigitalInput for PanickingInput {
            fn read(&mut self) -> PinState {
                panic!("sample fault");
            }
        }

        let log: Log = Rc::default();
        let masked = Rc::new(Cell::new(true));
        let mut controller = DebounceController::new(
            LINE,
            PanickingInput,
            FakeEdge {
                log: log.clone(),
                masked: masked.clone(),
            },
            FakeTimer {
                log: log.clone(),
                max_ms: 6553,
            },
            crate::hardware::traits::NoopSink,
            DebounceConfig::DEFAULT,
        );
        controller.configure().unwrap();
        controller.on_edge();
        assert!(masked.get());

        let result = catch_unwind(AssertUnwindSafe(|| controller.on_timer_expired()));
        assert!(result.is_err());
        assert!(!masked.get());
        assert_eq!(controller.state(), DebounceState::Armed);
    }

    #[test]
    fn test_held_press_is_delivered_once() {
        let mut rig = Rig::configured();
        rig.level.set(PinState::Asserted);

        rig.controller.on_edge();
        rig.controller.on_timer_expired();

        assert_eq!(rig.presses(), 1);
        assert_eq!(rig.controller.state(), DebounceState::Armed);
        assert!(!rig.masked.get());
        assert_eq!(rig.take_log().last(), Some(&Call::Press(LINE)));
    }

    #[test]
    fn test_bounce_is_discarded() {
        let mut rig = Rig::configured();
        rig.level.set(PinState::Asserted);
        rig.controller.on_edge();

        // Contact bounced back before the interval elapsed
        rig.level.set(PinState::Deasserted);
        rig.controller.on_timer_expired();

        assert_eq!(rig.presses(), 0);
        assert_eq!(rig.controller.state(), DebounceState::Armed);
        assert!(!rig.masked.get());
    }

    #[test]
    fn test_second_edge_while_debouncing_has_no_effect() {
        let mut rig = Rig::configured();
        rig.controller.on_edge();
        rig.take_log();

        rig.controller.on_edge();
        rig.controller.on_edge();

        assert!(rig.take_log().is_empty());
        assert_eq!(rig.controller.state(), DebounceState::Debouncing);
        assert!(rig.masked.get());
    }

    #[test]
    fn test_burst_of_edges_starts_one_run() {
        let mut rig = Rig::configured();
        rig.level.set(PinState::Asserted);
        for _ in 0..5 {
            rig.controller.on_edge();
        }
        rig.controller.on_timer_expired();

        let log = rig.take_log();
        assert_eq!(log.iter().filter(|c| **c == Call::Start).count(), 1);
        assert_eq!(log.iter().filter(|c| matches!(c, Call::Press(_))).count(), 1);
    }

    #[test]
    fn test_machine_is_reentrant() {
        let mut rig = Rig::configured();
        rig.level.set(PinState::Asserted);

        rig.controller.on_edge();
        rig.controller.on_timer_expired();
        let first = rig.take_log();

        rig.controller.on_edge();
        rig.controller.on_timer_expired();
        let second = rig.take_log();

        assert_eq!(first, second);
        assert_eq!(
            second,
            [
                Call::Acknowledge,
                Call::Mask,
                Call::Start,
                Call::Acknowledge,
                Call::Unmask,
                Call::Read,
                Call::Press(LINE),
            ]
        );
    }

    #[test]
    fn test_stray_expiry_while_armed_ignored() {
        let mut rig = Rig::configured();
        rig.level.set(PinState::Asserted);
        rig.controller.on_timer_expired();

        assert!(rig.take_log().is_empty());
        assert_eq!(rig.controller.state(), DebounceState::Armed);
    }

    #[test]
    fn test_press_only_if_asserted_at_expiry() {
        for (at_expiry, expected) in [(PinState::Asserted, 1), (PinState::Deasserted, 0)] {
            let mut rig = Rig::configured();
            // Level at edge time is irrelevant
            rig.level.set(PinState::Deasserted);
            rig.controller.on_edge();
            rig.level.set(at_expiry);
            rig.controller.on_timer_expired();
            assert_eq!(rig.presses(), expected);
        }
    }

    #[test]
    fn test_expire_reports_press_without_calling_sink() {
        let mut rig = Rig::configured();
        rig.level.set(PinState::Asserted);
        rig.controller.on_edge();
        rig.take_log();

        assert_eq!(rig.controller.expire(), Some(LINE));
        assert_eq!(rig.presses(), 0);
        assert_eq!(rig.take_log(), [Call::Acknowledge, Call::Unmask, Call::Read]);
        assert_eq!(rig.controller.state(), DebounceState::Armed);

        // Already armed: a second expiry is stray
        assert_eq!(rig.controller.expire(), None);
        assert!(rig.take_log().is_empty());
    }

    #[test]
    fn test_closure_sink_counts_presses() {
        let mut count = 0;
        {
            let mut controller = DebounceController::new(
                LINE,
                FakeInput {
                    log: Rc::default(),
                    level: Rc::new(Cell::new(PinState::Asserted)),
                },
                FakeEdge {
                    log: Rc::default(),
                    masked: Rc::default(),
                },
                FakeTimer {
                    log: Rc::default(),
                    max_ms: 6553,
                },
                |line: InputLine| {
                    assert_eq!(line, LINE);
                    count += 1;
                },
                DebounceConfig::DEFAULT,
            );
            controller.configure().unwrap();
            for _ in 0..3 {
                controller.on_edge();
                controller.on_timer_expired();
            }
        }
        assert_eq!(count, 3);
    }
}
