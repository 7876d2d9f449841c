use crate::config::ConfigError;

/// Identity of one monitored input: GPIO port index (A = 0) and pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub struct InputLine {
    port: u8,
    pin: u8,
}

impl InputLine {
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }

    pub const fn port(&self) -> u8 {
        self.port
    }

    pub const fn pin(&self) -> u8 {
        self.pin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum PinState {
    Asserted,
    Deasserted,
}

/// Electrical level that counts as "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    Both,
}

pub trait Led {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);
}

/// Single, side-effect free sample of an input line.
pub trait DigitalInput {
    fn read(&mut self) -> PinState;
}

/// Edge detector of one input line.
///
/// `mask`, `unmask` and `acknowledge` are called from interrupt context and
/// must be a handful of register writes.
pub trait EdgeInterrupt {
    /// Bind the trigger edge. Calling it again with the same edge is harmless.
    fn configure(&mut self, edge: Edge) -> Result<(), ConfigError>;
    fn mask(&mut self);
    fn unmask(&mut self);
    /// Clear the pending indication.
    fn acknowledge(&mut self);
}

/// Timer that expires once per `start`, then stops by itself.
pub trait OneShotTimer {
    fn configure(&mut self, interval_ms: u32) -> Result<(), ConfigError>;
    /// Count from zero. Restarts if a run is already in progress.
    fn start(&mut self);
}

/// Receiver of confirmed presses.
pub trait CallbackSink {
    fn on_press(&mut self, line: InputLine);
}

impl<F> CallbackSink for F
where
    F: FnMut(InputLine),
{
    fn on_press(&mut self, line: InputLine) {
        self(line)
    }
}

/// Sink that drops every press.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl CallbackSink for NoopSink {
    fn on_press(&mut self, _line: InputLine) {}
}
