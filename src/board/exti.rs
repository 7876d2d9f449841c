use embassy_stm32::pac;

use crate::config::ConfigError;
use crate::hardware::traits::{Edge, EdgeInterrupt, InputLine};

/// One EXTI line (0..=15) routed from its GPIO port through SYSCFG.
pub struct ExtiLine {
    line: InputLine,
}

impl ExtiLine {
    /// EXTIn is shared by pin n of every port: create at most one `ExtiLine`
    /// per pin number.
    pub fn new(line: InputLine) -> Self {
        Self { line }
    }

    fn index(&self) -> usize {
        self.line.pin() as usize
    }
}

/// Pending flag of the EXTI line serving `line`. Read-only, safe from any context.
pub fn pending(line: InputLine) -> bool {
    pac::EXTI.pr(0).read().line(line.pin() as usize)
}

impl EdgeInterrupt for ExtiLine {
    fn configure(&mut self, edge: Edge) -> Result<(), ConfigError> {
        let (rising, falling) = match edge {
            Edge::Rising => (true, false),
            Edge::Falling => (false, true),
            Edge::Both => return Err(ConfigError::UnsupportedEdge),
        };
        let n = self.index();

        pac::RCC.apb2enr().modify(|w| w.set_syscfgen(true));
        pac::SYSCFG
            .exticr(n / 4)
            .modify(|w| w.set_exti(n % 4, self.line.port()));

        // Masked until the controller arms it
        pac::EXTI.imr(0).modify(|w| w.set_line(n, false));
        pac::EXTI.rtsr(0).modify(|w| w.set_line(n, rising));
        pac::EXTI.ftsr(0).modify(|w| w.set_line(n, falling));
        Ok(())
    }

    fn mask(&mut self) {
        pac::EXTI.imr(0).modify(|w| w.set_line(self.index(), false));
    }

    fn unmask(&mut self) {
        pac::EXTI.imr(0).modify(|w| w.set_line(self.index(), true));
    }

    fn acknowledge(&mut self) {
        // Write-one-to-clear; zeros leave the other lines alone
        pac::EXTI.pr(0).write(|w| w.set_line(self.index(), true));
    }
}
