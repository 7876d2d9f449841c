use embassy_stm32::pac;

use crate::config::{self, ConfigError};
use crate::hardware::traits::OneShotTimer;

/// TIM7 in one-pulse mode: counts `interval_ms` once, raises an update
/// interrupt and clears CEN by itself.
pub struct OnePulseTimer {
    _private: (),
}

impl OnePulseTimer {
    /// There is one TIM7; do not construct this twice.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

/// Acknowledge the TIM7 update flag. `true` if an expiration was pending.
pub fn take_update() -> bool {
    let fired = pac::TIM7.sr().read().uif();
    if fired {
        pac::TIM7.sr().modify(|w| w.set_uif(false));
    }
    fired
}

impl OneShotTimer for OnePulseTimer {
    fn configure(&mut self, interval_ms: u32) -> Result<(), ConfigError> {
        let reload = config::timer_reload(interval_ms)?;
        let tim = pac::TIM7;

        pac::RCC.apb1enr().modify(|w| w.set_tim7en(true));

        tim.cr1().modify(|w| {
            w.set_cen(false);
            w.set_opm(true);
        });
        tim.dier().modify(|w| w.set_uie(false));
        tim.psc().write_value(config::timer_prescaler());
        tim.arr().write(|w| w.set_arr(reload));

        // Latch PSC/ARR now. UG raises UIF, clear it before listening.
        tim.egr().write(|w| w.set_ug(true));
        tim.sr().modify(|w| w.set_uif(false));
        tim.dier().modify(|w| w.set_uie(true));
        Ok(())
    }

    fn start(&mut self) {
        let tim = pac::TIM7;
        tim.cnt().write(|w| w.set_cnt(0));
        tim.cr1().modify(|w| w.set_cen(true));
    }
}

impl Default for OnePulseTimer {
    fn default() -> Self {
        Self::new()
    }
}
