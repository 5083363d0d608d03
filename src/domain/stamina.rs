//! Sprint stamina.
//!
//! Value lives in [0, 1]. Sprinting while moving drains it; anything else
//! regenerates it. Hitting zero latches `exhausted`, which blocks sprint
//! until the value climbs back to `recover_at`.

use crate::config::MovementConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stamina {
    value: f32,
    exhausted: bool,
}

impl Default for Stamina {
    fn default() -> Self {
        Stamina::full()
    }
}

impl Stamina {
    pub fn full() -> Self {
        Stamina { value: 1.0, exhausted: false }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advance by `dt` seconds. Returns true if sprint speed applies this frame.
    pub fn tick(&mut self, wants_sprint: bool, moving: bool, dt: f32, cfg: &MovementConfig) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let sprinting = wants_sprint && moving && !self.exhausted && self.value > 0.0;

        if sprinting {
            self.value -= cfg.stamina_drain * dt;
            if self.value <= 0.0 {
                self.value = 0.0;
                self.exhausted = true;
            }
        } else {
            self.value = (self.value + cfg.stamina_regen * dt).min(1.0);
            if self.exhausted && self.value >= cfg.stamina_recover_at {
                self.exhausted = false;
            }
        }

        sprinting
    }
}
