/// Frame timing: dt between frames, clamped, with focus pause.
///
/// While paused no time accumulates. Resuming resets the baseline, so the
/// first frame after focus returns never sees the time spent away.

use std::time::Instant;

#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
    paused: bool,
}

impl FrameClock {
    pub fn new(now: Instant, max_dt: f32) -> Self {
        FrameClock { last: now, max_dt, paused: false }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Apply this frame's focus change. Returns true if the pause state flipped.
    pub fn focus(&mut self, focused: Option<bool>, now: Instant) -> bool {
        match focused {
            Some(false) if !self.paused => {
                self.paused = true;
                true
            }
            Some(true) if self.paused => {
                self.paused = false;
                self.last = now;
                true
            }
            _ => false,
        }
    }

    /// Seconds since the previous tick, at most `max_dt`. Zero while paused.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last).as_secs_f32().min(self.max_dt);
        self.last = now;
        if self.paused { 0.0 } else { dt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn dt_is_clamped() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0, 0.1);
        assert!((clock.tick(t0 + ms(16)) - 0.016).abs() < 1e-4);
        assert_eq!(clock.tick(t0 + ms(5_016)), 0.1);
    }

    #[test]
    fn paused_frames_have_no_dt() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0, 0.1);
        assert!(clock.focus(Some(false), t0));
        assert!(clock.is_paused());
        assert_eq!(clock.tick(t0 + ms(50)), 0.0);
        // Losing focus twice is not a new transition.
        assert!(!clock.focus(Some(false), t0 + ms(60)));
        assert!(!clock.focus(None, t0 + ms(60)));
    }

    #[test]
    fn resume_resets_the_baseline() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0, 10.0);
        clock.focus(Some(false), t0);
        clock.tick(t0 + ms(10));
        // Long absence, then focus returns.
        assert!(clock.focus(Some(true), t0 + ms(3_000)));
        assert!(!clock.is_paused());
        let dt = clock.tick(t0 + ms(3_016));
        assert!((dt - 0.016).abs() < 1e-4, "dt = {dt}");
    }

    #[test]
    fn focus_gained_while_running_changes_nothing() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0, 0.1);
        assert!(!clock.focus(Some(true), t0 + ms(40)));
        assert!((clock.tick(t0 + ms(50)) - 0.05).abs() < 1e-4);
    }
}
