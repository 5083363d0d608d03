//! Movement intent: keyboard flags, a single-pointer virtual joystick and
//! an analog stick, merged into one direction vector.
//!
//! Every source produces a vector of length <= 1 in screen orientation
//! (x right, y down). `combine` sums them and renormalizes, so holding a
//! key while dragging the joystick never moves faster than max speed.

use glam::Vec2;

/// Held cardinal directions from keyboard or d-pad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyIntent {
    /// Opposite keys cancel out. Diagonals are unit length.
    pub fn vector(self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }

    pub fn merge(self, other: KeyIntent) -> KeyIntent {
        KeyIntent {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }
}

/// A tracked pointer: where it went down and where it is now (screen px).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerTrack {
    pub id: u64,
    pub start: Vec2,
    pub current: Vec2,
}

/// Virtual joystick driven by one pointer at a time.
///
/// The first pointer to go down owns the stick until it lifts; presses
/// from other pointers are ignored meanwhile.
#[derive(Clone, Debug)]
pub struct Joystick {
    active: Option<PointerTrack>,
    dead_zone: f32,
    max_radius: f32,
}

impl Joystick {
    pub fn new(dead_zone: f32, max_radius: f32) -> Self {
        Joystick {
            active: None,
            dead_zone: dead_zone.max(0.0),
            max_radius: max_radius.max(dead_zone).max(1.0),
        }
    }

    /// Returns false if another pointer already owns the stick.
    pub fn press(&mut self, id: u64, at: Vec2) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(PointerTrack { id, start: at, current: at });
        true
    }

    pub fn drag(&mut self, id: u64, at: Vec2) {
        if let Some(track) = self.active.as_mut() {
            if track.id == id {
                track.current = at;
            }
        }
    }

    /// Returns true if `id` was the owning pointer.
    pub fn release(&mut self, id: u64) -> bool {
        match self.active {
            Some(track) if track.id == id => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn track(&self) -> Option<&PointerTrack> {
        self.active.as_ref()
    }

    /// Knob offset from the press point, clamped to the knob radius.
    pub fn knob_offset(&self) -> Vec2 {
        match self.active {
            Some(t) => (t.current - t.start).clamp_length_max(self.max_radius),
            None => Vec2::ZERO,
        }
    }

    /// Unit direction once the offset is past the dead zone, else zero.
    pub fn direction(&self) -> Vec2 {
        let Some(t) = self.active else { return Vec2::ZERO };
        let offset = t.current - t.start;
        if offset.length() <= self.dead_zone {
            return Vec2::ZERO;
        }
        offset.normalize_or_zero()
    }
}

/// Analog stick vector with a radial dead zone. `y_up` is the raw axis
/// value where positive means up; the result is y-down like everything else.
pub fn stick_vector(x: f32, y_up: f32, dead_zone: f32) -> Vec2 {
    let v = Vec2::new(x, -y_up);
    if !v.is_finite() || v.length() <= dead_zone {
        return Vec2::ZERO;
    }
    v.clamp_length_max(1.0)
}

/// Sum all sources and renormalize to length <= 1.
pub fn combine(sources: &[Vec2]) -> Vec2 {
    let sum: Vec2 = sources.iter().copied().filter(|v| v.is_finite()).sum();
    sum.clamp_length_max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn keyboard_diagonal_is_unit_length() {
        let k = KeyIntent { up: true, right: true, ..Default::default() };
        let v = k.vector();
        assert!((v.length() - 1.0).abs() < EPS);
        assert!(v.x > 0.0 && v.y < 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let k = KeyIntent { left: true, right: true, ..Default::default() };
        assert_eq!(k.vector(), Vec2::ZERO);
    }

    #[test]
    fn joystick_dead_zone_and_direction() {
        let mut j = Joystick::new(10.0, 60.0);
        assert!(j.press(1, Vec2::new(100.0, 100.0)));
        j.drag(1, Vec2::new(105.0, 100.0));
        assert_eq!(j.direction(), Vec2::ZERO);

        j.drag(1, Vec2::new(100.0, 130.0));
        let d = j.direction();
        assert!((d - Vec2::new(0.0, 1.0)).length() < EPS);
    }

    #[test]
    fn joystick_knob_is_clamped_to_radius() {
        let mut j = Joystick::new(10.0, 60.0);
        j.press(1, Vec2::ZERO);
        j.drag(1, Vec2::new(300.0, 400.0));
        let knob = j.knob_offset();
        assert!((knob.length() - 60.0).abs() < 1e-3);
        assert!((j.direction().length() - 1.0).abs() < EPS);
    }

    #[test]
    fn joystick_single_pointer_ownership() {
        let mut j = Joystick::new(5.0, 50.0);
        assert!(j.press(7, Vec2::ZERO));
        assert!(!j.press(8, Vec2::new(10.0, 10.0)));

        // Drags from the other pointer are ignored.
        j.drag(8, Vec2::new(0.0, 40.0));
        assert_eq!(j.direction(), Vec2::ZERO);

        assert!(!j.release(8));
        assert!(j.track().is_some());
        assert!(j.release(7));
        assert!(j.track().is_none());
        assert!(j.press(8, Vec2::ZERO));
    }

    #[test]
    fn stick_dead_zone_and_orientation() {
        assert_eq!(stick_vector(0.1, 0.1, 0.25), Vec2::ZERO);
        let v = stick_vector(0.0, 0.8, 0.25);
        assert!((v - Vec2::new(0.0, -0.8)).length() < EPS);
        assert!(stick_vector(1.0, 1.0, 0.25).length() <= 1.0 + EPS);
    }

    #[test]
    fn combined_sources_never_exceed_unit_length() {
        let keys = [
            KeyIntent::default(),
            KeyIntent { right: true, ..Default::default() },
            KeyIntent { up: true, left: true, ..Default::default() },
            KeyIntent { down: true, right: true, ..Default::default() },
        ];
        let mut j = Joystick::new(4.0, 40.0);
        j.press(0, Vec2::ZERO);
        for k in keys {
            for step in 0..16 {
                let angle = step as f32 * std::f32::consts::TAU / 16.0;
                j.drag(0, Vec2::new(angle.cos(), angle.sin()) * 80.0);
                let stick = stick_vector(angle.sin(), angle.cos(), 0.2);
                let v = combine(&[k.vector(), j.direction(), stick]);
                assert!(v.length() <= 1.0 + EPS, "{:?} too long", v);
            }
        }
    }

    #[test]
    fn combine_keeps_partial_analog_input() {
        let v = combine(&[Vec2::new(0.5, 0.0)]);
        assert!((v.length() - 0.5).abs() < EPS);
        assert_eq!(combine(&[]), Vec2::ZERO);
    }
}
