/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered commands (zoom, minimap, open, history)
///   - Sprint from shift: a SHIFT modifier or an uppercase WASD letter
///
/// Character keys are stored lowercased, so `W` and `w` are the same key.
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// Mouse buttons become pointers (id = button number) for the joystick.
/// Focus and resize events are surfaced for the frame loop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use glam::Vec2;

use crate::domain::intent::{Joystick, KeyIntent};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Pointer transitions in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Down { id: u64, col: u16, row: u16 },
    Move { id: u64, col: u16, row: u16 },
    Up { id: u64, col: u16, row: u16 },
}

/// Screen layout that pointer routing hit-tests against.
pub trait PointerSurface {
    /// Center of a cell in map screen px.
    fn to_screen(&self, col: u16, row: u16) -> Vec2;
    fn in_map(&self, row: u16) -> bool;
    fn panel_contains(&self, col: u16, row: u16) -> bool;
}

/// Feed this frame's pointer events to the joystick.
///
/// With a panel open, presses never reach the joystick; a press outside the
/// panel asks for it to close (the return value). Drags and lifts always
/// go through so a stick held before the panel opened can still let go.
pub fn route_pointers(
    events: &[PointerEvent],
    panel_open: bool,
    surface: &impl PointerSurface,
    joystick: &mut Joystick,
) -> bool {
    let mut close = false;
    for ev in events {
        match *ev {
            PointerEvent::Down { id, col, row } => {
                if panel_open {
                    close |= !surface.panel_contains(col, row);
                } else if surface.in_map(row) {
                    joystick.press(id, surface.to_screen(col, row));
                }
            }
            PointerEvent::Move { id, col, row } => joystick.drag(id, surface.to_screen(col, row)),
            PointerEvent::Up { id, .. } => {
                joystick.release(id);
            }
        }
    }
    close
}

#[derive(Clone, Copy, Debug)]
struct Held {
    at: Instant,
    shifted: bool,
}

pub struct InputState {
    /// Last Press/Repeat event for each (normalized) key.
    last_active: HashMap<KeyCode, Held>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    pub pointer_events: Vec<PointerEvent>,

    /// Latest focus change this frame: `Some(true)` gained, `Some(false)` lost.
    pub focus: Option<bool>,

    /// Latest terminal size reported this frame.
    pub resized: Option<(u16, u16)>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            pointer_events: Vec::with_capacity(8),
            focus: None,
            resized: None,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.handle_event(ev, Instant::now()),
                Err(e) => {
                    log::debug!("terminal event read failed: {e}");
                    break;
                }
            }
        }

        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.pointer_events.clear();
        self.focus = None;
        self.resized = None;
    }

    fn handle_event(&mut self, ev: Event, now: Instant) {
        match ev {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(m) => self.handle_mouse(m),
            Event::FocusGained => self.focus = Some(true),
            Event::FocusLost => {
                self.focus = Some(false);
                // Releases are not delivered to an unfocused terminal.
                self.last_active.clear();
            }
            Event::Resize(w, h) => self.resized = Some((w, h)),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        let (code, upper) = normalize(key.code);
        let shifted = upper || key.modifiers.contains(KeyModifiers::SHIFT);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                // Explicit release: remove from active set
                self.last_active.remove(&code);
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held_at(code, now);
                self.last_active.insert(code, Held { at: now, shifted });
                if !was_held {
                    self.fresh_presses.push(code);
                }
            }
        }
    }

    fn handle_mouse(&mut self, m: MouseEvent) {
        let (col, row) = (m.column, m.row);
        let ev = match m.kind {
            MouseEventKind::Down(b) => PointerEvent::Down { id: button_id(b), col, row },
            MouseEventKind::Drag(b) => PointerEvent::Move { id: button_id(b), col, row },
            MouseEventKind::Up(b) => PointerEvent::Up { id: button_id(b), col, row },
            _ => return,
        };
        self.pointer_events.push(ev);
    }

    /// Expire keys that have timed out (fallback for terminals without Release)
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, h| now.duration_since(h.at) < HOLD_TIMEOUT);
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Digit keys 1-9 pressed this frame, as 0-based indices.
    pub fn pressed_digits(&self) -> impl Iterator<Item = usize> + '_ {
        self.fresh_presses.iter().filter_map(|c| match c {
            KeyCode::Char(d @ '1'..='9') => Some(*d as usize - '1' as usize),
            _ => None,
        })
    }

    /// WASD and arrow keys.
    pub fn keyboard_intent(&self) -> KeyIntent {
        KeyIntent {
            up: self.any_held(&[KeyCode::Char('w'), KeyCode::Up]),
            down: self.any_held(&[KeyCode::Char('s'), KeyCode::Down]),
            left: self.any_held(&[KeyCode::Char('a'), KeyCode::Left]),
            right: self.any_held(&[KeyCode::Char('d'), KeyCode::Right]),
        }
    }

    /// Sprint: any held movement key was last seen with shift.
    pub fn sprint_held(&self) -> bool {
        let now = Instant::now();
        self.last_active.iter().any(|(code, h)| {
            h.shifted && is_movement(*code) && now.duration_since(h.at) < self.hold_limit()
        })
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn hold_limit(&self) -> Duration {
        if self.honor_release { Duration::MAX } else { HOLD_TIMEOUT }
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|h| now.duration_since(h.at) < self.hold_limit())
            .unwrap_or(false)
    }
}

/// Lowercase character keys; the flag tells whether it was uppercase.
fn normalize(code: KeyCode) -> (KeyCode, bool) {
    match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => (KeyCode::Char(c.to_ascii_lowercase()), true),
        other => (other, false),
    }
}

fn is_movement(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Char('w' | 'a' | 's' | 'd') | KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
    )
}

fn button_id(b: MouseButton) -> u64 {
    match b {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, modifiers, kind))
    }

    fn press(c: char) -> Event {
        key(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
    }

    #[test]
    fn uppercase_letter_moves_and_sprints() {
        let mut input = InputState::new();
        input.handle_event(press('W'), Instant::now());
        assert!(input.is_held(KeyCode::Char('w')));
        assert!(input.keyboard_intent().up);
        assert!(input.sprint_held());
        assert!(input.was_pressed(KeyCode::Char('w')));
    }

    #[test]
    fn lowercase_letter_walks() {
        let mut input = InputState::new();
        input.handle_event(press('d'), Instant::now());
        assert!(input.keyboard_intent().right);
        assert!(!input.sprint_held());
    }

    #[test]
    fn shift_modifier_on_arrows_sprints() {
        let mut input = InputState::new();
        input.handle_event(key(KeyCode::Left, KeyModifiers::SHIFT, KeyEventKind::Press), Instant::now());
        assert!(input.keyboard_intent().left);
        assert!(input.sprint_held());
    }

    #[test]
    fn release_honored_only_with_enhancement() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(press('a'), now);
        input.handle_event(key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release), now);
        assert!(input.is_held(KeyCode::Char('a')));

        input.honor_release = true;
        input.handle_event(key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release), now);
        assert!(!input.is_held(KeyCode::Char('a')));
    }

    #[test]
    fn held_keys_expire_without_release_events() {
        let mut input = InputState::new();
        let start = Instant::now();
        input.handle_event(press('s'), start);
        input.expire(start + HOLD_TIMEOUT * 2);
        assert!(!input.is_held(KeyCode::Char('s')));
    }

    #[test]
    fn repeat_is_not_a_fresh_press() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(press('m'), now);
        input.begin_frame();
        input.handle_event(key(KeyCode::Char('m'), KeyModifiers::NONE, KeyEventKind::Repeat), now);
        assert!(!input.was_pressed(KeyCode::Char('m')));
    }

    #[test]
    fn digits_map_to_track_indices() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(press('1'), now);
        input.handle_event(press('3'), now);
        input.handle_event(press('0'), now);
        assert_eq!(input.pressed_digits().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn mouse_and_focus_events() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 4, 5), now);
        input.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 6, 5), now);
        input.handle_event(mouse(MouseEventKind::Moved, 7, 5), now);
        input.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 6, 5), now);
        assert_eq!(
            input.pointer_events,
            vec![
                PointerEvent::Down { id: 0, col: 4, row: 5 },
                PointerEvent::Move { id: 0, col: 6, row: 5 },
                PointerEvent::Up { id: 0, col: 6, row: 5 },
            ]
        );

        input.handle_event(press('w'), now);
        input.handle_event(Event::FocusLost, now);
        assert_eq!(input.focus, Some(false));
        assert!(!input.is_held(KeyCode::Char('w')));
    }

    #[test]
    fn ctrl_c_detected() {
        let mut input = InputState::new();
        input.handle_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press), Instant::now());
        assert!(input.ctrl_c_pressed());
    }

    // ── Pointer routing ──

    /// Map rows 1..=20, panel over cols 10..20 x rows 5..10, 10 px per cell.
    struct Surface;

    impl PointerSurface for Surface {
        fn to_screen(&self, col: u16, row: u16) -> Vec2 {
            Vec2::new(col as f32 * 10.0, row as f32 * 10.0)
        }
        fn in_map(&self, row: u16) -> bool {
            (1..=20).contains(&row)
        }
        fn panel_contains(&self, col: u16, row: u16) -> bool {
            (10..20).contains(&col) && (5..10).contains(&row)
        }
    }

    fn stick() -> Joystick {
        Joystick::new(8.0, 60.0)
    }

    #[test]
    fn first_pointer_owns_the_joystick() {
        let mut js = stick();
        let events = [
            PointerEvent::Down { id: 0, col: 2, row: 2 },
            PointerEvent::Down { id: 1, col: 8, row: 8 },
            PointerEvent::Move { id: 1, col: 2, row: 9 },
            PointerEvent::Move { id: 0, col: 6, row: 2 },
        ];
        assert!(!route_pointers(&events, false, &Surface, &mut js));
        let t = js.track().copied().unwrap();
        assert_eq!(t.id, 0);
        assert_eq!(t.start, Vec2::new(20.0, 20.0));
        assert_eq!(t.current, Vec2::new(60.0, 20.0));
        assert_eq!(js.direction(), Vec2::X);

        // The other pointer lifting does not free the stick.
        route_pointers(&[PointerEvent::Up { id: 1, col: 2, row: 9 }], false, &Surface, &mut js);
        assert!(js.track().is_some());
        route_pointers(&[PointerEvent::Up { id: 0, col: 6, row: 2 }], false, &Surface, &mut js);
        assert!(js.track().is_none());
    }

    #[test]
    fn presses_outside_the_map_are_ignored() {
        let mut js = stick();
        route_pointers(&[PointerEvent::Down { id: 0, col: 3, row: 0 }], false, &Surface, &mut js);
        assert!(js.track().is_none());
    }

    #[test]
    fn click_outside_open_panel_closes_it() {
        let mut js = stick();
        let outside = [PointerEvent::Down { id: 0, col: 2, row: 2 }];
        assert!(route_pointers(&outside, true, &Surface, &mut js));
        // Never starts the joystick while the panel is open.
        assert!(js.track().is_none());

        let inside = [PointerEvent::Down { id: 0, col: 12, row: 6 }];
        assert!(!route_pointers(&inside, true, &Surface, &mut js));
    }

    #[test]
    fn held_stick_can_lift_after_panel_opens() {
        let mut js = stick();
        route_pointers(&[PointerEvent::Down { id: 0, col: 2, row: 2 }], false, &Surface, &mut js);
        route_pointers(&[PointerEvent::Up { id: 0, col: 2, row: 2 }], true, &Surface, &mut js);
        assert!(js.track().is_none());
    }
}
