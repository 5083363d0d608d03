/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_config()`.
/// Default mapping:
///   D-pad               →  Movement (cardinal)
///   Left Stick          →  Movement (analog, past the dead zone)
///   A                   →  Open the overlapped zone
///   B / Select          →  Close the panel
///   Y                   →  Toggle minimap
///   X / R1 (held)       →  Sprint

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use glam::Vec2;

use crate::config::GamepadConfig;
use crate::domain::intent::{self, KeyIntent};

const DEFAULT_STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    open: Vec<Btn>,
    close: Vec<Btn>,
    minimap: Vec<Btn>,
    sprint: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            open:    vec![Btn::A],
            close:   vec![Btn::B, Btn::Select],
            minimap: vec![Btn::Y],
            sprint:  vec![Btn::X, Btn::R1],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no buttons keeps its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let d = ActionMap::default();
        ActionMap {
            open: parse_list(&cfg.open, d.open),
            close: parse_list(&cfg.close, d.close),
            minimap: parse_list(&cfg.minimap, d.minimap),
            sprint: parse_list(&cfg.sprint, d.sprint),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad
    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    // Left stick, raw (y positive = up)
    stick_x: f32,
    stick_y: f32,
    stick_dead_zone: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::info!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dead_zone: DEFAULT_STICK_DEADZONE,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping and stick dead zone from config.
    pub fn load_config(&mut self, cfg: &GamepadConfig, stick_dead_zone: f32) {
        self.action_map = ActionMap::from_config(cfg);
        self.stick_dead_zone = stick_dead_zone;
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool, just_pressed: bool) {
        // D-pad handled separately (not in Btn enum)
        let dpad = match gilrs_btn {
            Button::DPadUp    => Some(&mut self.dpad_up),
            Button::DPadDown  => Some(&mut self.dpad_down),
            Button::DPadLeft  => Some(&mut self.dpad_left),
            Button::DPadRight => Some(&mut self.dpad_right),
            _ => None,
        };
        if let Some(state) = dpad {
            state.held = held;
            state.just_pressed |= just_pressed;
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let idx = btn_index(btn);
            self.buttons[idx].held = held;
            if just_pressed {
                self.buttons[idx].just_pressed = true;
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    pub fn open_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.open)
    }
    pub fn close_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.close)
    }
    pub fn minimap_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.minimap)
    }
    pub fn sprint_held(&self) -> bool {
        self.any_held(&self.action_map.sprint)
    }

    // ── Movement ──

    pub fn dpad_intent(&self) -> KeyIntent {
        KeyIntent {
            up: self.dpad_up.held,
            down: self.dpad_down.held,
            left: self.dpad_left.held,
            right: self.dpad_right.held,
        }
    }

    /// Analog left stick, y-down, length <= 1.
    pub fn stick_intent(&self) -> Vec2 {
        intent::stick_vector(self.stick_x, self.stick_y, self.stick_dead_zone)
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad_up.just_pressed = false;
        self.dpad_down.just_pressed = false;
        self.dpad_left.just_pressed = false;
        self.dpad_right.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_up = BtnState::default();
        self.dpad_down = BtnState::default();
        self.dpad_left = BtnState::default();
        self.dpad_right = BtnState::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
