/// World and SimState: the static level and everything that changes per frame.
///
/// ## Split
///
///   - `World`    : grid, zones, spawn, player size. Immutable after load.
///   - `SimState` : player rectangle, camera, stamina, zone trigger, active
///                  panel, minimap flag and the HUD message.
///
/// `step` takes a `SimState` by value and returns the next one; the host
/// never mutates it mid-frame except through `place_player` / `open_zone`
/// at startup and history navigation.

use glam::Vec2;

use crate::domain::geom::Rect;
use crate::domain::stamina::Stamina;
use crate::domain::tile::TileGrid;
use crate::domain::zone::{Zone, ZoneTrigger};
use super::camera::{Camera, CameraMode, Viewport};

#[derive(Clone, Debug)]
pub struct World {
    pub title: String,
    pub grid: TileGrid,
    pub zones: Vec<Zone>,
    /// Top-left of the player rectangle at spawn, world px.
    pub spawn: Vec2,
    pub player_size: f32,
}

impl World {
    /// World dimensions in px.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.grid.world_width(), self.grid.world_height())
    }

    /// Zone ids are unique ignoring ASCII case, and looked up the same way.
    pub fn zone_index(&self, id: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.id.eq_ignore_ascii_case(id))
    }

    pub fn spawn_rect(&self) -> Rect {
        Rect::new(self.spawn.x, self.spawn.y, self.player_size, self.player_size)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Dominant axis of a movement vector; `None` when not moving.
    pub fn from_vector(v: Vec2) -> Option<Facing> {
        if v == Vec2::ZERO || !v.is_finite() {
            return None;
        }
        Some(if v.x.abs() >= v.y.abs() {
            if v.x > 0.0 { Facing::Right } else { Facing::Left }
        } else if v.y > 0.0 {
            Facing::Down
        } else {
            Facing::Up
        })
    }
}

#[derive(Clone, Debug)]
pub struct SimState {
    pub player: Rect,
    pub facing: Facing,
    pub camera: Camera,
    pub stamina: Stamina,
    /// Sprint speed applied on the last step.
    pub sprinting: bool,
    pub trigger: ZoneTrigger,
    /// Index into `World::zones` of the open panel.
    pub active_zone: Option<usize>,
    pub minimap: bool,

    // ── UI ──
    pub message: String,
    /// Seconds left before `message` clears.
    pub message_timer: f32,
}

impl SimState {
    /// Fresh state: player at spawn, no panel open, camera centered.
    pub fn new(world: &World, mode: CameraMode, minimap: bool, vp: Viewport) -> Self {
        let mut state = SimState {
            player: world.spawn_rect(),
            facing: Facing::default(),
            camera: Camera::new(mode),
            stamina: Stamina::full(),
            sprinting: false,
            trigger: ZoneTrigger::new(world.zones.len()),
            active_zone: None,
            minimap,
            message: String::new(),
            message_timer: 0.0,
        };
        state.place_player(world, world.spawn, vp);
        state
    }

    /// Move the player without walking: zones already overlapped at `pos`
    /// count as entered, so none fire on the next step.
    pub fn place_player(&mut self, world: &World, pos: Vec2, vp: Viewport) {
        self.player = self.player.at(pos);
        self.trigger.prime(&world.zones, &self.player);
        self.camera.snap_to(self.player.center(), world.size(), vp);
    }

    pub fn set_message(&mut self, msg: &str, seconds: f32) {
        self.message = msg.to_string();
        self.message_timer = seconds;
    }

    pub fn active<'w>(&self, world: &'w World) -> Option<&'w Zone> {
        self.active_zone.and_then(|i| world.zones.get(i))
    }

    pub fn active_id<'w>(&self, world: &'w World) -> Option<&'w str> {
        self.active(world).map(|z| z.id.as_str())
    }
}
