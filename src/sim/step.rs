/// The step function: advances the simulation by one frame.
///
/// Processing order:
///   1. HUD message timer
///   2. Commands (zoom, minimap, open / close panel)
///   3. Stamina (sprint only applies while moving)
///   4. Movement resolution (per-axis tile collision, world clamp)
///   5. Camera update
///   6. Zone trigger (edge-detected entry opens a panel)
///
/// `step` is pure: it consumes the previous `SimState` and returns the next
/// one with the events for the host. Scheduling, sound, routing and
/// persistence stay in `main.rs`.

use glam::Vec2;

use crate::config::GameConfig;
use crate::domain::collision;
use crate::domain::intent;
use crate::domain::zone;
use super::camera::Viewport;
use super::event::{GameEvent, OpenCause};
use super::world::{Facing, SimState, World};

/// Seconds a HUD message stays up.
const MESSAGE_SECS: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleMinimap,
    /// Open the zone the player currently overlaps.
    OpenOverlapped,
    /// Open a zone by index (routing).
    OpenZone(usize),
    Close,
}

#[derive(Clone, Debug)]
pub struct FrameInput {
    /// Combined movement intent; clamped to length <= 1 here as well.
    pub intent: Vec2,
    pub sprint: bool,
    pub commands: Vec<Command>,
    pub viewport: Viewport,
}

impl FrameInput {
    pub fn idle(viewport: Viewport) -> Self {
        FrameInput { intent: Vec2::ZERO, sprint: false, commands: vec![], viewport }
    }
}

#[derive(Clone, Debug)]
pub struct Outcome {
    pub state: SimState,
    pub events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &World, mut state: SimState, input: &FrameInput, dt: f32, config: &GameConfig) -> Outcome {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    let mut events: Vec<GameEvent> = Vec::new();

    if state.message_timer > 0.0 {
        state.message_timer -= dt;
        if state.message_timer <= 0.0 {
            state.message_timer = 0.0;
            state.message.clear();
        }
    }

    for &cmd in &input.commands {
        apply_command(world, &mut state, cmd, config, &mut events);
    }

    resolve_movement(world, &mut state, input, dt, config, &mut events);

    state.camera.update(state.player.center(), world.size(), input.viewport, &config.camera);

    resolve_zone_entry(world, &mut state, &mut events);

    Outcome { state, events }
}

// ══════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════

fn apply_command(world: &World, state: &mut SimState, cmd: Command, config: &GameConfig, events: &mut Vec<GameEvent>) {
    let cam = &config.camera;
    match cmd {
        Command::ZoomIn | Command::ZoomOut | Command::ZoomReset => {
            let changed = match cmd {
                Command::ZoomIn => state.camera.zoom_in(cam),
                Command::ZoomOut => state.camera.zoom_out(cam),
                _ => state.camera.reset_zoom(cam),
            };
            if changed {
                events.push(GameEvent::ZoomChanged(state.camera.user_zoom));
            }
        }
        Command::ToggleMinimap => {
            state.minimap = !state.minimap;
            events.push(GameEvent::MinimapToggled(state.minimap));
        }
        Command::OpenOverlapped => match zone::first_overlapping(&world.zones, &state.player) {
            Some(i) => open_zone(state, i, OpenCause::Manual, events),
            None => state.set_message("Nothing here", MESSAGE_SECS),
        },
        Command::OpenZone(i) => {
            if i < world.zones.len() {
                open_zone(state, i, OpenCause::Route, events);
            }
        }
        Command::Close => close_zone(state, events),
    }
}

fn open_zone(state: &mut SimState, index: usize, cause: OpenCause, events: &mut Vec<GameEvent>) {
    if state.active_zone == Some(index) {
        return;
    }
    close_zone(state, events);
    state.active_zone = Some(index);
    events.push(GameEvent::ZoneOpened { zone: index, cause });
}

/// Clears the panel regardless of overlap. The trigger flags are left
/// alone, so lingering inside does not reopen it.
fn close_zone(state: &mut SimState, events: &mut Vec<GameEvent>) {
    if let Some(prev) = state.active_zone.take() {
        events.push(GameEvent::ZoneClosed { zone: prev });
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(
    world: &World,
    state: &mut SimState,
    input: &FrameInput,
    dt: f32,
    config: &GameConfig,
    events: &mut Vec<GameEvent>,
) {
    // An open panel has focus; the player holds still.
    let dir = if state.active_zone.is_some() {
        Vec2::ZERO
    } else {
        intent::combine(&[input.intent])
    };
    let moving = dir != Vec2::ZERO;

    let was_exhausted = state.stamina.is_exhausted();
    state.sprinting = state.stamina.tick(input.sprint, moving, dt, &config.movement);
    match (was_exhausted, state.stamina.is_exhausted()) {
        (false, true) => {
            events.push(GameEvent::StaminaDepleted);
            state.set_message("Out of breath", MESSAGE_SECS);
        }
        (true, false) => events.push(GameEvent::StaminaRecovered),
        _ => {}
    }

    let speed = if state.sprinting {
        config.movement.sprint_speed
    } else {
        config.movement.base_speed
    };
    state.player = collision::resolve_move(&world.grid, state.player, dir * speed, dt);
    if let Some(f) = Facing::from_vector(dir) {
        state.facing = f;
    }
}

// ══════════════════════════════════════════════════════════════
// Zones
// ══════════════════════════════════════════════════════════════

fn resolve_zone_entry(world: &World, state: &mut SimState, events: &mut Vec<GameEvent>) {
    let entered = state.trigger.update(&world.zones, &state.player);
    // Several zones entered on the same frame: list order wins.
    if let Some(&i) = entered.first() {
        open_zone(state, i, OpenCause::Entered, events);
    }
}
