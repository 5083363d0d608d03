/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::KeyCode;
use config::{GameConfig, LoggingConfig};
use domain::intent::{self, Joystick};
use sim::camera::CameraMode;
use sim::clock::FrameClock;
use sim::event::GameEvent;
use sim::level::load_world;
use sim::route::{self, History};
use sim::save::{self, SnapshotWriter};
use sim::step::{self, Command, FrameInput};
use sim::world::{SimState, World};
use ui::gamepad::GamepadState;
use ui::input::{route_pointers, InputState};
use ui::renderer::{Renderer, View};
use ui::sound::{AudioRegistry, SoundEngine};

/// Walk a tile world in the terminal; zones open portfolio panels.
#[derive(Parser, Debug)]
#[command(name = "portfolio-world", version, about)]
struct Args {
    /// Config file (default: config.toml next to the binary, then in the CWD)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Open a zone on startup, e.g. '#music'. Overrides the saved panel.
    #[arg(long, value_name = "FRAGMENT")]
    route: Option<String>,

    /// Ignore the saved snapshot and start at the spawn point
    #[arg(long)]
    fresh: bool,

    /// Camera mode (overrides [camera] mode)
    #[arg(long, value_enum)]
    camera: Option<CameraMode>,
}

/// Music slot owner: (zone index, track index).
type TrackId = (usize, usize);

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = GameConfig::load(args.config.as_deref());
    if let Some(mode) = args.camera {
        config.camera.mode = mode;
    }

    let data_dir = save::data_dir();
    init_logging(&config.logging, &data_dir);

    let world = load_world(config.world_path.as_deref()).with_context(|| match &config.world_path {
        Some(p) => format!("failed to load world {}", p.display()),
        None => "failed to load the built-in world".to_string(),
    })?;

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            let _ = renderer.cleanup();
            return Err(e).context("terminal init failed");
        }
    };

    let vp = renderer.viewport();
    let snapshot_file = save::snapshot_path(&data_dir);
    let state = initial_state(&world, &config, &args, &snapshot_file, vp);

    let sound = SoundEngine::new();
    let result = game_loop(&world, &config, state, &mut renderer, sound, honor_release, snapshot_file);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    result.context("frame loop failed")?;

    println!("Thanks for visiting {}!", world.title);
    Ok(())
}

/// Pipe log output to a file; the terminal belongs to the renderer.
fn init_logging(cfg: &LoggingConfig, data_dir: &Path) {
    let path = if cfg.file.is_absolute() { cfg.file.clone() } else { data_dir.join(&cfg.file) };
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled: cannot open {}: {e}", path.display());
            return;
        }
    };

    let env = env_logger::Env::default().default_filter_or(cfg.level.as_str());
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    log::info!("portfolio-world {} starting", env!("CARGO_PKG_VERSION"));
}

/// Spawn, then the snapshot (unless `--fresh`), then the `--route` panel.
fn initial_state(world: &World, config: &GameConfig, args: &Args, snapshot_file: &Path, vp: sim::camera::Viewport) -> SimState {
    let mut state = SimState::new(world, config.camera.mode, config.display.minimap, vp);

    if !args.fresh {
        if let Some(restored) = save::load(snapshot_file, world) {
            state.place_player(world, restored.player, vp);
            state.active_zone = restored.active_zone;
        }
    }

    if let Some(fragment) = &args.route {
        state.active_zone = route::zone_from_fragment(world, fragment);
        if state.active_zone.is_none() && !fragment.trim_start_matches('#').is_empty() {
            log::warn!("unknown route {fragment:?}; no panel opened");
        }
    }

    state
}

// ── Key Constants ──

const KEYS_ZOOM_IN: &[KeyCode] = &[KeyCode::Char('='), KeyCode::Char('+')];
const KEYS_ZOOM_OUT: &[KeyCode] = &[KeyCode::Char('-'), KeyCode::Char('_')];
const KEYS_ZOOM_RESET: &[KeyCode] = &[KeyCode::Char('0')];
const KEYS_MINIMAP: &[KeyCode] = &[KeyCode::Char('m')];
const KEYS_OPEN: &[KeyCode] = &[KeyCode::Enter];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q')];

fn game_loop(
    world: &World,
    config: &GameConfig,
    mut state: SimState,
    renderer: &mut Renderer,
    mut sound: Option<SoundEngine>,
    honor_release: bool,
    snapshot_file: PathBuf,
) -> io::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_config(&config.gamepad, config.input.stick_dead_zone);
    let mut joystick = Joystick::new(config.input.dead_zone, config.input.knob_radius);

    let mut audio: AudioRegistry<TrackId> = AudioRegistry::new();
    let mut audio_error: Option<String> = None;
    let mut history = History::new(route::fragment_for(state.active_id(world)));
    let mut writer = SnapshotWriter::new(snapshot_file);

    let frame = Duration::from_millis(config.display.frame_ms);
    let mut vp = renderer.viewport();
    let mut clock = FrameClock::new(Instant::now(), config.display.max_dt);

    loop {
        let frame_start = Instant::now();
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }

        if clock.focus(kb.focus, Instant::now()) {
            if clock.is_paused() {
                log::debug!("focus lost; pausing");
                joystick.cancel();
            } else {
                log::debug!("focus regained; resuming");
            }
        }
        let paused = clock.is_paused();
        if kb.resized.is_some() {
            vp = renderer.refresh_size();
        }

        let mut commands: Vec<Command> = Vec::new();
        let mut navigated = false;

        if !paused {
            if kb.was_pressed(KeyCode::Esc) {
                if state.active_zone.is_some() {
                    commands.push(Command::Close);
                } else {
                    break;
                }
            }
            if kb.any_pressed(KEYS_ZOOM_IN) { commands.push(Command::ZoomIn); }
            if kb.any_pressed(KEYS_ZOOM_OUT) { commands.push(Command::ZoomOut); }
            if kb.any_pressed(KEYS_ZOOM_RESET) { commands.push(Command::ZoomReset); }
            if kb.any_pressed(KEYS_MINIMAP) || gp.minimap_pressed() { commands.push(Command::ToggleMinimap); }
            if kb.any_pressed(KEYS_OPEN) || gp.open_pressed() { commands.push(Command::OpenOverlapped); }
            if gp.close_pressed() && state.active_zone.is_some() { commands.push(Command::Close); }

            if route_pointers(&kb.pointer_events, state.active_zone.is_some(), &*renderer, &mut joystick) {
                commands.push(Command::Close);
            }

            let target = if kb.was_pressed(KeyCode::Char('[')) {
                history.back().map(str::to_string)
            } else if kb.was_pressed(KeyCode::Char(']')) {
                history.forward().map(str::to_string)
            } else {
                None
            };
            if let Some(fragment) = target {
                log::debug!("history -> {fragment:?}");
                commands.push(match route::zone_from_fragment(world, &fragment) {
                    Some(zone) => Command::OpenZone(zone),
                    None => Command::Close,
                });
                navigated = true;
            }

            if let Some(zone) = state.active_zone {
                let digits: Vec<usize> = kb.pressed_digits().collect();
                for track in digits {
                    play_track(world, (zone, track), sound.as_mut(), &mut audio, &mut audio_error);
                }
            }
        }

        let dt = clock.tick(Instant::now());

        if !paused {
            let input = FrameInput {
                intent: intent::combine(&[
                    kb.keyboard_intent().merge(gp.dpad_intent()).vector(),
                    joystick.direction(),
                    gp.stick_intent(),
                ]),
                sprint: kb.sprint_held() || gp.sprint_held(),
                commands,
                viewport: vp,
            };
            let outcome = step::step(world, state, &input, dt, config);
            state = outcome.state;

            process_events(world, &outcome.events, sound.as_mut(), &mut audio, &mut audio_error);

            if !navigated {
                history.push(route::fragment_for(state.active_id(world)));
            }
            writer.commit(save::capture(world, &state));
        }

        if let (Some(owner), Some(sfx)) = (audio.current(), sound.as_ref()) {
            if sfx.track_finished() {
                audio.release(owner);
            }
        }

        let playing = audio
            .current()
            .filter(|&(zone, _)| Some(zone) == state.active_zone)
            .map(|(_, track)| track);
        let view = View {
            world,
            state: &state,
            joystick: joystick.track().map(|t| (t.start, joystick.knob_offset())),
            route: history.current(),
            playing,
            audio_error: audio_error.as_deref(),
            paused,
            pad_connected: gp.connected,
        };
        renderer.render(&view)?;

        let spent = frame_start.elapsed();
        if spent < frame {
            std::thread::sleep(frame - spent);
        }
    }

    if let Some(sfx) = sound.as_mut() {
        sfx.stop_track();
    }
    Ok(())
}

fn play_track(
    world: &World,
    owner: TrackId,
    sound: Option<&mut SoundEngine>,
    audio: &mut AudioRegistry<TrackId>,
    audio_error: &mut Option<String>,
) {
    let (zone, index) = owner;
    let Some(track) = world.zones.get(zone).and_then(|z| z.tracks.get(index)) else {
        return;
    };
    let Some(sfx) = sound else {
        *audio_error = Some("no audio output".to_string());
        return;
    };

    if let Some(prev) = audio.claim(owner) {
        log::debug!("track {prev:?} displaced by {owner:?}");
        sfx.stop_track();
    }
    match sfx.play_track(track) {
        Ok(()) => {
            log::info!("playing {:?}", track.title);
            *audio_error = None;
        }
        Err(e) => {
            log::warn!("could not play {:?}: {e}", track.title);
            audio.release(owner);
            *audio_error = Some(e);
        }
    }
}

fn process_events(
    world: &World,
    events: &[GameEvent],
    mut sound: Option<&mut SoundEngine>,
    audio: &mut AudioRegistry<TrackId>,
    audio_error: &mut Option<String>,
) {
    for event in events {
        match event {
            GameEvent::ZoneOpened { zone, cause } => {
                if let Some(z) = world.zones.get(*zone) {
                    log::info!("opened {} ({cause:?})", z.id);
                }
                *audio_error = None;
                if let Some(sfx) = sound.as_deref() {
                    sfx.play_open();
                }
            }
            GameEvent::ZoneClosed { zone } => {
                *audio_error = None;
                if let Some(owner) = audio.current().filter(|&(z, _)| z == *zone) {
                    audio.release(owner);
                    if let Some(sfx) = sound.as_deref_mut() {
                        sfx.stop_track();
                    }
                }
                if let Some(sfx) = sound.as_deref() {
                    sfx.play_close();
                }
            }
            GameEvent::StaminaDepleted => {
                log::debug!("stamina depleted");
                if let Some(sfx) = sound.as_deref() {
                    sfx.play_tired();
                }
            }
            GameEvent::StaminaRecovered => log::debug!("stamina recovered"),
            GameEvent::ZoomChanged(zoom) => log::debug!("zoom {zoom:.2}"),
            GameEvent::MinimapToggled(on) => log::debug!("minimap {}", if *on { "on" } else { "off" }),
        }
    }
}
