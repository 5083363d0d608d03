//! External configuration loader.
//!
//! Reads `config.toml` from an explicit path, or searches the executable's
//! directory and then the CWD. Falls back to defaults if the file is
//! missing or incomplete; every key has its own serde default so a partial
//! file only overrides what it names.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sim::camera::CameraMode;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    pub input: InputConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub logging: LoggingConfig,
    /// World definition file; `None` uses the built-in world.
    pub world_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct MovementConfig {
    /// Walking speed in world px per second.
    pub base_speed: f32,
    pub sprint_speed: f32,
    /// Stamina units (of 1.0) lost per second of sprinting.
    pub stamina_drain: f32,
    pub stamina_regen: f32,
    /// Stamina needed before sprint unlocks again after running dry.
    pub stamina_recover_at: f32,
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub mode: CameraMode,
    /// Dead-zone half-extent as a fraction of the view.
    pub margin: f32,
    /// Per-frame blend toward the follow target (frame-rate dependent).
    pub lerp: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    /// Joystick dead-zone radius in screen px.
    pub dead_zone: f32,
    /// Joystick knob travel in screen px.
    pub knob_radius: f32,
    pub stick_dead_zone: f32,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub frame_ms: u64,
    /// Longest simulated frame, in seconds.
    pub max_dt: f32,
    pub minimap: bool,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub open: Vec<String>,
    pub close: Vec<String>,
    pub minimap: Vec<String>,
    pub sprint: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file; relative paths land in the data directory.
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    movement: TomlMovement,
    #[serde(default)]
    camera: TomlCamera,
    #[serde(default)]
    input: TomlInput,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    logging: TomlLogging,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMovement {
    #[serde(default = "default_base_speed")]
    base_speed: f32,
    #[serde(default = "default_sprint_speed")]
    sprint_speed: f32,
    #[serde(default = "default_stamina_drain")]
    stamina_drain: f32,
    #[serde(default = "default_stamina_regen")]
    stamina_regen: f32,
    #[serde(default = "default_stamina_recover_at")]
    stamina_recover_at: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCamera {
    #[serde(default)]
    mode: CameraMode,
    #[serde(default = "default_margin")]
    margin: f32,
    #[serde(default = "default_lerp")]
    lerp: f32,
    #[serde(default = "default_zoom_min")]
    zoom_min: f32,
    #[serde(default = "default_zoom_max")]
    zoom_max: f32,
    #[serde(default = "default_zoom_step")]
    zoom_step: f32,
}

#[derive(Deserialize, Debug)]
struct TomlInput {
    #[serde(default = "default_dead_zone")]
    dead_zone: f32,
    #[serde(default = "default_knob_radius")]
    knob_radius: f32,
    #[serde(default = "default_stick_dead_zone")]
    stick_dead_zone: f32,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_max_dt")]
    max_dt: f32,
    #[serde(default = "default_minimap")]
    minimap: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_open")]
    open: Vec<String>,
    #[serde(default = "default_pad_close")]
    close: Vec<String>,
    #[serde(default = "default_pad_minimap")]
    minimap: Vec<String>,
    #[serde(default = "default_pad_sprint")]
    sprint: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    world: Option<String>,
}

// ── Defaults ──

fn default_base_speed() -> f32 { 220.0 }
fn default_sprint_speed() -> f32 { 360.0 }
fn default_stamina_drain() -> f32 { 0.35 }  // ~3s of sprint from full
fn default_stamina_regen() -> f32 { 0.2 }
fn default_stamina_recover_at() -> f32 { 0.25 }

fn default_margin() -> f32 { 0.3 }
fn default_lerp() -> f32 { 0.15 }
fn default_zoom_min() -> f32 { 0.5 }
fn default_zoom_max() -> f32 { 2.0 }
fn default_zoom_step() -> f32 { 0.25 }

fn default_dead_zone() -> f32 { 8.0 }
fn default_knob_radius() -> f32 { 60.0 }
fn default_stick_dead_zone() -> f32 { 0.25 }

fn default_frame_ms() -> u64 { 16 }
fn default_max_dt() -> f32 { 0.1 }
fn default_minimap() -> bool { true }

fn default_pad_open() -> Vec<String> { vec!["A".into()] }
fn default_pad_close() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_pad_minimap() -> Vec<String> { vec!["Y".into()] }
fn default_pad_sprint() -> Vec<String> { vec!["X".into(), "R1".into()] }

fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "portfolio-world.log".into() }

impl Default for TomlMovement {
    fn default() -> Self {
        TomlMovement {
            base_speed: default_base_speed(),
            sprint_speed: default_sprint_speed(),
            stamina_drain: default_stamina_drain(),
            stamina_regen: default_stamina_regen(),
            stamina_recover_at: default_stamina_recover_at(),
        }
    }
}

impl Default for TomlCamera {
    fn default() -> Self {
        TomlCamera {
            mode: CameraMode::default(),
            margin: default_margin(),
            lerp: default_lerp(),
            zoom_min: default_zoom_min(),
            zoom_max: default_zoom_max(),
            zoom_step: default_zoom_step(),
        }
    }
}

impl Default for TomlInput {
    fn default() -> Self {
        TomlInput {
            dead_zone: default_dead_zone(),
            knob_radius: default_knob_radius(),
            stick_dead_zone: default_stick_dead_zone(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            frame_ms: default_frame_ms(),
            max_dt: default_max_dt(),
            minimap: default_minimap(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            open: default_pad_open(),
            close: default_pad_close(),
            minimap: default_pad_minimap(),
            sprint: default_pad_sprint(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from `explicit`, or from the first `config.toml` found
    /// in the exe directory / CWD. Errors fall back to defaults with a warning
    /// on stderr (the terminal is not in raw mode yet).
    pub fn load(explicit: Option<&Path>) -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = match explicit {
            Some(path) => read_toml(path).unwrap_or_default(),
            None => search_dirs
                .iter()
                .map(|d| d.join("config.toml"))
                .find(|p| p.exists())
                .and_then(|p| read_toml(&p))
                .unwrap_or_default(),
        };

        let mut dirs = search_dirs;
        if let Some(parent) = explicit.and_then(Path::parent) {
            dirs.insert(0, parent.to_path_buf());
        }
        GameConfig::from_toml(toml_cfg, &dirs)
    }

    /// Parse a config document; relative paths are kept as written.
    #[cfg(test)]
    fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let zoom_min = cfg.camera.zoom_min.max(0.05);
        GameConfig {
            movement: MovementConfig {
                base_speed: cfg.movement.base_speed.max(0.0),
                sprint_speed: cfg.movement.sprint_speed.max(cfg.movement.base_speed).max(0.0),
                stamina_drain: cfg.movement.stamina_drain.max(0.0),
                stamina_regen: cfg.movement.stamina_regen.max(0.0),
                stamina_recover_at: cfg.movement.stamina_recover_at.clamp(0.0, 1.0),
            },
            camera: CameraConfig {
                mode: cfg.camera.mode,
                margin: cfg.camera.margin.clamp(0.0, 0.5),
                lerp: cfg.camera.lerp.clamp(0.01, 1.0),
                zoom_min,
                zoom_max: cfg.camera.zoom_max.max(zoom_min),
                zoom_step: cfg.camera.zoom_step.max(0.01),
            },
            input: InputConfig {
                dead_zone: cfg.input.dead_zone.max(0.0),
                knob_radius: cfg.input.knob_radius.max(1.0),
                stick_dead_zone: cfg.input.stick_dead_zone.clamp(0.0, 0.95),
            },
            display: DisplayConfig {
                frame_ms: cfg.display.frame_ms.clamp(1, 250),
                max_dt: cfg.display.max_dt.clamp(0.001, 1.0),
                minimap: cfg.display.minimap,
            },
            gamepad: GamepadConfig {
                open: cfg.gamepad.open,
                close: cfg.gamepad.close,
                minimap: cfg.gamepad.minimap,
                sprint: cfg.gamepad.sprint,
            },
            logging: LoggingConfig {
                level: cfg.logging.level,
                file: PathBuf::from(cfg.logging.file),
            },
            world_path: cfg.general.world.map(|w| resolve_path(&w, search_dirs)),
        }
    }
}

/// Absolute paths are used as is; relative ones are looked up in the
/// search dirs, falling back to the path relative to CWD.
fn resolve_path(path: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() {
        return p;
    }
    search_dirs
        .iter()
        .map(|d| d.join(&p))
        .find(|c| c.exists())
        .unwrap_or(p)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn read_toml(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                None
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            None
        }
    }
}
