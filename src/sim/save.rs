/// Persisted snapshot: where the player stands and which panel is open.
///
/// ## File format (JSON):
///   ```json
///   { "player": { "x": 686.0, "y": 446.0 }, "activeZone": "music" }
///   ```
///   `activeZone` is `null` when no panel is open.
///
/// Read once at startup; written by `SnapshotWriter` on every frame where
/// the snapshot differs from the last one written. All failures are
/// logged and ignored: a broken snapshot only costs the restore.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::world::{SimState, World};

const SNAPSHOT_FILE: &str = "snapshot.json";

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player: SnapshotPlayer,
    #[serde(rename = "activeZone", default)]
    pub active_zone: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPlayer {
    pub x: f32,
    pub y: f32,
}

/// A snapshot checked against the loaded world.
#[derive(Clone, Debug, PartialEq)]
pub struct Restored {
    pub player: Vec2,
    pub active_zone: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("player position is not a finite number")]
    NonFinite,
    #[error("player position ({x}, {y}) is outside the world")]
    OutOfBounds { x: f32, y: f32 },
    #[error("player position ({x}, {y}) overlaps a wall")]
    InsideWall { x: f32, y: f32 },
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Directory for the snapshot and the log file.
pub fn data_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_portfolio_world");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/portfolio-world)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/portfolio-world");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE)
}

// ══════════════════════════════════════════════════════════════
// Capture / validate
// ══════════════════════════════════════════════════════════════

pub fn capture(world: &World, state: &SimState) -> Snapshot {
    Snapshot {
        player: SnapshotPlayer { x: state.player.x, y: state.player.y },
        active_zone: state.active_id(world).map(str::to_string),
    }
}

/// Shallow shape check first: serde would also accept a struct written as
/// a JSON array, which is not a snapshot.
pub fn decode(text: &str) -> Result<Snapshot, SnapshotError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let is_object = |v: Option<&serde_json::Value>| v.is_some_and(serde_json::Value::is_object);
    if !is_object(Some(&value)) {
        return Err(shape_error("snapshot must be a JSON object"));
    }
    if !is_object(value.get("player")) {
        return Err(shape_error("`player` must be an object with `x` and `y`"));
    }
    Ok(serde_json::from_value(value)?)
}

fn shape_error(msg: &str) -> SnapshotError {
    SnapshotError::Decode(<serde_json::Error as serde::de::Error>::custom(msg))
}

/// Check a decoded snapshot against the world. Bad positions reject the
/// whole snapshot; an unknown zone id only drops the panel.
pub fn validate(snap: &Snapshot, world: &World) -> Result<Restored, SnapshotError> {
    let SnapshotPlayer { x, y } = snap.player;
    if !(x.is_finite() && y.is_finite()) {
        return Err(SnapshotError::NonFinite);
    }

    let rect = world.spawn_rect().at(Vec2::new(x, y));
    let size = world.size();
    if x < 0.0 || y < 0.0 || rect.right() > size.x || rect.bottom() > size.y {
        return Err(SnapshotError::OutOfBounds { x, y });
    }
    if world.grid.overlaps_solid(&rect) {
        return Err(SnapshotError::InsideWall { x, y });
    }

    let active_zone = match snap.active_zone.as_deref() {
        Some(id) => {
            let found = world.zone_index(id);
            if found.is_none() {
                log::warn!("snapshot names unknown zone {id:?}; ignoring it");
            }
            found
        }
        None => None,
    };

    Ok(Restored { player: Vec2::new(x, y), active_zone })
}

// ══════════════════════════════════════════════════════════════
// Load / store
// ══════════════════════════════════════════════════════════════

/// Read and validate the snapshot at `path`. Any failure yields `None`.
pub fn load(path: &Path, world: &World) -> Option<Restored> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no snapshot at {}", path.display());
            return None;
        }
        Err(e) => {
            log::warn!("could not read snapshot {}: {e}", path.display());
            return None;
        }
    };

    match decode(&text).and_then(|snap| validate(&snap, world)) {
        Ok(restored) => {
            log::info!("restored snapshot from {}", path.display());
            Some(restored)
        }
        Err(e) => {
            log::warn!("discarding snapshot {}: {e}", path.display());
            None
        }
    }
}

/// Write via a temp file and rename so a crash never leaves half a file.
pub fn store(path: &Path, snap: &Snapshot) -> Result<(), SnapshotError> {
    let json = serde_json::to_string(snap)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Writes the snapshot only when it changed since the last write.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    last: Option<Snapshot>,
}

impl SnapshotWriter {
    pub fn new(path: PathBuf) -> Self {
        SnapshotWriter { path, last: None }
    }

    /// Returns true if a write was attempted.
    pub fn commit(&mut self, snap: Snapshot) -> bool {
        if self.last.as_ref() == Some(&snap) {
            return false;
        }
        if let Err(e) = store(&self.path, &snap) {
            // Remembered anyway so a broken disk does not log every frame.
            log::debug!("snapshot write to {} failed: {e}", self.path.display());
        }
        self.last = Some(snap);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::camera::{CameraMode, Viewport};
    use crate::sim::level::parse_world;

    fn world() -> World {
        parse_world(
            r"
            map = [
                '######',
                '#.P..#',
                '#..#.#',
                '######',
            ]

            [[zones]]
            id = 'music'
            color = '#d96cff'
            x = 4
            y = 1
            w = 1
            h = 2
            ",
        )
        .unwrap()
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("portfolio-world-{}-{name}", std::process::id()))
    }

    fn snap(x: f32, y: f32, zone: Option<&str>) -> Snapshot {
        Snapshot { player: SnapshotPlayer { x, y }, active_zone: zone.map(str::to_string) }
    }

    #[test]
    fn json_uses_camel_case_zone_key() {
        let json = serde_json::to_string(&snap(1.5, 2.0, Some("music"))).unwrap();
        assert_eq!(json, r#"{"player":{"x":1.5,"y":2.0},"activeZone":"music"}"#);
        let back = decode(r#"{"player":{"x":3,"y":4},"activeZone":null}"#).unwrap();
        assert_eq!(back, snap(3.0, 4.0, None));
        // Missing key reads as no panel.
        assert_eq!(decode(r#"{"player":{"x":3,"y":4}}"#).unwrap().active_zone, None);
    }

    #[test]
    fn wrong_types_fail_to_decode() {
        assert!(matches!(decode("not json"), Err(SnapshotError::Decode(_))));
        assert!(matches!(decode(r#"{"player":{"x":"a","y":4}}"#), Err(SnapshotError::Decode(_))));
        assert!(matches!(decode(r#"{"player":[1,2]}"#), Err(SnapshotError::Decode(_))));
        assert!(matches!(decode(r#"[{"x":1,"y":2},null]"#), Err(SnapshotError::Decode(_))));
        assert!(matches!(decode(r#"{"activeZone":"music"}"#), Err(SnapshotError::Decode(_))));
        assert!(matches!(decode(r#"{"player":{"x":1,"y":2},"activeZone":5}"#), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn validate_checks_position() {
        let w = world();
        let ok = validate(&snap(46.0, 46.0, Some("music")), &w).unwrap();
        assert_eq!(ok, Restored { player: Vec2::new(46.0, 46.0), active_zone: Some(0) });

        assert!(matches!(validate(&snap(f32::NAN, 1.0, None), &w), Err(SnapshotError::NonFinite)));
        assert!(matches!(validate(&snap(-1.0, 46.0, None), &w), Err(SnapshotError::OutOfBounds { .. })));
        assert!(matches!(validate(&snap(230.0, 46.0, None), &w), Err(SnapshotError::OutOfBounds { .. })));
        // Overlaps the border wall and the inner block.
        assert!(matches!(validate(&snap(20.0, 46.0, None), &w), Err(SnapshotError::InsideWall { .. })));
        assert!(matches!(validate(&snap(110.0, 90.0, None), &w), Err(SnapshotError::InsideWall { .. })));
    }

    #[test]
    fn unknown_zone_keeps_position() {
        let w = world();
        let r = validate(&snap(46.0, 46.0, Some("guestbook")), &w).unwrap();
        assert_eq!(r.player, Vec2::new(46.0, 46.0));
        assert_eq!(r.active_zone, None);
    }

    #[test]
    fn zone_id_matches_like_a_fragment() {
        let w = world();
        let r = validate(&snap(46.0, 46.0, Some("MUSIC")), &w).unwrap();
        assert_eq!(r.active_zone, Some(0));
        assert_eq!(r.active_zone, crate::sim::route::zone_from_fragment(&w, "#MUSIC"));
    }

    #[test]
    fn store_then_load() {
        let w = world();
        let path = temp_file("store.json");
        store(&path, &snap(86.0, 46.0, Some("music"))).unwrap();
        let r = load(&path, &w).unwrap();
        assert_eq!(r.player, Vec2::new(86.0, 46.0));
        assert_eq!(r.active_zone, Some(0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_discards_missing_and_malformed_files() {
        let w = world();
        assert_eq!(load(&temp_file("missing.json"), &w), None);

        let path = temp_file("garbage.json");
        std::fs::write(&path, "{\"player\": 12").unwrap();
        assert_eq!(load(&path, &w), None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn writer_skips_unchanged_snapshots() {
        let w = world();
        let state = SimState::new(&w, CameraMode::Follow, true, Viewport::new(200.0, 100.0));
        let path = temp_file("writer.json");
        let mut writer = SnapshotWriter::new(path.clone());

        assert!(writer.commit(capture(&w, &state)));
        assert!(!writer.commit(capture(&w, &state)));

        let mut moved = state.clone();
        moved.player.x += 4.0;
        assert!(writer.commit(capture(&w, &moved)));
        assert_eq!(load(&path, &w).unwrap().player.x, state.player.x + 4.0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn capture_records_active_zone_id() {
        let w = world();
        let mut state = SimState::new(&w, CameraMode::Follow, true, Viewport::new(200.0, 100.0));
        assert_eq!(capture(&w, &state).active_zone, None);
        state.active_zone = Some(0);
        let s = capture(&w, &state);
        assert_eq!(s.active_zone.as_deref(), Some("music"));
        assert_eq!(s.player, SnapshotPlayer { x: 86.0, y: 46.0 });
    }
}
