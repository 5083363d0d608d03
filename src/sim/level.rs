/// World loader.
///
/// ## Sources (priority order):
///   1. `[general] world` path from config.toml
///   2. Built-in world embedded from `assets/world.toml`
///
/// ## Format (TOML):
///   ```toml
///   title = "Portfolio World"
///   tile_size = 40.0
///   player_size = 28.0
///   map = ["#####", "#.P.#", "#####"]
///
///   [[zones]]
///   id = "about"          # also the route fragment: #about
///   label = "About"
///   color = "#4f8cff"
///   x = 1                 # rectangle in tiles
///   y = 1
///   w = 2
///   h = 1
///   lines = ["..."]
///
///   [[zones.tracks]]      # optional, played with the digit keys
///   title = "Loop"
///   beat_ms = 180
///   notes = [60, 64, 67, 0]
///   ```
///
/// ## Tile legend:
///   '#' = Solid    '.' or ' ' = Empty    'P' = Player spawn (exactly one)
///
/// The player spawns centered in the `P` tile.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;

use crate::domain::geom::Rect;
use crate::domain::tile::TileGrid;
use crate::domain::zone::{Rgb, Track, Zone};
use super::world::World;

pub const BUILTIN_WORLD: &str = include_str!("../../assets/world.toml");

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid world file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("map is empty")]
    EmptyMap,
    #[error("map row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },
    #[error("unknown map character {ch:?} at row {row}, column {col}")]
    BadChar { ch: char, row: usize, col: usize },
    #[error("map must contain exactly one 'P' spawn, found {0}")]
    Spawn(usize),
    #[error("player spawn overlaps a solid tile")]
    SpawnBlocked,
    #[error("tile_size must be positive and player_size in (0, tile_size]")]
    BadSize,
    #[error("zone id {0:?} must be non-empty ASCII letters, digits, '-' or '_'")]
    BadZoneId(String),
    #[error("duplicate zone id {0:?}")]
    DuplicateZone(String),
    #[error("zone {id:?}: bad color {color:?} (expected #rrggbb)")]
    BadColor { id: String, color: String },
    #[error("zone {0:?} is empty or lies outside the world")]
    ZoneOutside(String),
}

// ══════════════════════════════════════════════════════════════
// File schema
// ══════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct WorldFile {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_player_size")]
    player_size: f32,
    map: Vec<String>,
    #[serde(default)]
    zones: Vec<ZoneFile>,
}

#[derive(Deserialize, Debug)]
struct ZoneFile {
    id: String,
    #[serde(default)]
    label: Option<String>,
    color: String,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    #[serde(default)]
    lines: Vec<String>,
    #[serde(default)]
    tracks: Vec<TrackFile>,
}

#[derive(Deserialize, Debug)]
struct TrackFile {
    title: String,
    notes: Vec<u8>,
    #[serde(default = "default_beat_ms")]
    beat_ms: u32,
}

fn default_title() -> String { "Portfolio World".into() }
fn default_tile_size() -> f32 { 40.0 }
fn default_player_size() -> f32 { 28.0 }
fn default_beat_ms() -> u32 { 200 }

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the world from `path`, or the built-in world when `None`.
pub fn load_world(path: Option<&Path>) -> Result<World, WorldError> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .map_err(|source| WorldError::Io { path: p.to_path_buf(), source })?;
            let world = parse_world(&text)?;
            log::info!("loaded world {:?} from {}", world.title, p.display());
            Ok(world)
        }
        None => {
            let world = parse_world(BUILTIN_WORLD)?;
            log::info!("loaded built-in world {:?}", world.title);
            Ok(world)
        }
    }
}

pub fn parse_world(text: &str) -> Result<World, WorldError> {
    let file: WorldFile = toml::from_str(text)?;

    let ts = file.tile_size;
    let ps = file.player_size;
    if !(ts.is_finite() && ts > 0.0 && ps.is_finite() && ps > 0.0 && ps <= ts) {
        return Err(WorldError::BadSize);
    }

    let (grid, spawn_tile) = parse_map(&file.map, ts)?;
    let inset = (ts - ps) * 0.5;
    let spawn = Vec2::new(
        spawn_tile.0 as f32 * ts + inset,
        spawn_tile.1 as f32 * ts + inset,
    );
    if grid.overlaps_solid(&Rect::new(spawn.x, spawn.y, ps, ps)) {
        return Err(WorldError::SpawnBlocked);
    }

    let mut seen = HashSet::new();
    let mut zones = Vec::with_capacity(file.zones.len());
    for z in file.zones {
        zones.push(build_zone(z, &grid, &mut seen)?);
    }

    Ok(World { title: file.title, grid, zones, spawn, player_size: ps })
}

// ══════════════════════════════════════════════════════════════
// Validation
// ══════════════════════════════════════════════════════════════

/// Returns the grid and the spawn tile `(col, row)`.
fn parse_map(map: &[String], tile_size: f32) -> Result<(TileGrid, (usize, usize)), WorldError> {
    let expected = map.first().map(|r| r.chars().count()).unwrap_or(0);
    if expected == 0 {
        return Err(WorldError::EmptyMap);
    }

    let mut spawns = vec![];
    for (row, line) in map.iter().enumerate() {
        let found = line.chars().count();
        if found != expected {
            return Err(WorldError::RaggedRow { row, found, expected });
        }
        for (col, ch) in line.chars().enumerate() {
            match ch {
                '#' | '.' | ' ' => {}
                'P' => spawns.push((col, row)),
                _ => return Err(WorldError::BadChar { ch, row, col }),
            }
        }
    }
    if spawns.len() != 1 {
        return Err(WorldError::Spawn(spawns.len()));
    }

    let rows: Vec<&str> = map.iter().map(String::as_str).collect();
    Ok((TileGrid::from_rows(&rows, tile_size), spawns[0]))
}

fn build_zone(z: ZoneFile, grid: &TileGrid, seen: &mut HashSet<String>) -> Result<Zone, WorldError> {
    let id_ok = !z.id.is_empty()
        && z.id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !id_ok {
        return Err(WorldError::BadZoneId(z.id));
    }
    // Fragments match case-insensitively, so ids must too.
    if !seen.insert(z.id.to_ascii_lowercase()) {
        return Err(WorldError::DuplicateZone(z.id));
    }
    let Some(color) = Rgb::parse_hex(&z.color) else {
        return Err(WorldError::BadColor { id: z.id, color: z.color });
    };

    let fits = z.w > 0
        && z.h > 0
        && (z.x as u64 + z.w as u64) <= grid.cols() as u64
        && (z.y as u64 + z.h as u64) <= grid.rows() as u64;
    if !fits {
        return Err(WorldError::ZoneOutside(z.id));
    }

    let ts = grid.tile_size();
    let rect = Rect::new(z.x as f32 * ts, z.y as f32 * ts, z.w as f32 * ts, z.h as f32 * ts);
    let tracks = z
        .tracks
        .into_iter()
        .map(|t| Track { title: t.title, notes: t.notes, beat_ms: t.beat_ms.clamp(40, 2000) })
        .collect();

    Ok(Zone {
        label: z.label.unwrap_or_else(|| z.id.clone()),
        id: z.id,
        color,
        rect,
        lines: z.lines,
        tracks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r"
        title = 'Small'
        map = [
            '######',
            '#.P..#',
            '#....#',
            '######',
        ]

        [[zones]]
        id = 'about'
        color = '#112233'
        x = 3
        y = 1
        w = 2
        h = 2
        lines = ['hello']
    ";

    #[test]
    fn builtin_world_loads() {
        let w = load_world(None).unwrap();
        let ids: Vec<&str> = w.zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, ["about", "projects", "music", "contact"]);
        assert_eq!(w.grid.cols(), 40);
        assert_eq!(w.grid.rows(), 24);
        assert!(!w.grid.overlaps_solid(&w.spawn_rect()));
        let music = &w.zones[w.zone_index("music").unwrap()];
        assert_eq!(music.tracks.len(), 3);
        // No zone overlaps the spawn, so nothing opens on the first frame.
        assert!(w.zones.iter().all(|z| !z.rect.intersects(&w.spawn_rect())));
    }

    #[test]
    fn spawn_is_centered_in_p_tile() {
        let w = parse_world(SMALL).unwrap();
        assert_eq!(w.spawn, Vec2::new(86.0, 46.0));
        assert_eq!(w.title, "Small");
        assert_eq!(w.zones[0].label, "about");
        assert_eq!(w.zones[0].rect, Rect::new(120.0, 40.0, 80.0, 80.0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let text = "map = [\"####\", \"#P.\", \"####\"]";
        assert!(matches!(
            parse_world(text),
            Err(WorldError::RaggedRow { row: 1, found: 3, expected: 4 })
        ));
    }

    #[test]
    fn spawn_count_and_characters_are_checked() {
        assert!(matches!(parse_world("map = [\"#..#\"]"), Err(WorldError::Spawn(0))));
        assert!(matches!(parse_world("map = [\"#PP#\"]"), Err(WorldError::Spawn(2))));
        assert!(matches!(
            parse_world("map = [\"#P$#\"]"),
            Err(WorldError::BadChar { ch: '$', row: 0, col: 2 })
        ));
        assert!(matches!(parse_world("map = []"), Err(WorldError::EmptyMap)));
    }

    #[test]
    fn zone_validation() {
        let dup = format!("{SMALL}\n[[zones]]\nid = \"About\"\ncolor = \"#000000\"\nx = 1\ny = 1\nw = 1\nh = 1\n");
        assert!(matches!(parse_world(&dup), Err(WorldError::DuplicateZone(_))));

        let bad_color = SMALL.replace("#112233", "blue");
        assert!(matches!(parse_world(&bad_color), Err(WorldError::BadColor { .. })));

        let outside = SMALL.replace("w = 2", "w = 9");
        assert!(matches!(parse_world(&outside), Err(WorldError::ZoneOutside(_))));

        let bad_id = SMALL.replace("id = \"about\"", "id = \"a b\"");
        assert!(matches!(parse_world(&bad_id), Err(WorldError::BadZoneId(_))));
    }

    #[test]
    fn sizes_are_checked() {
        let text = format!("player_size = 50.0\n{SMALL}");
        assert!(matches!(parse_world(&text), Err(WorldError::BadSize)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_world(Some(Path::new("/nonexistent/world.toml"))).unwrap_err();
        assert!(matches!(err, WorldError::Io { .. }));
    }
}
