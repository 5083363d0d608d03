//! Tile collision resolver.
//!
//! Movement is resolved one axis at a time, X first, then Y using the
//! already-updated rectangle:
//!
//!   1. Integrate `vel * dt` on the axis and clamp to the world bounds.
//!   2. Sweep the tile columns (or rows) the leading edge crossed, across
//!      the rectangle's span on the other axis.
//!   3. On the first solid tile, snap so the leading edge sits exactly on
//!      that tile's boundary.
//!
//! Because X resolves before Y, a diagonal move into an inside corner
//! slides along whichever wall the X pass hits. That is inherited
//! behavior and is kept as is.

use glam::Vec2;

use super::geom::Rect;
use super::tile::{TileGrid, EDGE_EPS};

/// Move `rect` by `vel * dt`, stopping flush against solid tiles and
/// clamping to the world. A non-positive or non-finite `dt` only clamps.
pub fn resolve_move(grid: &TileGrid, rect: Rect, vel: Vec2, dt: f32) -> Rect {
    let mut r = clamp_to_world(grid, rect);
    if !(dt.is_finite() && dt > 0.0) {
        return r;
    }
    let vel = if vel.is_finite() { vel } else { Vec2::ZERO };
    let max_x = (grid.world_width() - r.w).max(0.0);
    let max_y = (grid.world_height() - r.h).max(0.0);

    let from = r.x;
    r.x = (r.x + vel.x * dt).clamp(0.0, max_x);
    r.x = sweep_x(grid, &r, from);

    let from = r.y;
    r.y = (r.y + vel.y * dt).clamp(0.0, max_y);
    r.y = sweep_y(grid, &r, from);

    r
}

/// Keep the rectangle inside `[0, world - size]` on both axes.
pub fn clamp_to_world(grid: &TileGrid, rect: Rect) -> Rect {
    let max_x = (grid.world_width() - rect.w).max(0.0);
    let max_y = (grid.world_height() - rect.h).max(0.0);
    Rect {
        x: if rect.x.is_finite() { rect.x.clamp(0.0, max_x) } else { 0.0 },
        y: if rect.y.is_finite() { rect.y.clamp(0.0, max_y) } else { 0.0 },
        ..rect
    }
}

fn sweep_x(grid: &TileGrid, r: &Rect, from: f32) -> f32 {
    let ts = grid.tile_size();
    let (row0, row1) = grid.span(r.y, r.h);
    let blocked = |col: i32| (row0..=row1).any(|row| grid.is_solid(col, row));

    if r.x > from {
        let lead_from = from + r.w;
        let first = grid.index_of(lead_from);
        let last = grid.index_of(r.x + r.w - EDGE_EPS);
        for col in first..=last {
            let edge = col as f32 * ts;
            // Column was already under the rectangle before the move.
            if edge + EDGE_EPS < lead_from {
                continue;
            }
            if blocked(col) {
                return edge - r.w;
            }
        }
    } else if r.x < from {
        let first = grid.index_of(from - EDGE_EPS);
        let last = grid.index_of(r.x + EDGE_EPS).min(first);
        for col in (last..=first).rev() {
            let edge = (col + 1) as f32 * ts;
            if edge > from + EDGE_EPS {
                continue;
            }
            if blocked(col) {
                return edge;
            }
        }
    }
    r.x
}

fn sweep_y(grid: &TileGrid, r: &Rect, from: f32) -> f32 {
    let ts = grid.tile_size();
    let (col0, col1) = grid.span(r.x, r.w);
    let blocked = |row: i32| (col0..=col1).any(|col| grid.is_solid(col, row));

    if r.y > from {
        let lead_from = from + r.h;
        let first = grid.index_of(lead_from);
        let last = grid.index_of(r.y + r.h - EDGE_EPS);
        for row in first..=last {
            let edge = row as f32 * ts;
            if edge + EDGE_EPS < lead_from {
                continue;
            }
            if blocked(row) {
                return edge - r.h;
            }
        }
    } else if r.y < from {
        let first = grid.index_of(from - EDGE_EPS);
        let last = grid.index_of(r.y + EDGE_EPS).min(first);
        for row in (last..=first).rev() {
            let edge = (row + 1) as f32 * ts;
            if edge > from + EDGE_EPS {
                continue;
            }
            if blocked(row) {
                return edge;
            }
        }
    }
    r.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> TileGrid {
        TileGrid::from_rows(rows, 40.0)
    }

    const MAZE: [&str; 7] = [
        "##########",
        "#...#....#",
        "#.#...##.#",
        "#...#....#",
        "#.##..#..#",
        "#........#",
        "##########",
    ];

    /// Random walk from `start`; every step must stay clear of walls and
    /// inside the world.
    fn random_walk(g: &TileGrid, start: Rect, steps: usize) {
        let mut rng: u32 = 0x2545_f491;
        let mut next = || {
            rng = rng.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (rng >> 8) as f32 / (1u32 << 24) as f32
        };

        let mut r = start;
        assert!(!g.overlaps_solid(&r));
        for _ in 0..steps {
            let vel = Vec2::new(next() * 2400.0 - 1200.0, next() * 2400.0 - 1200.0);
            let dt = next() * 0.1;
            r = resolve_move(g, r, vel, dt);
            assert!(!g.overlaps_solid(&r), "overlap at {:?}", r);
            assert!(r.x >= 0.0 && r.x <= g.world_width() - r.w);
            assert!(r.y >= 0.0 && r.y <= g.world_height() - r.h);
        }
    }

    fn player_at(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 28.0, 28.0)
    }

    #[test]
    fn stops_flush_against_wall_on_the_right() {
        let g = grid_from(&[".#....", "......"]);
        let r = resolve_move(&g, player_at(0.0, 0.0), Vec2::new(100.0, 0.0), 1.0);
        assert_eq!(r.x, 12.0);
        assert_eq!(r.y, 0.0);
        assert!(!g.overlaps_solid(&r));
    }

    #[test]
    fn stops_flush_against_wall_on_the_left() {
        let g = grid_from(&["#.....", "......"]);
        let r = resolve_move(&g, player_at(100.0, 5.0), Vec2::new(-300.0, 0.0), 1.0);
        assert_eq!(r.x, 40.0);
        assert_eq!(r.y, 5.0);
    }

    #[test]
    fn stops_flush_moving_down_and_up() {
        let g = grid_from(&["...", "...", "...", "###"]);
        let down = resolve_move(&g, player_at(10.0, 0.0), Vec2::new(0.0, 500.0), 1.0);
        assert_eq!(down.y, 120.0 - 28.0);

        let g = grid_from(&["###", "...", "...", "..."]);
        let up = resolve_move(&g, player_at(10.0, 100.0), Vec2::new(0.0, -500.0), 1.0);
        assert_eq!(up.y, 40.0);
    }

    #[test]
    fn flush_rectangle_cannot_push_further() {
        let g = grid_from(&[".#...."]);
        let r = resolve_move(&g, player_at(12.0, 0.0), Vec2::new(50.0, 0.0), 0.1);
        assert_eq!(r.x, 12.0);
    }

    #[test]
    fn fast_move_stops_at_first_wall_not_last() {
        let g = grid_from(&["...#..#..."]);
        let r = resolve_move(&g, player_at(0.0, 0.0), Vec2::new(1000.0, 0.0), 1.0);
        assert_eq!(r.x, 120.0 - 28.0);
    }

    #[test]
    fn wall_outside_vertical_span_does_not_block() {
        let g = grid_from(&["......", ".#....", "......"]);
        // Player sits in row 0 only; the solid tile is in row 1.
        let r = resolve_move(&g, player_at(0.0, 0.0), Vec2::new(60.0, 0.0), 1.0);
        assert_eq!(r.x, 60.0);
    }

    #[test]
    fn clamps_to_world_bounds() {
        let g = grid_from(&["....", "...."]);
        let r = resolve_move(&g, player_at(50.0, 10.0), Vec2::new(10_000.0, 10_000.0), 1.0);
        assert_eq!(r.x, 160.0 - 28.0);
        assert_eq!(r.y, 80.0 - 28.0);

        let r = resolve_move(&g, player_at(50.0, 10.0), Vec2::new(-10_000.0, -10_000.0), 1.0);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.y, 0.0);
    }

    #[test]
    fn diagonal_into_wall_slides_along_it() {
        // Wall column to the right; X stops, Y keeps going.
        let g = grid_from(&[".#..", ".#..", ".#..", "...."]);
        let r = resolve_move(&g, player_at(0.0, 0.0), Vec2::new(100.0, 30.0), 1.0);
        assert_eq!(r.x, 12.0);
        assert_eq!(r.y, 30.0);
    }

    #[test]
    fn inside_corner_resolves_x_first() {
        // Solid tile diagonally down-right of the player only.
        let g = grid_from(&["....", ".#..", "...."]);
        let start = player_at(10.0, 10.0);
        let r = resolve_move(&g, start, Vec2::new(20.0, 20.0), 1.0);
        // X moves freely (row 0 only), then Y is blocked by the tile in column 1.
        assert_eq!(r.x, 30.0);
        assert_eq!(r.y, 12.0);
        assert!(!g.overlaps_solid(&r));
    }

    #[test]
    fn degenerate_dt_only_clamps() {
        let g = grid_from(&["...."]);
        let start = player_at(5.0, 0.0);
        assert_eq!(resolve_move(&g, start, Vec2::new(100.0, 0.0), 0.0), start);
        assert_eq!(resolve_move(&g, start, Vec2::new(100.0, 0.0), f32::NAN), start);
        assert_eq!(resolve_move(&g, start, Vec2::new(f32::INFINITY, 0.0), 0.1), start);
    }

    #[test]
    fn random_moves_never_overlap_or_leave_world() {
        random_walk(&grid_from(&MAZE), player_at(46.0, 46.0), 5_000);
    }

    #[test]
    fn inexact_tile_sizes_never_overlap() {
        for (ts, ps) in [(33.3, 21.7), (24.7, 17.9), (17.9, 12.1), (10.1, 8.3)] {
            let g = TileGrid::from_rows(&MAZE, ts);
            random_walk(&g, Rect::new(ts + 1.0, ts + 1.0, ps, ps), 5_000);
        }
    }

    #[test]
    fn left_snap_at_inexact_boundary_stays_clear() {
        let mut row = ".".repeat(40);
        row.replace_range(30..31, "#");
        let g = TileGrid::from_rows(&[row.as_str()], 33.3);
        let r = resolve_move(&g, Rect::new(1063.85, 0.0, 21.7, 21.7), Vec2::new(-813.0, 0.0), 0.1);
        assert!((r.x - 1032.3).abs() < 1e-3);
        assert!(!g.overlaps_solid(&r));
    }
}
