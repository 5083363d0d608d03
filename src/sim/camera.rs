//! Camera: view transform from world px to screen px.
//!
//! `screen = (world - pos) * zoom + offset`, and the inverse
//! `world = (screen - offset) / zoom + pos`.
//!
//! ## Modes
//!
//!   **Follow**: the view scrolls only when the player's center leaves a
//!   dead zone of `margin` x view extent around the view center. The move
//!   toward the new position is blended by a fixed per-frame `lerp`, so the
//!   smoothing depends on frame rate.
//!
//!   **Fit**: the whole world is scaled to fit the viewport and centered
//!   (letterboxed). User zoom multiplies the fit scale; once zoomed in past
//!   the world size the view centers on the player.
//!
//! On either axis a world smaller than the view is centered.

use glam::Vec2;
use serde::Deserialize;

use crate::config::CameraConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Follow,
    Fit,
}

/// Drawable area in screen px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width: width.max(1.0), height: height.max(1.0) }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// World-space top-left of the view. Negative when centering a small world.
    pub pos: Vec2,
    /// Effective scale (screen px per world px).
    pub zoom: f32,
    /// User zoom factor from the `-` / `=` / `0` keys.
    pub user_zoom: f32,
    /// Letterbox offset in screen px.
    pub offset: Vec2,
    pub mode: CameraMode,
}

impl Camera {
    pub fn new(mode: CameraMode) -> Self {
        Camera { pos: Vec2::ZERO, zoom: 1.0, user_zoom: 1.0, offset: Vec2::ZERO, mode }
    }

    /// World px visible through the viewport at the current zoom.
    pub fn view_size(&self, vp: Viewport) -> Vec2 {
        vp.size() / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.pos) * self.zoom + self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom + self.pos
    }

    // ── Zoom ──

    /// Returns true if the zoom level changed.
    pub fn zoom_in(&mut self, cfg: &CameraConfig) -> bool {
        self.set_user_zoom(self.user_zoom + cfg.zoom_step, cfg)
    }

    pub fn zoom_out(&mut self, cfg: &CameraConfig) -> bool {
        self.set_user_zoom(self.user_zoom - cfg.zoom_step, cfg)
    }

    pub fn reset_zoom(&mut self, cfg: &CameraConfig) -> bool {
        self.set_user_zoom(1.0, cfg)
    }

    fn set_user_zoom(&mut self, z: f32, cfg: &CameraConfig) -> bool {
        // Round to avoid drift after many steps.
        let z = ((z * 100.0).round() / 100.0).clamp(cfg.zoom_min, cfg.zoom_max);
        let changed = (z - self.user_zoom).abs() > f32::EPSILON;
        self.user_zoom = z;
        changed
    }

    // ── Per-frame update ──

    /// Track `target` (the player's center) for one frame.
    pub fn update(&mut self, target: Vec2, world: Vec2, vp: Viewport, cfg: &CameraConfig) {
        match self.mode {
            CameraMode::Follow => self.follow(target, world, vp, cfg.margin, cfg.lerp),
            CameraMode::Fit => self.fit(target, world, vp),
        }
    }

    /// Center on `target` immediately. Used on load and restore.
    pub fn snap_to(&mut self, target: Vec2, world: Vec2, vp: Viewport) {
        match self.mode {
            CameraMode::Follow => self.follow(target, world, vp, 0.0, 1.0),
            CameraMode::Fit => self.fit(target, world, vp),
        }
    }

    fn follow(&mut self, target: Vec2, world: Vec2, vp: Viewport, margin: f32, lerp: f32) {
        self.zoom = self.user_zoom;
        self.offset = Vec2::ZERO;
        let view = self.view_size(vp);
        let center = self.pos + view * 0.5;
        let d = target - center;
        let limit = view * margin;

        let mut desired = self.pos;
        if d.x.abs() > limit.x {
            desired.x += d.x - limit.x.copysign(d.x);
        }
        if d.y.abs() > limit.y {
            desired.y += d.y - limit.y.copysign(d.y);
        }
        self.pos += (desired - self.pos) * lerp;

        self.pos.x = clamp_axis(self.pos.x, view.x, world.x);
        self.pos.y = clamp_axis(self.pos.y, view.y, world.y);
    }

    fn fit(&mut self, target: Vec2, world: Vec2, vp: Viewport) {
        let base = (vp.width / world.x.max(1.0)).min(vp.height / world.y.max(1.0));
        self.zoom = base * self.user_zoom;
        let view = self.view_size(vp);

        self.pos = Vec2::ZERO;
        self.offset = Vec2::ZERO;
        if view.x >= world.x {
            self.offset.x = (vp.width - world.x * self.zoom) * 0.5;
        } else {
            self.pos.x = clamp_axis(target.x - view.x * 0.5, view.x, world.x);
        }
        if view.y >= world.y {
            self.offset.y = (vp.height - world.y * self.zoom) * 0.5;
        } else {
            self.pos.y = clamp_axis(target.y - view.y * 0.5, view.y, world.y);
        }
    }
}

/// Clamp a view origin to `[0, world - view]`, or center when the world
/// is smaller than the view.
fn clamp_axis(pos: f32, view: f32, world: f32) -> f32 {
    if world <= view {
        -(view - world) * 0.5
    } else if pos.is_finite() {
        pos.clamp(0.0, world - view)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CameraConfig {
        CameraConfig {
            mode: CameraMode::Follow,
            margin: 0.3,
            lerp: 0.15,
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.25,
        }
    }

    const WORLD: Vec2 = Vec2::new(1600.0, 960.0);

    #[test]
    fn follow_is_still_while_player_within_margin() {
        let c = cfg();
        let vp = Viewport::new(800.0, 480.0);
        let mut cam = Camera::new(CameraMode::Follow);
        cam.snap_to(Vec2::new(800.0, 480.0), WORLD, vp);
        let before = cam.pos;

        // Wander inside the dead zone (0.3 * 800 = 240 px either side).
        for dx in [-200.0, -50.0, 0.0, 120.0, 230.0] {
            cam.update(Vec2::new(800.0 + dx, 480.0 + dx * 0.3), WORLD, vp, &c);
            assert_eq!(cam.pos, before);
        }
    }

    #[test]
    fn follow_scrolls_toward_player_outside_margin() {
        let c = cfg();
        let vp = Viewport::new(800.0, 480.0);
        let mut cam = Camera::new(CameraMode::Follow);
        cam.snap_to(Vec2::new(800.0, 480.0), WORLD, vp);
        let before = cam.pos;

        let target = Vec2::new(1400.0, 480.0);
        cam.update(target, WORLD, vp, &c);
        assert!(cam.pos.x > before.x);
        for _ in 0..200 {
            cam.update(target, WORLD, vp, &c);
        }
        // Settles with the target on the dead-zone edge, clamped to the world.
        let view = cam.view_size(vp);
        assert!(cam.pos.x <= WORLD.x - view.x + 1e-3);
        let center = cam.pos + view * 0.5;
        assert!((target.x - center.x) <= view.x * c.margin + 1.0);
    }

    #[test]
    fn follow_clamps_and_centers_small_worlds() {
        let vp = Viewport::new(800.0, 480.0);
        let mut cam = Camera::new(CameraMode::Follow);
        cam.snap_to(Vec2::ZERO, WORLD, vp);
        assert_eq!(cam.pos, Vec2::ZERO);

        let small = Vec2::new(400.0, 200.0);
        cam.snap_to(Vec2::new(200.0, 100.0), small, vp);
        assert_eq!(cam.pos, Vec2::new(-200.0, -140.0));
        // World is centered on screen.
        assert_eq!(cam.world_to_screen(small * 0.5), vp.size() * 0.5);
    }

    #[test]
    fn screen_world_round_trip() {
        let c = cfg();
        let vp = Viewport::new(640.0, 480.0);
        for mode in [CameraMode::Follow, CameraMode::Fit] {
            let mut cam = Camera::new(mode);
            cam.zoom_in(&c);
            cam.update(Vec2::new(900.0, 300.0), WORLD, vp, &c);
            for p in [Vec2::ZERO, Vec2::new(123.5, 77.0), Vec2::new(1599.0, 959.0)] {
                let back = cam.screen_to_world(cam.world_to_screen(p));
                assert!((back - p).length() < 1e-2, "{mode:?} {p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn fit_letterboxes_world_in_viewport() {
        let c = cfg();
        let vp = Viewport::new(800.0, 800.0);
        let mut cam = Camera::new(CameraMode::Fit);
        cam.update(Vec2::new(10.0, 10.0), WORLD, vp, &c);

        assert!((cam.zoom - 0.5).abs() < 1e-6);
        assert_eq!(cam.offset.x, 0.0);
        assert!((cam.offset.y - 160.0).abs() < 1e-3);
        let top_left = cam.world_to_screen(Vec2::ZERO);
        let bottom_right = cam.world_to_screen(WORLD);
        assert!((top_left - Vec2::new(0.0, 160.0)).length() < 1e-3);
        assert!((bottom_right - Vec2::new(800.0, 640.0)).length() < 1e-3);
    }

    #[test]
    fn zoom_steps_are_clamped() {
        let c = cfg();
        let mut cam = Camera::new(CameraMode::Follow);
        for _ in 0..10 {
            cam.zoom_in(&c);
        }
        assert_eq!(cam.user_zoom, 2.0);
        assert!(!cam.zoom_in(&c));

        for _ in 0..10 {
            cam.zoom_out(&c);
        }
        assert_eq!(cam.user_zoom, 0.5);

        assert!(cam.reset_zoom(&c));
        assert_eq!(cam.user_zoom, 1.0);
        assert!(!cam.reset_zoom(&c));
    }
}
