//! Axis-aligned rectangles in world pixels.
//!
//! Coordinates are y-down: `(x, y)` is the top-left corner, `w`/`h` grow
//! right and down. Edges are half-open, so two rectangles that only share
//! an edge do not overlap.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Same size, new top-left corner.
    pub fn at(&self, pos: Vec2) -> Rect {
        Rect { x: pos.x, y: pos.y, ..*self }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 40.0, 40.0);
        let b = Rect::new(40.0, 0.0, 40.0, 40.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 40.0, 40.0);
        let b = Rect::new(39.0, 39.0, 10.0, 10.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(!r.contains(Vec2::new(30.0, 15.0)));
        assert!(!r.contains(Vec2::new(15.0, 30.0)));
    }

    #[test]
    fn center_and_at() {
        let r = Rect::new(0.0, 0.0, 28.0, 28.0);
        assert_eq!(r.center(), Vec2::new(14.0, 14.0));
        let moved = r.at(Vec2::new(5.0, 7.0));
        assert_eq!(moved, Rect::new(5.0, 7.0, 28.0, 28.0));
    }
}
