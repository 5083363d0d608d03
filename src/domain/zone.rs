//! Zones: labeled world rectangles that open a content panel on entry.
//!
//! `ZoneTrigger` keeps one inside/outside flag per zone and reports only
//! outside -> inside transitions, so lingering in a zone never re-fires.
//! Closing a panel does not touch these flags; the player has to walk out
//! and back in to fire again.

use super::geom::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb`.
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    /// Blend toward black; `t` = 1.0 keeps the color, 0.0 is black.
    pub fn dim(self, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let f = |c: u8| (c as f32 * t).round() as u8;
        Rgb { r: f(self.r), g: f(self.g), b: f(self.b) }
    }
}

/// A short procedural tune: MIDI note numbers (0 = rest), one per beat.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub title: String,
    pub notes: Vec<u8>,
    pub beat_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub id: String,
    pub label: String,
    pub color: Rgb,
    pub rect: Rect,
    pub lines: Vec<String>,
    pub tracks: Vec<Track>,
}

/// Index of the first zone overlapping `rect`, in list order.
pub fn first_overlapping(zones: &[Zone], rect: &Rect) -> Option<usize> {
    zones.iter().position(|z| z.rect.intersects(rect))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneTrigger {
    inside: Vec<bool>,
}

impl ZoneTrigger {
    pub fn new(count: usize) -> Self {
        ZoneTrigger { inside: vec![false; count] }
    }

    /// Record current overlaps without reporting any entries.
    /// Used after a restore so a player saved inside a zone does not
    /// immediately reopen it.
    pub fn prime(&mut self, zones: &[Zone], rect: &Rect) {
        self.inside = zones.iter().map(|z| z.rect.intersects(rect)).collect();
    }

    /// Update flags for the player's new rectangle; returns the indices
    /// of zones entered this frame, in list order.
    pub fn update(&mut self, zones: &[Zone], rect: &Rect) -> Vec<usize> {
        if self.inside.len() != zones.len() {
            self.inside.resize(zones.len(), false);
        }
        let mut entered = Vec::new();
        for (i, zone) in zones.iter().enumerate() {
            let now = zone.rect.intersects(rect);
            if now && !self.inside[i] {
                entered.push(i);
            }
            self.inside[i] = now;
        }
        entered
    }

    pub fn is_inside(&self, index: usize) -> bool {
        self.inside.get(index).copied().unwrap_or(false)
    }
}
