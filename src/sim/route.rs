//! Route fragments: `#<zone-id>` names the open panel, `""` means none.
//!
//! `History` is a browser-style list of visited fragments with a cursor.
//! Pushing after going back drops the forward entries.

use super::world::World;

pub fn fragment_for(zone_id: Option<&str>) -> String {
    match zone_id {
        Some(id) => format!("#{id}"),
        None => String::new(),
    }
}

/// Zone index named by `fragment`. Accepts `#id` or a bare `id`,
/// case-insensitively. Empty or unknown ids give `None`.
pub fn zone_from_fragment(world: &World, fragment: &str) -> Option<usize> {
    let id = fragment.trim();
    let id = id.strip_prefix('#').unwrap_or(id);
    if id.is_empty() {
        return None;
    }
    world.zone_index(id)
}

/// Oldest entries are dropped past this many.
const MAX_HISTORY: usize = 256;

#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(initial: String) -> Self {
        History { entries: vec![initial], cursor: 0 }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    /// Record a navigation. Pushing the current entry again is a no-op.
    pub fn push(&mut self, fragment: String) {
        if self.current() == fragment {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment);
        if self.entries.len() > MAX_HISTORY {
            let excess = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }
}
