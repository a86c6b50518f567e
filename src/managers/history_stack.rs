//! Per-tab back/forward history.

use serde::Serialize;

/// Ordered list of visited logical URLs with a current position.
///
/// Never empty; `index` always addresses an entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryStack {
    entries: Vec<String>,
    index: usize,
}

impl HistoryStack {
    /// Creates a history seeded with a single entry.
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            index: 0,
        }
    }

    /// Records a navigation to `url`.
    ///
    /// Forward entries past the current position are discarded before the
    /// new entry is appended. This is the only way entries get added.
    pub fn push(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url.to_string());
        self.index = self.entries.len() - 1;
    }

    /// Moves one entry back and returns the entry now current.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Moves one entry forward and returns the entry now current.
    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
