//! The element contract the controller drives.
//!
//! A [`ChatView`] stands for the handful of UI elements the widget needs: an
//! input field, a scrollable message log and the panel itself. The controller
//! receives its view at construction instead of looking elements up globally,
//! so tests can hand it a [`MemoryView`].

use crate::turn::{LogEntry, PendingId};

/// UI elements the chat controller depends on.
pub trait ChatView {
    /// Current content of the input field.
    fn input_value(&self) -> String;

    /// Replace the content of the input field.
    fn set_input_value(&mut self, value: &str);

    /// Append an entry to the end of the log.
    fn append(&mut self, entry: LogEntry);

    /// Remove the pending entry with this id. Returns whether one was found.
    fn remove_pending(&mut self, id: &PendingId) -> bool;

    /// Drop every entry in the log.
    fn clear_log(&mut self);

    /// Scroll the log so its last entry is visible.
    fn scroll_to_end(&mut self);

    /// Switch the panel's layout mode so it can be painted.
    fn set_panel_displayed(&mut self, displayed: bool);

    /// Apply or remove the "active" presentation state.
    fn set_panel_active(&mut self, active: bool);
}

/// In-memory view with no rendering.
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    pub input: String,
    pub entries: Vec<LogEntry>,
    pub displayed: bool,
    pub active: bool,
    /// Number of scroll-to-end requests received.
    pub scrolls: usize,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries that are still waiting for a reply.
    pub fn pending(&self) -> impl Iterator<Item = &PendingId> {
        self.entries.iter().filter_map(LogEntry::pending_id)
    }
}

impl ChatView for MemoryView {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        value.clone_into(&mut self.input);
    }

    fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    fn remove_pending(&mut self, id: &PendingId) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.pending_id() == Some(id))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear_log(&mut self) {
        self.entries.clear();
    }

    fn scroll_to_end(&mut self) {
        self.scrolls += 1;
    }

    fn set_panel_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    fn set_panel_active(&mut self, active: bool) {
        self.active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::{PendingIdGenerator, Turn};

    #[test]
    fn test_remove_pending_only_matches_its_id() {
        let mut ids = PendingIdGenerator::new();
        let first = ids.next_id();
        let second = ids.next_id();

        let mut view = MemoryView::new();
        view.append(Turn::Pending(first.clone()).into());
        view.append(Turn::Pending(second.clone()).into());

        assert!(view.remove_pending(&second));
        assert_eq!(view.pending().collect::<Vec<_>>(), vec![&first]);
        assert!(!view.remove_pending(&second));
    }
}
