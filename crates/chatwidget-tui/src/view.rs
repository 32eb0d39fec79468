//! Terminal implementation of the chat widget's element contract.

use std::cell::Cell;

use chatwidget_engine::{ChatView, LogEntry, PendingId, QuickAction};

use crate::input::TextInputState;

/// Lines moved per scroll step.
const SCROLL_STEP: usize = 3;

/// Widget state painted by [`ChatPanel`](crate::widgets::ChatPanel).
#[derive(Debug, Default)]
pub struct TuiView {
    /// The message input field.
    pub input: TextInputState,
    entries: Vec<LogEntry>,
    displayed: bool,
    active: bool,
    /// Lines scrolled up from the bottom of the log.
    scroll_from_bottom: usize,
    /// Largest useful offset, recorded by the last draw of the log.
    max_scroll: Cell<usize>,
}

impl TuiView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in the log, oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Whether the panel has been laid out.
    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Whether the panel is in its active (visible) state.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current distance from the bottom of the log, in lines.
    pub fn scroll_from_bottom(&self) -> usize {
        self.scroll_from_bottom
    }

    /// Scroll towards older messages, stopping at the top of the log.
    pub fn scroll_up(&mut self) {
        let max = self.max_scroll.get();
        self.scroll_from_bottom = (self.scroll_from_bottom + SCROLL_STEP).min(max);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(SCROLL_STEP);
    }

    /// Record how far the log can scroll at its current size.
    ///
    /// Called while drawing; returns the offset to draw with.
    pub(crate) fn fit_scroll(&self, max_offset: usize) -> usize {
        self.max_scroll.set(max_offset);
        self.scroll_from_bottom.min(max_offset)
    }

    /// The `n`-th quick-action control currently in the log.
    pub fn quick_action(&self, n: usize) -> Option<QuickAction> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::QuickAction(action) => Some(*action),
                LogEntry::Turn(_) => None,
            })
            .nth(n)
    }
}

impl ChatView for TuiView {
    fn input_value(&self) -> String {
        self.input.content().to_string()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input.set(value);
    }

    fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    fn remove_pending(&mut self, id: &PendingId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.pending_id() != Some(id));
        self.entries.len() != before
    }

    fn clear_log(&mut self) {
        self.entries.clear();
        self.scroll_from_bottom = 0;
    }

    fn scroll_to_end(&mut self) {
        self.scroll_from_bottom = 0;
    }

    fn set_panel_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    fn set_panel_active(&mut self, active: bool) {
        self.active = active;
    }
}
