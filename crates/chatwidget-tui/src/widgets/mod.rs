//! UI widgets for the chat widget.
//!
//! This module provides:
//! - [`ChatPanel`] - Message log, input field and key hints
//! - [`Launcher`] - The toggle target that opens and closes the panel

mod chat_panel;
mod launcher;

pub use chat_panel::ChatPanel;
pub use launcher::Launcher;
