//! chatwidget-engine: Headless core of the chatwidget assistant client
//!
//! This crate provides everything that does not depend on a terminal:
//! - The conversation log model (turns, quick actions, pending ids)
//! - The [`ChatView`] element contract and an in-memory view
//! - The chat endpoint transport
//! - The [`ChatController`] send/receive cycle
//! - HTML templating and navigation routes

pub mod config;
pub mod controller;
pub mod markup;
pub mod navigation;
pub mod transport;
pub mod turn;
pub mod view;

// Re-export commonly used types
pub use config::{Config, ConfigError, ThemeName};
pub use controller::{ChatController, ControllerEvent, KeyPress, SendHandle};
pub use markup::{escape_html, render_entry, render_log};
pub use navigation::{navigation_target, Selector, UnknownSelector};
pub use transport::{encode_form, ChatReply, ChatTransport, HttpTransport, TransportError};
pub use turn::{LogEntry, PendingId, QuickAction, Turn, QUICK_ACTIONS};
pub use view::{ChatView, MemoryView};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
