//! Test utilities for chatwidget-tui rendering and app tests.

use async_trait::async_trait;
use chatwidget_engine::{ChatReply, ChatTransport, Config, ControllerEvent, TransportError};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::app::App;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 100;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 32;

/// Create a test terminal with the default dimensions.
pub fn create_test_terminal() -> Terminal<TestBackend> {
    create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT)
}

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Transport that answers every message at once with a fixed outcome.
pub struct StubTransport {
    reply: Option<String>,
}

impl StubTransport {
    /// Answer with `{"respuesta": text}`.
    pub fn reply(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
        }
    }

    /// Fail every request with an unparsable body.
    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn send(&self, _message: &str) -> Result<ChatReply, TransportError> {
        match &self.reply {
            Some(text) => Ok(ChatReply::text(text.clone())),
            None => Err(TransportError::Parse(
                serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            )),
        }
    }
}

/// Create an app over `transport` with default config.
///
/// The export directory is never written by tests that use this helper.
pub fn create_test_app(
    transport: StubTransport,
) -> (App<StubTransport>, mpsc::UnboundedReceiver<ControllerEvent>) {
    App::new(transport, &Config::default(), PathBuf::from("target/test-exports"))
}

/// Convert a buffer to a string representation for assertions.
///
/// Each row becomes a line with trailing spaces removed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
