//! Conversation log entries.
//!
//! The log is the list of rendered entries owned by a [`ChatView`](crate::ChatView).
//! A user turn is always followed by a pending turn, which is later replaced
//! by exactly one bot or error turn.

use chrono::Utc;
use serde::Serialize;
use std::fmt;

/// Greeting shown after a reset.
pub const GREETING: &str =
    "¡Hola! Soy el asistente de análisis de denuncias. ¿En qué puedo ayudarte hoy?";

/// Indicator shown while a reply is in flight.
pub const PENDING_TEXT: &str = "Analizando...";

/// Shown in a bot bubble when the endpoint answers without a reply field.
pub const FALLBACK_REPLY: &str = "Error: no se pudo obtener una respuesta.";

/// Shown in an error bubble when the request itself fails.
pub const CONNECTION_ERROR: &str = "Error de conexión con el servidor.";

/// Shortcut prompts offered after a reset.
pub const QUICK_ACTIONS: [QuickAction; 2] = [
    QuickAction {
        label: "Resumen de riesgos",
        prompt: "Resumen de riesgos",
    },
    QuickAction {
        label: "Predicción 2026",
        prompt: "Predicción 2026",
    },
];

/// A preset message exposed as a clickable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    /// Text on the control.
    pub label: &'static str,
    /// Message sent when the control is used.
    pub prompt: &'static str,
}

/// Identifier of a pending turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PendingId(String);

impl PendingId {
    /// The id as rendered on the placeholder element.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hands out time-derived pending ids.
///
/// Two sends inside the same millisecond still get distinct ids thanks to
/// the sequence suffix.
#[derive(Debug, Default)]
pub struct PendingIdGenerator {
    seq: u64,
}

impl PendingIdGenerator {
    /// Create a generator starting at sequence zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id.
    pub fn next_id(&mut self) -> PendingId {
        let millis = Utc::now().timestamp_millis();
        let id = PendingId(format!("bot-loading-{millis}-{}", self.seq));
        self.seq += 1;
        id
    }
}

/// One rendered entry in the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Turn {
    /// Message typed by the user.
    User(String),
    /// Placeholder shown between send and settlement.
    Pending(PendingId),
    /// Reply from the chat endpoint (or the fallback text).
    Bot(String),
    /// Transport or parse failure.
    Error(String),
    /// Fixed greeting placed by a reset.
    Greeting(String),
}

/// Anything the log can hold: a turn or a quick-action control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LogEntry {
    Turn(Turn),
    QuickAction(QuickAction),
}

impl LogEntry {
    /// The pending id, if this entry is a pending turn.
    pub fn pending_id(&self) -> Option<&PendingId> {
        match self {
            Self::Turn(Turn::Pending(id)) => Some(id),
            _ => None,
        }
    }

    /// Whether this entry is a pending turn.
    pub fn is_pending(&self) -> bool {
        self.pending_id().is_some()
    }

    /// Plain text shown for the entry.
    pub fn text(&self) -> &str {
        match self {
            Self::Turn(
                Turn::User(text) | Turn::Bot(text) | Turn::Error(text) | Turn::Greeting(text),
            ) => text,
            Self::Turn(Turn::Pending(_)) => PENDING_TEXT,
            Self::QuickAction(action) => action.label,
        }
    }
}

impl From<Turn> for LogEntry {
    fn from(turn: Turn) -> Self {
        Self::Turn(turn)
    }
}

impl From<QuickAction> for LogEntry {
    fn from(action: QuickAction) -> Self {
        Self::QuickAction(action)
    }
}
