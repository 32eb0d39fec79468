//! Chat widget controller.
//!
//! The controller owns its view and a transport. Sending a message updates
//! the view synchronously (user turn, then pending turn) and spawns one task
//! for the request. When that task settles it posts a [`ControllerEvent`]
//! back to whoever drives the UI loop, which hands it to
//! [`ChatController::handle_event`]. The view is only ever touched from the
//! loop that owns the controller.
//!
//! Sends are not serialized: several pending turns can be in flight at once,
//! and each settlement replaces only its own placeholder. Replies therefore
//! land in settlement order, not send order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::transport::{ChatReply, ChatTransport, TransportError};
use crate::turn::{
    LogEntry, PendingId, PendingIdGenerator, Turn, CONNECTION_ERROR, FALLBACK_REPLY, GREETING,
    QUICK_ACTIONS,
};
use crate::view::ChatView;

/// A key press as seen by the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// The confirm key (Enter).
    Confirm,
    /// Any other key.
    Other,
}

/// Work delivered back to the controller from spawned tasks.
#[derive(Debug)]
pub enum ControllerEvent {
    /// The open delay elapsed; apply the active presentation state.
    ///
    /// `opening` numbers the open that scheduled it, so a timer left over
    /// from an earlier open is ignored.
    ActivatePanel { opening: u64 },
    /// A request settled.
    Settled {
        id: PendingId,
        result: Result<ChatReply, TransportError>,
    },
}

/// Handle to an in-flight send.
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct SendHandle {
    id: PendingId,
    task: JoinHandle<()>,
}

impl SendHandle {
    /// Id of the pending turn this send will resolve.
    pub fn id(&self) -> &PendingId {
        &self.id
    }

    /// Whether the request task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// The underlying task.
    pub fn into_task(self) -> JoinHandle<()> {
        self.task
    }
}

/// Drives a [`ChatView`] through the toggle, send and reset operations.
pub struct ChatController<V, T> {
    view: V,
    transport: Arc<T>,
    open: bool,
    open_delay: Duration,
    openings: u64,
    ids: PendingIdGenerator,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

impl<V: ChatView, T: ChatTransport> ChatController<V, T> {
    /// Create a controller and the receiver its completion events arrive on.
    pub fn new(
        view: V,
        transport: T,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            view,
            transport: Arc::new(transport),
            open: false,
            open_delay: config.open_delay(),
            openings: 0,
            ids: PendingIdGenerator::new(),
            events: tx,
        };
        (controller, rx)
    }

    /// The view being driven.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view (for input editing and scrolling).
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Whether the widget is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open or close the widget.
    ///
    /// Opening makes the panel paintable at once and applies the active state
    /// after the configured delay. Closing removes the active state
    /// immediately.
    pub fn toggle_visibility(&mut self) {
        self.open = !self.open;
        if self.open {
            self.openings += 1;
            self.view.set_panel_displayed(true);
            let tx = self.events.clone();
            let delay = self.open_delay;
            let opening = self.openings;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(ControllerEvent::ActivatePanel { opening });
            });
        } else {
            self.view.set_panel_active(false);
        }
    }

    /// Send the input when the confirm key is pressed.
    pub fn submit_on_enter(&mut self, key: KeyPress) -> Option<SendHandle> {
        match key {
            KeyPress::Confirm => self.send_message(),
            KeyPress::Other => None,
        }
    }

    /// Put a preset prompt in the input field and send it.
    pub fn quick_send(&mut self, preset: &str) -> Option<SendHandle> {
        self.view.set_input_value(preset);
        self.send_message()
    }

    /// Send the current input.
    ///
    /// Returns `None` without touching the log when the trimmed input is
    /// empty. Otherwise the user turn and its pending turn are in the log
    /// before this returns, and the request runs on a spawned task.
    pub fn send_message(&mut self) -> Option<SendHandle> {
        let input = self.view.input_value();
        let message = input.trim();
        if message.is_empty() {
            return None;
        }
        let message = message.to_string();

        self.view.append(Turn::User(message.clone()).into());
        self.view.set_input_value("");
        self.view.scroll_to_end();

        let id = self.ids.next_id();
        self.view.append(Turn::Pending(id.clone()).into());
        self.view.scroll_to_end();

        info!(pending = %id, chars = message.chars().count(), "sending chat message");

        let transport = Arc::clone(&self.transport);
        let tx = self.events.clone();
        let task_id = id.clone();
        let task = tokio::spawn(async move {
            let result = transport.send(&message).await;
            let _ = tx.send(ControllerEvent::Settled {
                id: task_id,
                result,
            });
        });

        Some(SendHandle { id, task })
    }

    /// Clear the log and restore the greeting and quick actions.
    pub fn reset_conversation(&mut self) {
        self.view.clear_log();
        self.view.append(Turn::Greeting(GREETING.into()).into());
        for action in QUICK_ACTIONS {
            self.view.append(LogEntry::QuickAction(action));
        }
    }

    /// Apply an event produced by a spawned task.
    pub fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::ActivatePanel { opening } => {
                if self.open && opening == self.openings {
                    self.view.set_panel_active(true);
                } else {
                    debug!(opening, current = self.openings, "stale panel activation");
                }
            }
            ControllerEvent::Settled { id, result } => self.settle(&id, result),
        }
    }

    fn settle(&mut self, id: &PendingId, result: Result<ChatReply, TransportError>) {
        if !self.view.remove_pending(id) {
            debug!(pending = %id, "pending turn already gone");
        }

        match result {
            Ok(reply) => {
                let text = reply.into_text().unwrap_or_else(|| {
                    debug!(pending = %id, "reply without respuesta field");
                    FALLBACK_REPLY.to_string()
                });
                self.view.append(Turn::Bot(text).into());
            }
            Err(e) => {
                error!(pending = %id, error = %e, "chat request failed");
                self.view.append(Turn::Error(CONNECTION_ERROR.into()).into());
            }
        }
        self.view.scroll_to_end();
    }
}
