//! Application state and update logic for the chat widget TUI.

use std::path::PathBuf;

use chatwidget_engine::{ChatController, ChatTransport, Config, ControllerEvent, KeyPress};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::Action;
use crate::export::export_transcript;
use crate::theme::Theme;
use crate::view::TuiView;

/// Main application state.
pub struct App<T> {
    /// Controller driving the chat panel.
    pub controller: ChatController<TuiView, T>,
    /// Colors in use.
    pub theme: Theme,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// One-line status shown in the header (export results and the like).
    pub status: Option<String>,
    /// Where transcripts are exported.
    export_dir: PathBuf,
    /// Where the assistant is reached, shown in the header.
    endpoint: String,
}

impl<T: ChatTransport> App<T> {
    /// Create the app and the receiver for controller events.
    ///
    /// The log starts in its reset state: greeting plus quick actions.
    pub fn new(
        transport: T,
        config: &Config,
        export_dir: PathBuf,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (mut controller, rx) = ChatController::new(TuiView::new(), transport, config);
        controller.reset_conversation();
        let app = Self {
            controller,
            theme: Theme::from_name(config.theme),
            should_quit: false,
            status: None,
            export_dir,
            endpoint: config.chat_url(),
        };
        (app, rx)
    }

    /// The view painted by the chat panel.
    pub fn view(&self) -> &TuiView {
        self.controller.view()
    }

    /// Endpoint URL shown in the header.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether the panel is open.
    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    /// Handle a key action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Toggle => self.controller.toggle_visibility(),
            Action::Back => {
                if self.controller.is_open() {
                    self.controller.toggle_visibility();
                } else {
                    self.should_quit = true;
                }
            }
            _ if !self.controller.is_open() => {}
            Action::Submit => {
                self.controller.submit_on_enter(KeyPress::Confirm);
            }
            Action::QuickAction(n) => {
                if let Some(action) = self.controller.view().quick_action(n) {
                    self.controller.quick_send(action.prompt);
                } else {
                    debug!(index = n, "no quick action at index");
                }
            }
            Action::Reset => {
                self.controller.reset_conversation();
                self.status = None;
            }
            Action::Export => self.export(),
            Action::ScrollUp => self.controller.view_mut().scroll_up(),
            Action::ScrollDown => self.controller.view_mut().scroll_down(),
            Action::Insert(c) => self.controller.view_mut().input.insert(c),
            Action::Backspace => self.controller.view_mut().input.backspace(),
            Action::Delete => self.controller.view_mut().input.delete(),
            Action::Left => self.controller.view_mut().input.move_left(),
            Action::Right => self.controller.view_mut().input.move_right(),
            Action::Home => self.controller.view_mut().input.move_home(),
            Action::End => self.controller.view_mut().input.move_end(),
            Action::None => {}
        }
    }

    /// Apply an event posted by the controller's tasks.
    pub fn handle_controller_event(&mut self, event: ControllerEvent) {
        self.controller.handle_event(event);
    }

    fn export(&mut self) {
        match export_transcript(&self.export_dir, self.controller.view().entries()) {
            Ok(path) => self.status = Some(format!("Conversación exportada a {}", path.display())),
            Err(e) => {
                warn!(error = %e, "transcript export failed");
                self.status = Some(format!("No se pudo exportar: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, StubTransport};
    use chatwidget_engine::turn::{CONNECTION_ERROR, GREETING};
    use chatwidget_engine::{LogEntry, Turn, QUICK_ACTIONS};
    use tempfile::TempDir;

    async fn settle_next(
        app: &mut App<StubTransport>,
        rx: &mut mpsc::UnboundedReceiver<ControllerEvent>,
    ) {
        let event = rx.recv().await.unwrap();
        app.handle_controller_event(event);
    }

    fn type_text(app: &mut App<StubTransport>, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Insert(c));
        }
    }

    #[tokio::test]
    async fn test_starts_with_greeting_and_quick_actions() {
        let (app, _rx) = create_test_app(StubTransport::reply("ok"));
        let entries = app.view().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], LogEntry::from(Turn::Greeting(GREETING.into())));
        assert_eq!(entries[1], LogEntry::QuickAction(QUICK_ACTIONS[0]));
        assert!(!app.is_open());
    }

    #[tokio::test]
    async fn test_keys_ignored_while_closed() {
        let (mut app, _rx) = create_test_app(StubTransport::reply("ok"));
        type_text(&mut app, "hola");
        app.handle_action(Action::Submit);
        assert!(app.view().input.is_empty());
        assert_eq!(app.view().entries().len(), 3);
    }

    #[tokio::test]
    async fn test_toggle_then_activate() {
        let (mut app, mut rx) = create_test_app(StubTransport::reply("ok"));
        app.handle_action(Action::Toggle);
        assert!(app.is_open());
        assert!(app.view().is_displayed());
        assert!(!app.view().is_active());

        settle_next(&mut app, &mut rx).await;
        assert!(app.view().is_active());
    }

    #[tokio::test]
    async fn test_typed_message_round_trip() {
        let (mut app, mut rx) = create_test_app(StubTransport::reply("Lima: 120"));
        app.handle_action(Action::Toggle);
        type_text(&mut app, "  ¿Cuántas denuncias?  ");
        app.handle_action(Action::Submit);

        assert!(app.view().input.is_empty());
        let entries = app.view().entries();
        assert_eq!(entries[3], LogEntry::from(Turn::User("¿Cuántas denuncias?".into())));
        assert!(entries[4].is_pending());

        // activation and settlement arrive in either order
        settle_next(&mut app, &mut rx).await;
        settle_next(&mut app, &mut rx).await;
        let entries = app.view().entries();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[4], LogEntry::from(Turn::Bot("Lima: 120".into())));
    }

    #[tokio::test]
    async fn test_quick_action_sends_prompt() {
        let (mut app, mut rx) = create_test_app(StubTransport::failing());
        app.handle_action(Action::Toggle);
        app.handle_action(Action::QuickAction(1));
        assert_eq!(
            app.view().entries()[3],
            LogEntry::from(Turn::User(QUICK_ACTIONS[1].prompt.into()))
        );

        settle_next(&mut app, &mut rx).await;
        settle_next(&mut app, &mut rx).await;
        assert_eq!(
            app.view().entries().last(),
            Some(&LogEntry::from(Turn::Error(CONNECTION_ERROR.into())))
        );
    }

    #[tokio::test]
    async fn test_missing_quick_action_is_ignored() {
        let (mut app, _rx) = create_test_app(StubTransport::reply("ok"));
        app.handle_action(Action::Toggle);
        app.handle_action(Action::QuickAction(5));
        assert_eq!(app.view().entries().len(), 3);
    }

    #[tokio::test]
    async fn test_back_closes_then_quits() {
        let (mut app, _rx) = create_test_app(StubTransport::reply("ok"));
        app.handle_action(Action::Toggle);
        app.handle_action(Action::Back);
        assert!(!app.is_open());
        assert!(!app.should_quit);
        app.handle_action(Action::Back);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_reset_restores_initial_log() {
        let (mut app, _rx) = create_test_app(StubTransport::reply("ok"));
        app.handle_action(Action::Toggle);
        type_text(&mut app, "hola");
        app.handle_action(Action::Submit);
        assert_eq!(app.view().entries().len(), 5);

        app.handle_action(Action::Reset);
        assert_eq!(app.view().entries().len(), 3);
    }

    #[tokio::test]
    async fn test_export_reports_path() {
        let temp = TempDir::new().unwrap();
        let (mut app, _rx) = App::new(
            StubTransport::reply("ok"),
            &Config::default(),
            temp.path().to_path_buf(),
        );
        app.handle_action(Action::Toggle);
        app.handle_action(Action::Export);

        let status = app.status.clone().unwrap();
        assert!(status.starts_with("Conversación exportada a"));
        let exported = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(exported, 1);
    }
}
