//! Chat widget controller.
//!
//! One [`ChatController`] is built per page. It owns the backend, the view and
//! the optional Markdown renderer, and implements the four user interactions:
//! submitting a message, rendering a message, clearing the history and
//! picking a suggestion.
//!
//! Failures never escape a handler. Application errors and transport errors
//! are turned into a bot bubble (for sends) or an alert (for clears), and the
//! controls disabled while a request is outstanding are restored by a drop
//! guard, so they also come back if the pending future is dropped.
//!
//! # Example
//!
//! ```rust,no_run
//! use ai_chat_widget::backend::HttpChatBackend;
//! use ai_chat_widget::config::WidgetConfig;
//! use ai_chat_widget::controller::ChatController;
//! use ai_chat_widget::view::HeadlessView;
//!
//! # async fn example() -> ai_chat_widget::error::Result<()> {
//! let config = WidgetConfig::default();
//! let backend = HttpChatBackend::new("http://localhost:5000", &config.endpoints)?;
//! let view = HeadlessView::new();
//! let controller = ChatController::from_config(backend, view.clone(), &config);
//!
//! view.type_input("Explain ownership");
//! controller.submit().await;
//! assert_eq!(view.bubbles().len(), 2);
//! # Ok(())
//! # }
//! ```

use tracing::{debug, info, warn};

use crate::backend::ChatBackend;
use crate::config::{WidgetConfig, WidgetTexts};
use crate::error::WidgetError;
use crate::markdown::{CommonMarkRenderer, MarkdownRenderer};
use crate::message::{Bubble, Message, Role};
use crate::view::ChatView;

/// Which path a submit took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was blank; nothing was sent.
    Empty,
    /// Input exceeded the configured limit; nothing was sent.
    TooLong,
    /// Backend answered with 2xx.
    Answered,
    /// Backend answered with a non-2xx status.
    Rejected,
    /// The request failed or the response could not be read.
    Unreachable,
}

/// Which path a clear took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The page has no clear control.
    Unavailable,
    /// The user declined the confirmation.
    Declined,
    /// History deleted and log emptied.
    Cleared,
    /// Backend answered with a non-2xx status.
    Rejected,
    /// The request failed.
    Unreachable,
}

/// Mediates between the page and the chat backend.
#[derive(Debug)]
pub struct ChatController<B, V> {
    backend: B,
    view: V,
    renderer: Option<Box<dyn MarkdownRenderer>>,
    texts: WidgetTexts,
    max_message_chars: Option<usize>,
}

impl<B: ChatBackend, V: ChatView> ChatController<B, V> {
    /// Create a controller with an explicit renderer. `None` renders every
    /// message as literal text.
    pub fn new(
        backend: B,
        view: V,
        renderer: Option<Box<dyn MarkdownRenderer>>,
        config: &WidgetConfig,
    ) -> Self {
        Self {
            backend,
            view,
            renderer,
            texts: config.texts.clone(),
            max_message_chars: config.limits.max_message_chars,
        }
    }

    /// Create a controller with the renderer described by `config.markdown`.
    pub fn from_config(backend: B, view: V, config: &WidgetConfig) -> Self {
        let renderer = CommonMarkRenderer::from_options(config.markdown);
        Self::new(backend, view, renderer, config)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether bot replies are rendered as Markdown.
    pub fn renders_markdown(&self) -> bool {
        self.renderer.is_some()
    }

    /// Send the current input to the backend and render the answer.
    pub async fn submit(&self) -> SubmitOutcome {
        let message = trim_input(&self.view.input_value()).to_string();
        if message.is_empty() {
            self.view.set_status(&self.texts.empty_message);
            return SubmitOutcome::Empty;
        }
        if let Some(max) = self.max_message_chars {
            if message.chars().count() > max {
                self.view.set_status(&self.texts.message_too_long);
                return SubmitOutcome::TooLong;
            }
        }

        self.render(&Message::user(message.as_str()));
        self.view.set_input_value("");

        let _pending = PendingSend::begin(&self.view, &self.texts.sending);
        self.send_message(&message).await
    }

    async fn send_message(&self, message: &str) -> SubmitOutcome {
        match self.backend.send(message).await {
            Ok(reply) => {
                let text = reply.text().unwrap_or(&self.texts.no_answer);
                self.render_message(Role::Bot, text);
                SubmitOutcome::Answered
            }
            Err(WidgetError::Api { status, message }) => {
                warn!(status, error = ?message, "Chat request rejected");
                let text = message.as_deref().unwrap_or(&self.texts.request_failed);
                self.render_message(Role::Bot, text);
                SubmitOutcome::Rejected
            }
            Err(err) => {
                warn!(error = %err, "Chat request failed");
                self.render_message(Role::Bot, &self.texts.connection_error);
                SubmitOutcome::Unreachable
            }
        }
    }

    /// Append a message to the log.
    ///
    /// Bot text goes through the renderer when there is one and is inserted
    /// as markup. User text is always inserted literally.
    pub fn render_message(&self, role: Role, text: &str) {
        let bubble = match (role, &self.renderer) {
            (Role::Bot, Some(renderer)) => Bubble::html(renderer.render(text)),
            _ => Bubble::text(role, text),
        };
        self.view.append_bubble(&bubble);
    }

    fn render(&self, message: &Message) {
        self.render_message(message.role, &message.text);
    }

    /// Ask for confirmation, then delete the stored history and empty the log.
    pub async fn clear_history(&self) -> ClearOutcome {
        let Some(original_label) = self.view.clear_control_label() else {
            return ClearOutcome::Unavailable;
        };
        if !self.view.confirm(&self.texts.clear_confirm) {
            debug!("Clear history declined");
            return ClearOutcome::Declined;
        }

        let _pending = PendingClear::begin(&self.view, original_label, &self.texts.clearing);
        match self.backend.clear().await {
            Ok(()) => {
                self.view.clear_log();
                self.view.alert(&self.texts.clear_success);
                info!("Chat history cleared");
                ClearOutcome::Cleared
            }
            Err(err) if err.is_application() => {
                warn!(error = %err, "Clear history rejected");
                self.view.alert(&self.texts.clear_failed);
                ClearOutcome::Rejected
            }
            Err(err) => {
                warn!(error = %err, "Clear history failed");
                self.view.alert(&self.texts.clear_error);
                ClearOutcome::Unreachable
            }
        }
    }

    /// Copy a suggestion's question into the input and focus it. Never sends.
    ///
    /// Returns `false` when the question is empty and nothing changed.
    pub fn select_suggestion(&self, question: &str) -> bool {
        if question.is_empty() {
            return false;
        }
        self.view.set_input_value(question);
        self.view.focus_input();
        true
    }
}

/// Trims whitespace and byte order marks, which `str::trim` keeps.
fn trim_input(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Disables the input while a send is outstanding.
struct PendingSend<'a, V: ChatView> {
    view: &'a V,
}

impl<'a, V: ChatView> PendingSend<'a, V> {
    fn begin(view: &'a V, status: &str) -> Self {
        view.set_status(status);
        view.set_input_enabled(false);
        Self { view }
    }
}

impl<V: ChatView> Drop for PendingSend<'_, V> {
    fn drop(&mut self) {
        self.view.set_status("");
        self.view.set_input_enabled(true);
        self.view.focus_input();
    }
}

/// Disables the clear control while a clear is outstanding.
struct PendingClear<'a, V: ChatView> {
    view: &'a V,
    original_label: String,
}

impl<'a, V: ChatView> PendingClear<'a, V> {
    fn begin(view: &'a V, original_label: String, busy_label: &str) -> Self {
        view.set_clear_control(false, busy_label);
        Self {
            view,
            original_label,
        }
    }
}

impl<V: ChatView> Drop for PendingClear<'_, V> {
    fn drop(&mut self) {
        self.view.set_clear_control(true, &self.original_label);
    }
}
