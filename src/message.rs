//! Chat message and bubble types.
//!
//! A [`Message`] is what the user typed or what the backend answered. A
//! [`Bubble`] is that message prepared for the log: its role decides the CSS
//! classes, its [`BubbleContent`] decides whether the page receives literal
//! text or markup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Class on the inner element of every bubble.
pub const BUBBLE_CLASS: &str = "ai-chat-bubble";

/// Class shared by every bubble wrapper.
pub const MESSAGE_CLASS: &str = "ai-chat-message";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed into the input field.
    User,
    /// Text produced by the widget on behalf of the backend.
    Bot,
}

impl Role {
    /// Returns the role as used in class names.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Lives only until it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// The message text.
    pub text: String,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create a bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// What goes inside a bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleContent {
    /// Inserted as text content, never parsed as markup.
    Text(String),
    /// Inserted as live markup. Only produced for bot messages.
    Html(String),
}

impl BubbleContent {
    /// The raw string, whichever variant.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Html(s) => s,
        }
    }

    /// Whether the content is markup.
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html(_))
    }
}

/// A message prepared for the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    /// Role of the author, drives styling.
    pub role: Role,
    /// Rendered content.
    pub content: BubbleContent,
}

impl Bubble {
    /// A bubble showing `text` literally.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: BubbleContent::Text(text.into()),
        }
    }

    /// A bot bubble carrying rendered markup.
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: BubbleContent::Html(html.into()),
        }
    }

    /// Class attribute of the wrapper element, e.g. `ai-chat-message ai-chat-bot`.
    pub fn wrapper_class(&self) -> String {
        format!("{MESSAGE_CLASS} ai-chat-{}", self.role)
    }
}
