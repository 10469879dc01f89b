//! AI chat widget
//!
//! A browser chat widget compiled to WebAssembly. It binds to an existing
//! form, input, log and status element, posts messages to the chat endpoint,
//! renders replies as Markdown, and offers a clear-history control and
//! suggestion buttons.
//!
//! # Architecture
//!
//! - **Controller**: one [`ChatController`] per page, owning its collaborators
//! - **Backend**: [`ChatBackend`] trait with a `reqwest` implementation (fetch in the browser)
//! - **View**: [`ChatView`] trait over the DOM, with an in-memory [`HeadlessView`]
//! - **Renderer**: optional [`MarkdownRenderer`] injected at construction
//!
//! # Modules
//!
//! - [`backend`]: HTTP client for the chat endpoints
//! - [`config`]: Layered widget configuration
//! - [`controller`]: Submit, render, clear and suggestion handling
//! - [`markdown`]: Markdown to HTML for bot replies
//! - [`message`]: Roles, messages and bubbles
//! - [`view`]: Page surface abstraction
//! - `dom` (wasm32 only): `web-sys` view and the module entry point

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod markdown;
pub mod message;
pub mod telemetry;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use backend::{ChatBackend, HttpChatBackend};
pub use config::WidgetConfig;
pub use controller::{ChatController, ClearOutcome, SubmitOutcome};
pub use error::{Result, WidgetError};
pub use markdown::{CommonMarkRenderer, MarkdownRenderer};
pub use message::{Bubble, BubbleContent, Message, Role};
pub use view::{ChatView, HeadlessView};
