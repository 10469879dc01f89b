//! Widget configuration.
//!
//! Values are layered with the `config` crate: built-in defaults first, then
//! an optional JSON document (in the browser, the `data-ai-chat-config`
//! attribute of the form). Texts default to the preset of the selected
//! [`Locale`], so a page only has to override what it wants to change.

use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;

use crate::error::Result;
use crate::markdown::MarkdownOptions;

/// Language of the built-in texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// Indonesian.
    Id,
}

impl Locale {
    /// Built-in texts for this locale.
    pub fn texts(self) -> WidgetTexts {
        match self {
            Self::En => WidgetTexts {
                empty_message: "Message must not be empty.".into(),
                message_too_long: "Message is too long.".into(),
                sending: "Contacting assistant...".into(),
                no_answer: "Sorry, no answer is available.".into(),
                request_failed: "The request could not be processed.".into(),
                connection_error: "Connection error. Please try again later.".into(),
                clear_confirm: "Delete the entire chat history? This cannot be undone.".into(),
                clearing: "Deleting...".into(),
                clear_success: "Chat history deleted.".into(),
                clear_failed: "Failed to delete chat history. Please try again.".into(),
                clear_error: "Something went wrong. Please try again.".into(),
            },
            Self::Id => WidgetTexts {
                empty_message: "Pesan tidak boleh kosong.".into(),
                message_too_long: "Pesan terlalu panjang.".into(),
                sending: "Menghubungi asisten...".into(),
                no_answer: "Maaf, tidak ada jawaban yang tersedia.".into(),
                request_failed: "Permintaan gagal diproses.".into(),
                connection_error: "Terjadi kesalahan koneksi. Coba lagi nanti.".into(),
                clear_confirm: "Yakin ingin menghapus semua riwayat chat? Tindakan ini tidak dapat dibatalkan.".into(),
                clearing: "Menghapus...".into(),
                clear_success: "Riwayat chat berhasil dihapus!".into(),
                clear_failed: "Gagal menghapus riwayat chat. Coba lagi.".into(),
                clear_error: "Terjadi kesalahan. Coba lagi.".into(),
            },
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
        }
    }
}

/// Complete widget configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WidgetConfig {
    pub locale: Locale,
    pub endpoints: EndpointConfig,
    pub elements: ElementConfig,
    pub markdown: MarkdownOptions,
    #[serde(default)]
    pub limits: LimitConfig,
    pub texts: WidgetTexts,
}

/// Backend endpoints, relative to the page origin.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// `POST` target for chat messages.
    pub chat: String,
    /// `DELETE` target for clearing the history.
    pub clear: String,
}

/// Identifiers of the page elements the widget binds to.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ElementConfig {
    pub form: String,
    pub input: String,
    pub log: String,
    pub status: String,
    pub clear_button: String,
    /// Class carried by every suggestion control.
    pub suggestion_class: String,
    /// Attribute holding a suggestion's canned question.
    pub suggestion_attribute: String,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct LimitConfig {
    /// Longest message accepted for sending, in characters. Unlimited when unset.
    #[serde(default)]
    pub max_message_chars: Option<usize>,
}

/// Every user-visible string the widget produces.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WidgetTexts {
    pub empty_message: String,
    pub message_too_long: String,
    pub sending: String,
    pub no_answer: String,
    pub request_failed: String,
    pub connection_error: String,
    pub clear_confirm: String,
    pub clearing: String,
    pub clear_success: String,
    pub clear_failed: String,
    pub clear_error: String,
}

#[derive(Debug, Deserialize)]
struct LocaleSelection {
    #[serde(default)]
    locale: Locale,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            endpoints: EndpointConfig {
                chat: "/api/ai-chat".into(),
                clear: "/api/ai-chat/clear".into(),
            },
            elements: ElementConfig {
                form: "ai-chat-form".into(),
                input: "ai-chat-input".into(),
                log: "ai-chat-log".into(),
                status: "ai-chat-status".into(),
                clear_button: "clear-chat-btn".into(),
                suggestion_class: "suggestion-btn".into(),
                suggestion_attribute: "data-question".into(),
            },
            markdown: MarkdownOptions::default(),
            limits: LimitConfig::default(),
            texts: Locale::En.texts(),
        }
    }
}

impl WidgetConfig {
    /// Build the configuration from defaults and an optional JSON override
    /// document.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ai_chat_widget::config::{Locale, WidgetConfig};
    ///
    /// let config = WidgetConfig::load(Some(r#"{"locale": "id"}"#)).unwrap();
    /// assert_eq!(config.locale, Locale::Id);
    /// assert_eq!(config.texts.empty_message, "Pesan tidak boleh kosong.");
    /// ```
    pub fn load(overrides: Option<&str>) -> Result<Self> {
        // The locale decides the text defaults, so it is resolved first.
        let locale = match overrides {
            Some(json) => Config::builder()
                .add_source(File::from_str(json, FileFormat::Json))
                .build()?
                .try_deserialize::<LocaleSelection>()?
                .locale,
            None => Locale::default(),
        };

        let mut builder = defaults(locale)?;
        if let Some(json) = overrides {
            builder = builder.add_source(File::from_str(json, FileFormat::Json));
        }

        let config = builder.build()?.try_deserialize::<Self>()?;
        tracing::debug!(locale = config.locale.as_str(), "Widget configuration loaded");
        Ok(config)
    }
}

fn defaults(locale: Locale) -> Result<ConfigBuilder<DefaultState>> {
    let base = WidgetConfig::default();
    let texts = locale.texts();

    let builder = Config::builder()
        .set_default("locale", locale.as_str())?
        .set_default("endpoints.chat", base.endpoints.chat)?
        .set_default("endpoints.clear", base.endpoints.clear)?
        .set_default("elements.form", base.elements.form)?
        .set_default("elements.input", base.elements.input)?
        .set_default("elements.log", base.elements.log)?
        .set_default("elements.status", base.elements.status)?
        .set_default("elements.clear_button", base.elements.clear_button)?
        .set_default("elements.suggestion_class", base.elements.suggestion_class)?
        .set_default("elements.suggestion_attribute", base.elements.suggestion_attribute)?
        .set_default("markdown.enabled", base.markdown.enabled)?
        .set_default("markdown.breaks", base.markdown.breaks)?
        .set_default("markdown.gfm", base.markdown.gfm)?
        .set_default("markdown.header_ids", base.markdown.header_ids)?
        .set_default("markdown.mangle", base.markdown.mangle)?
        .set_default("texts.empty_message", texts.empty_message)?
        .set_default("texts.message_too_long", texts.message_too_long)?
        .set_default("texts.sending", texts.sending)?
        .set_default("texts.no_answer", texts.no_answer)?
        .set_default("texts.request_failed", texts.request_failed)?
        .set_default("texts.connection_error", texts.connection_error)?
        .set_default("texts.clear_confirm", texts.clear_confirm)?
        .set_default("texts.clearing", texts.clearing)?
        .set_default("texts.clear_success", texts.clear_success)?
        .set_default("texts.clear_failed", texts.clear_failed)?
        .set_default("texts.clear_error", texts.clear_error)?;

    Ok(builder)
}
