//! Chat backend client.
//!
//! [`ChatBackend`] is the seam between the controller and the network. The
//! browser build and the integration tests both use [`HttpChatBackend`];
//! unit tests script their own implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::EndpointConfig;
use crate::error::{Result, WidgetError};

/// Body of a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The user's message, already trimmed.
    pub message: String,
}

/// Body of a successful chat response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant answer. Missing or empty means "no answer".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl ChatReply {
    /// The answer, if it carries any text.
    pub fn text(&self) -> Option<&str> {
        self.reply.as_deref().filter(|s| !s.is_empty())
    }
}

/// Body of a failed chat response.
///
/// `error` is kept loosely typed: backends also send numeric codes there.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ErrorBody {
    /// Text to show for `error`: non-empty strings, non-zero numbers and
    /// `true`. Anything else counts as missing.
    pub fn message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64().is_some_and(|v| v.abs() > 0.0) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}

/// Requests the widget issues.
///
/// A non-2xx status must surface as [`WidgetError::Api`]; every other error is
/// treated as a transport failure.
#[async_trait(?Send)]
pub trait ChatBackend {
    /// Send one chat message.
    async fn send(&self, message: &str) -> Result<ChatReply>;

    /// Delete the stored chat history.
    async fn clear(&self) -> Result<()>;
}

/// HTTP implementation of [`ChatBackend`].
///
/// # Example
///
/// ```rust,no_run
/// use ai_chat_widget::backend::{ChatBackend, HttpChatBackend};
/// use ai_chat_widget::config::WidgetConfig;
///
/// # async fn example() -> ai_chat_widget::error::Result<()> {
/// let config = WidgetConfig::default();
/// let backend = HttpChatBackend::new("http://localhost:5000", &config.endpoints)?;
/// let reply = backend.send("What is a closure?").await?;
/// println!("{:?}", reply.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    chat_url: Url,
    clear_url: Url,
    http: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend resolving the endpoint paths against `base_url`.
    pub fn new(base_url: impl AsRef<str>, endpoints: &EndpointConfig) -> Result<Self> {
        Self::with_client(base_url, endpoints, reqwest::Client::new())
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        endpoints: &EndpointConfig,
        http: reqwest::Client,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            chat_url: base_url.join(&endpoints.chat)?,
            clear_url: base_url.join(&endpoints.clear)?,
            http,
        })
    }

    /// URL chat messages are posted to.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// URL the clear request is sent to.
    pub fn clear_url(&self) -> &Url {
        &self.clear_url
    }

    async fn api_error(response: reqwest::Response) -> WidgetError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message());
        WidgetError::Api { status, message }
    }
}

#[async_trait(?Send)]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, message: &str) -> Result<ChatReply> {
        tracing::debug!(url = %self.chat_url, len = message.len(), "Sending chat message");

        let req = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .http
            .post(self.chat_url.clone())
            .json(&req)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn clear(&self) -> Result<()> {
        tracing::debug!(url = %self.clear_url, "Clearing chat history");

        let response = self.http.delete(self.clear_url.clone()).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(WidgetError::Api {
                status: status.as_u16(),
                message: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;

    #[test]
    fn test_endpoints_resolve_against_origin() {
        let config = WidgetConfig::default();
        let backend = HttpChatBackend::new("https://lms.example.com/courses/7", &config.endpoints)
            .unwrap();
        assert_eq!(
            backend.chat_url().as_str(),
            "https://lms.example.com/api/ai-chat"
        );
        assert_eq!(
            backend.clear_url().as_str(),
            "https://lms.example.com/api/ai-chat/clear"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = WidgetConfig::default();
        let err = HttpChatBackend::new("not a url", &config.endpoints).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidUrl(_)));
    }

    #[test]
    fn test_reply_text_treats_empty_as_missing() {
        let empty: ChatReply = serde_json::from_str(r#"{"reply": ""}"#).unwrap();
        assert_eq!(empty.text(), None);

        let missing: ChatReply = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.text(), None);

        let some: ChatReply = serde_json::from_str(r#"{"reply": "hi"}"#).unwrap();
        assert_eq!(some.text(), Some("hi"));
    }

    #[test]
    fn test_error_body_message() {
        let message = |json: &str| serde_json::from_str::<ErrorBody>(json).unwrap().message();

        assert_eq!(message(r#"{"error": "bad"}"#).as_deref(), Some("bad"));
        assert_eq!(message(r#"{"error": 429}"#).as_deref(), Some("429"));
        assert_eq!(message(r#"{"error": 1.5}"#).as_deref(), Some("1.5"));
        assert_eq!(message(r#"{"error": true}"#).as_deref(), Some("true"));
        assert_eq!(message(r#"{"error": ""}"#), None);
        assert_eq!(message(r#"{"error": 0}"#), None);
        assert_eq!(message(r#"{"error": null}"#), None);
        assert_eq!(message(r#"{"error": {"code": 1}}"#), None);
        assert_eq!(message("{}"), None);
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest {
            message: "hello".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hello" }));
    }
}
