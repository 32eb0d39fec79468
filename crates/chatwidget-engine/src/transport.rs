//! Chat endpoint client.
//!
//! The endpoint takes one form field, `mensaje`, and answers with a JSON
//! object carrying an optional `respuesta` string. Status codes are not
//! treated as failures on their own; only a failed request or an unreadable
//! body is.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;

/// Name of the form field carrying the user's message.
pub const MESSAGE_FIELD: &str = "mensaje";

/// Body of a successful endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated reply, absent when the backend had nothing to say.
    #[serde(default, deserialize_with = "reply_text")]
    pub respuesta: Option<String>,
}

/// Accept any JSON value for `respuesta`.
///
/// Falsy values (`null`, `false`, `0`) count as absent. Other non-string
/// values are shown as their JSON text.
#[allow(clippy::float_cmp)]
fn reply_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null | Value::Bool(false)) => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

impl ChatReply {
    /// Reply with the given text.
    pub fn text(respuesta: impl Into<String>) -> Self {
        Self {
            respuesta: Some(respuesta.into()),
        }
    }

    /// The reply text, treating an empty string like a missing field.
    pub fn into_text(self) -> Option<String> {
        self.respuesta.filter(|r| !r.is_empty())
    }
}

/// Something that can deliver a message to the chat endpoint.
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Send one message and wait for the endpoint's answer.
    async fn send(&self, message: &str) -> Result<ChatReply, TransportError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send(&self, message: &str) -> Result<ChatReply, TransportError> {
        (**self).send(message).await
    }
}

/// Encode the form body for a message (`mensaje=<percent-encoded>`).
pub fn encode_form(message: &str) -> String {
    format!("{MESSAGE_FIELD}={}", urlencoding::encode(message))
}

/// HTTP transport posting URL-encoded forms.
///
/// No timeout is configured: a request that never settles leaves its
/// pending turn in place.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    cookie: Option<String>,
}

impl HttpTransport {
    /// Create a transport posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            cookie: None,
        }
    }

    /// Create a transport from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut transport = Self::new(config.chat_url());
        transport.cookie.clone_from(&config.session_cookie);
        transport
    }

    /// Send a `Cookie` header with every request.
    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<ChatReply, TransportError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_form(message));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        debug!(url = %self.url, "posting chat message");
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, url = %self.url, "chat endpoint returned non-success status");
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(TransportError::Parse)
    }
}

/// Errors that can occur while talking to the chat endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ChatController;
    use crate::turn::{LogEntry, Turn, QUICK_ACTIONS};
    use crate::view::MemoryView;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Seen(Arc<Mutex<Vec<(String, String)>>>);

    async fn record(
        State(seen): State<Seen>,
        headers: HeaderMap,
        body: String,
    ) -> Json<serde_json::Value> {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.0.lock().unwrap().push((content_type, body));
        Json(serde_json::json!({ "respuesta": "Hay 3 riesgos\naltos" }))
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_encode_form_uses_percent_twenty() {
        assert_eq!(
            encode_form("Resumen de riesgos"),
            "mensaje=Resumen%20de%20riesgos"
        );
        assert_eq!(encode_form("a&b=c"), "mensaje=a%26b%3Dc");
    }

    #[test]
    fn test_reply_deserialization() {
        let reply: ChatReply = serde_json::from_str(r#"{"respuesta":"hola"}"#).unwrap();
        assert_eq!(reply.into_text(), Some("hola".into()));

        let missing: ChatReply = serde_json::from_str(r#"{"otro":1}"#).unwrap();
        assert_eq!(missing.into_text(), None);

        let empty: ChatReply = serde_json::from_str(r#"{"respuesta":""}"#).unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn test_reply_accepts_non_string_values() {
        let parse = |body: &str| serde_json::from_str::<ChatReply>(body).unwrap().into_text();

        assert_eq!(parse(r#"{"respuesta":42}"#), Some("42".into()));
        assert_eq!(parse(r#"{"respuesta":true}"#), Some("true".into()));
        assert_eq!(parse(r#"{"respuesta":[1,2]}"#), Some("[1,2]".into()));
        assert_eq!(parse(r#"{"respuesta":null}"#), None);
        assert_eq!(parse(r#"{"respuesta":false}"#), None);
        assert_eq!(parse(r#"{"respuesta":0}"#), None);
    }

    #[tokio::test]
    async fn test_http_transport_posts_form() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/chat-ia", post(record))
            .with_state(seen.clone());
        let base = spawn_server(router).await;

        let transport = HttpTransport::new(format!("{base}/chat-ia"));
        let reply = transport.send("Resumen de riesgos").await.unwrap();
        assert_eq!(reply.into_text(), Some("Hay 3 riesgos\naltos".into()));

        let seen = seen.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "application/x-www-form-urlencoded");
        assert_eq!(seen[0].1, "mensaje=Resumen%20de%20riesgos");
    }

    #[tokio::test]
    async fn test_quick_send_posts_preset_prompt() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/chat-ia", post(record))
            .with_state(seen.clone());
        let config = Config {
            base_url: spawn_server(router).await,
            ..Config::default()
        };
        let (mut controller, mut events) = ChatController::new(
            MemoryView::new(),
            HttpTransport::from_config(&config),
            &config,
        );

        controller.quick_send(QUICK_ACTIONS[0].prompt).unwrap();
        let event = events.recv().await.unwrap();
        controller.handle_event(event);

        assert_eq!(seen.0.lock().unwrap()[0].1, "mensaje=Resumen%20de%20riesgos");
        assert_eq!(
            controller.view().entries.last(),
            Some(&LogEntry::from(Turn::Bot("Hay 3 riesgos\naltos".into())))
        );
    }

    #[tokio::test]
    async fn test_http_transport_missing_field_is_not_an_error() {
        let router = Router::new().route(
            "/chat-ia",
            post(|| async { Json(serde_json::json!({ "error": "sin datos" })) }),
        );
        let base = spawn_server(router).await;

        let reply = HttpTransport::new(format!("{base}/chat-ia"))
            .send("hola")
            .await
            .unwrap();
        assert_eq!(reply.into_text(), None);
    }

    #[tokio::test]
    async fn test_http_transport_non_json_body_is_parse_error() {
        let router = Router::new().route("/chat-ia", post(|| async { "<html>login</html>" }));
        let base = spawn_server(router).await;

        let err = HttpTransport::new(format!("{base}/chat-ia"))
            .send("hola")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[tokio::test]
    async fn test_http_transport_refused_connection_is_request_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpTransport::new(format!("http://{addr}/chat-ia"))
            .send("hola")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }

    #[tokio::test]
    async fn test_http_transport_sends_cookie() {
        let router = Router::new().route(
            "/chat-ia",
            post(|headers: HeaderMap| async move {
                let cookie = headers
                    .get("cookie")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({ "respuesta": cookie }))
            }),
        );
        let base = spawn_server(router).await;

        let reply = HttpTransport::new(format!("{base}/chat-ia"))
            .with_cookie("session=abc")
            .send("hola")
            .await
            .unwrap();
        assert_eq!(reply.into_text(), Some("session=abc".into()));
    }
}
