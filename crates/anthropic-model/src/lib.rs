//! A model provider for the Anthropic Messages API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use palaver_model::{
    ErrorKind, Message, ModelProvider, ModelProviderError, ModelRequest,
};
use reqwest::{Client, StatusCode, header};

pub use config::{
    AnthropicConfig, AnthropicConfigBuilder, DEFAULT_API_VERSION,
    DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use proto::{ErrorResponse, MessagesResponse};

/// Longest part of a non-JSON error body kept in an error message, in
/// characters.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Error type for [`AnthropicProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        let kind = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ErrorKind::Authentication
            }
            StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimitExceeded,
            // Includes the vendor-specific 529 "overloaded".
            s if s.is_server_error() => ErrorKind::Overloaded,
            s if s.is_client_error() => ErrorKind::InvalidRequest,
            _ => ErrorKind::Other,
        };
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(resp) => format!(
                "{status}: {}: {}",
                resp.error.kind, resp.error.message
            ),
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => format!("{status}: {}", truncate(body.trim())),
        };
        Self::new(message, kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_owned(),
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Anthropic Messages API model provider.
#[derive(Clone, Debug)]
pub struct AnthropicProvider {
    client: Client,
    config: Arc<AnthropicConfig>,
}

impl AnthropicProvider {
    /// Creates a new `AnthropicProvider` with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, Error> {
        let client = Client::builder().build().map_err(|err| {
            Error::new(
                format!("failed to build HTTP client: {err}"),
                ErrorKind::Other,
            )
        })?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Returns the configuration this provider was created with.
    #[inline]
    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }
}

impl ModelProvider for AnthropicProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>>
    + Send
    + 'static
    + use<> {
        // Nothing to send; don't bother the server.
        let resp_fut = if req.messages.is_empty() {
            None
        } else {
            let body = proto::create_request(req, &self.config);
            trace!(
                "sending {} messages to {}",
                req.messages.len(),
                self.config.model
            );
            Some(
                self.client
                    .post(format!("{}{}", self.config.base_url, "/messages"))
                    .header("x-api-key", &self.config.api_key)
                    .header("anthropic-version", &self.config.api_version)
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::ACCEPT, "application/json")
                    .json(&body)
                    .send(),
            )
        };

        async move {
            let Some(resp_fut) = resp_fut else {
                return Err(Error::new(
                    "request contains no messages",
                    ErrorKind::InvalidRequest,
                ));
            };

            let resp = match resp_fut.await {
                Ok(resp) => resp,
                Err(err) => {
                    error!("request failed: {err}");
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };

            let status = resp.status();
            if !status.is_success() {
                let body = match resp.text().await {
                    Ok(body) => body,
                    Err(err) => {
                        warn!("failed to read error response: {err}");
                        String::new()
                    }
                };
                let err = Error::from_status(status, &body);
                error!("server rejected the request: {err}");
                return Err(err);
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            let is_json = content_type
                .as_deref()
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| {
                    m.essence_str() == mime::APPLICATION_JSON.essence_str()
                })
                .unwrap_or(false);
            if !is_json {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::MalformedResponse,
                ));
            }

            let body = match resp.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    return Err(Error::new(
                        format!("failed to read response: {err}"),
                        ErrorKind::Transport,
                    ));
                }
            };
            let parsed: MessagesResponse = match serde_json::from_slice(&body)
            {
                Ok(parsed) => parsed,
                Err(err) => {
                    return Err(Error::new(
                        format!("failed to decode response: {err}"),
                        ErrorKind::MalformedResponse,
                    ));
                }
            };

            if let Some(usage) = &parsed.usage {
                debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "got a response"
                );
            }
            if parsed.stop_reason.as_deref() == Some("max_tokens") {
                warn!("response was truncated by the output token bound");
            }

            match proto::first_text(parsed) {
                Some(text) => Ok(Message::assistant(text)),
                None => Err(Error::new(
                    "response contains no text content",
                    ErrorKind::MalformedResponse,
                )),
            }
        }
    }
}
