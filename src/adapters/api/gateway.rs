//! API gateway trait
//!
//! Thin typed seam between orchestration code and HTTP. Implementations
//! resolve every path through a [`UrlResolver`], perform exactly one request,
//! and fail with [`HttpError`](crate::domain::HttpError) on any non-2xx status.
//! No call is retried.

use super::urls::UrlResolver;
use crate::domain::{DocumentUpload, GodwitError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parsed body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// No body (typically `204 No Content`)
    Empty { status: u16 },
    /// JSON document
    Json(Value),
    /// Non-JSON text
    Text(String),
}

impl JsonBody {
    /// Builds a body from raw response text
    ///
    /// Empty text is [`JsonBody::Empty`]. Text that parses as JSON is
    /// [`JsonBody::Json`] regardless of content type; otherwise it is kept as
    /// text, unless the server declared JSON, which makes it an error.
    pub fn from_text(status: u16, content_type: Option<&str>, text: String) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(JsonBody::Empty { status });
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(JsonBody::Json(value)),
            Err(e) if content_type.map(is_json_content_type).unwrap_or(false) => {
                Err(GodwitError::InvalidResponse(format!(
                    "Malformed JSON body (HTTP {status}): {e}"
                )))
            }
            Err(_) => Ok(JsonBody::Text(text)),
        }
    }

    /// True for an empty body or a JSON `null`
    pub fn is_empty(&self) -> bool {
        matches!(self, JsonBody::Empty { .. } | JsonBody::Json(Value::Null))
    }

    /// Decodes into `T`; an empty body is `None`
    ///
    /// # Errors
    ///
    /// Returns an error when the body is text or does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self {
            JsonBody::Empty { .. } | JsonBody::Json(Value::Null) => Ok(None),
            JsonBody::Json(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| GodwitError::InvalidResponse(format!("Unexpected JSON shape: {e}"))),
            JsonBody::Text(text) => Err(GodwitError::InvalidResponse(format!(
                "Expected JSON, got text: {}",
                text.chars().take(80).collect::<String>()
            ))),
        }
    }

    /// Decodes into `T`, treating an empty body as an error
    ///
    /// # Errors
    ///
    /// Returns an error when the body is empty, text, or does not match `T`.
    pub fn decode_required<T: DeserializeOwned>(self) -> Result<T> {
        self.decode()?.ok_or_else(|| {
            GodwitError::InvalidResponse("Expected a JSON body, got an empty response".to_string())
        })
    }
}

/// Raw successful response, used where the body may be binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RawResponse {
    /// True when the server declared a PDF body
    pub fn is_pdf(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("application/pdf"))
            .unwrap_or(false)
    }

    /// True when the server declared a JSON body
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(is_json_content_type)
            .unwrap_or(false)
    }

    /// Interprets the body as text and parses it like [`JsonBody::from_text`]
    ///
    /// # Errors
    ///
    /// Returns an error when the server declared JSON but sent something else.
    pub fn into_json_body(self) -> Result<JsonBody> {
        let text = String::from_utf8_lossy(&self.bytes).into_owned();
        JsonBody::from_text(self.status, self.content_type.as_deref(), text)
    }
}

pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("application/json") || lower.contains("+json")
}

/// Typed HTTP access to the backend
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Resolver used for every path this gateway touches
    fn urls(&self) -> &UrlResolver;

    /// `GET` a JSON resource
    ///
    /// # Errors
    ///
    /// [`GodwitError::Http`] on non-2xx, [`GodwitError::Connection`] when the
    /// server cannot be reached.
    async fn get_json(&self, path: &str) -> Result<JsonBody>;

    /// `POST` a JSON body, expecting JSON (or nothing) back
    ///
    /// # Errors
    ///
    /// Same as [`ApiGateway::get_json`].
    async fn post_json(&self, path: &str, body: &Value) -> Result<JsonBody>;

    /// `POST` a multipart form carrying one file under the field name `file`
    ///
    /// # Errors
    ///
    /// Same as [`ApiGateway::get_json`].
    async fn post_form(&self, path: &str, upload: &DocumentUpload) -> Result<JsonBody>;

    /// `POST` form-encoded fields
    ///
    /// # Errors
    ///
    /// Same as [`ApiGateway::get_json`].
    async fn post_urlencoded(&self, path: &str, fields: &[(&str, &str)]) -> Result<JsonBody>;

    /// `POST` a JSON body and return the raw response (may be binary)
    ///
    /// # Errors
    ///
    /// Same as [`ApiGateway::get_json`].
    async fn post_json_raw(&self, path: &str, body: &Value) -> Result<RawResponse>;

    /// `GET` a resource as raw bytes; `url` may be a path or an absolute URL
    ///
    /// # Errors
    ///
    /// Same as [`ApiGateway::get_json`].
    async fn get_binary(&self, url: &str) -> Result<RawResponse>;
}
