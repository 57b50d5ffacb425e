//! Artifact responses and resolved artifact URLs
//!
//! PDF-producing endpoints answer in one of three shapes: the PDF itself, a
//! JSON body carrying a `pdfUrl`, or a JSON body carrying only an `id` that
//! needs a follow-up fetch. [`ArtifactPayload`] classifies a response once at
//! the API boundary; [`ArtifactUrl`] is what the rest of the crate consumes.

use crate::adapters::api::RawResponse;
use crate::adapters::storage::BlobUrl;
use crate::domain::Result;
use serde_json::Value;
use std::fmt;

/// Classified artifact response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPayload {
    /// The artifact bytes
    Binary { content_type: String, bytes: Vec<u8> },
    /// Location of the artifact, possibly server-relative
    Url(String),
    /// Identifier of a created entity whose artifact must be fetched
    Id(u64),
}

impl ArtifactPayload {
    /// Classifies a raw response
    ///
    /// Returns `Ok(None)` when the body is JSON (or empty) but carries neither
    /// a `pdfUrl` nor an `id`. A `pdfUrl` wins over an `id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the server declared JSON but sent a malformed body.
    pub fn from_response(raw: RawResponse) -> Result<Option<Self>> {
        if raw.is_pdf() || (!raw.is_json() && raw.bytes.starts_with(b"%PDF")) {
            let content_type = raw
                .content_type
                .clone()
                .unwrap_or_else(|| "application/pdf".to_string());
            return Ok(Some(ArtifactPayload::Binary {
                content_type,
                bytes: raw.bytes,
            }));
        }

        let value = match raw.into_json_body()? {
            crate::adapters::api::JsonBody::Json(value) => value,
            _ => return Ok(None),
        };
        Ok(Self::from_json(&value))
    }

    /// Classifies JSON metadata
    pub fn from_json(value: &Value) -> Option<Self> {
        if let Some(url) = value
            .get("pdfUrl")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|u| !u.is_empty())
        {
            return Some(ArtifactPayload::Url(url.to_string()));
        }

        let id = match value.get("id")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        id.filter(|id| *id > 0).map(ArtifactPayload::Id)
    }
}

/// Displayable reference to an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactUrl {
    /// Normalized absolute backend URL
    Remote(String),
    /// Local blob that must be released by its owner
    Blob(BlobUrl),
}

impl ArtifactUrl {
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactUrl::Remote(url) => url,
            ArtifactUrl::Blob(blob) => blob.as_str(),
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, ArtifactUrl::Blob(_))
    }
}

impl fmt::Display for ArtifactUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(content_type: &str, body: &[u8]) -> RawResponse {
        RawResponse {
            status: 200,
            content_type: Some(content_type.to_string()),
            bytes: body.to_vec(),
        }
    }

    #[test]
    fn test_binary_pdf() {
        let payload = ArtifactPayload::from_response(raw("application/pdf", b"%PDF-1.7"))
            .unwrap()
            .unwrap();
        assert!(matches!(payload, ArtifactPayload::Binary { .. }));
    }

    #[test]
    fn test_pdf_sniffed_without_content_type() {
        let response = RawResponse {
            status: 200,
            content_type: None,
            bytes: b"%PDF-1.4 ...".to_vec(),
        };
        assert!(matches!(
            ArtifactPayload::from_response(response).unwrap(),
            Some(ArtifactPayload::Binary { .. })
        ));
    }

    #[test]
    fn test_url_wins_over_id() {
        let payload = ArtifactPayload::from_response(raw(
            "application/json",
            br#"{"id":5,"pdfUrl":"/api/doctor/referrals/5/pdf"}"#,
        ))
        .unwrap();
        assert_eq!(
            payload,
            Some(ArtifactPayload::Url("/api/doctor/referrals/5/pdf".into()))
        );
    }

    #[test]
    fn test_url_only() {
        assert_eq!(
            ArtifactPayload::from_json(&json!({"pdfUrl": "/api/referrals/3/pdf"})),
            Some(ArtifactPayload::Url("/api/referrals/3/pdf".into()))
        );
    }

    #[test]
    fn test_id_only() {
        assert_eq!(
            ArtifactPayload::from_json(&json!({"id": 9})),
            Some(ArtifactPayload::Id(9))
        );
        assert_eq!(
            ArtifactPayload::from_json(&json!({"id": "12", "pdfUrl": "  "})),
            Some(ArtifactPayload::Id(12))
        );
    }

    #[test]
    fn test_neither_url_nor_id() {
        assert_eq!(ArtifactPayload::from_json(&json!({"status": "ok"})), None);
        assert_eq!(ArtifactPayload::from_json(&json!({"id": 0})), None);
        assert_eq!(
            ArtifactPayload::from_response(raw("application/json", b"")).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(ArtifactPayload::from_response(raw("application/json", b"{oops")).is_err());
    }
}
