//! reqwest-backed API gateway
//!
//! Keeps a cookie jar per instance so that a login establishes the session
//! for every later call made through the same gateway.

use super::gateway::{ApiGateway, JsonBody, RawResponse};
use super::urls::UrlResolver;
use crate::config::ApiConfig;
use crate::domain::{DocumentUpload, GodwitError, HttpError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// HTTP gateway to the telemedicine backend
///
/// # Example
///
/// ```no_run
/// use godwit::adapters::api::{ApiGateway, HttpGateway};
/// use godwit::config::ApiConfig;
///
/// # async fn example() -> godwit::domain::Result<()> {
/// let gateway = HttpGateway::new(&ApiConfig::default())?;
/// let body = gateway.get_json("/auth/me").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    urls: UrlResolver,
}

impl HttpGateway {
    /// Create a new gateway from configuration
    ///
    /// No client-side timeout is applied unless `timeout_seconds` is set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let urls = UrlResolver::new(&config.base_url, &config.origin)?;

        let mut builder = ClientBuilder::new()
            .cookie_store(true)
            .user_agent(concat!("godwit/", env!("CARGO_PKG_VERSION")));

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            GodwitError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        tracing::debug!(base_url = urls.base(), "Created API gateway");

        Ok(Self { client, urls })
    }

    async fn send(&self, method: &'static str, url: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(method = method, url = url, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = method, url = url, error = %e, "Request failed to complete");
            GodwitError::Connection(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(method = method, url = url, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let raw_body = response.text().await.unwrap_or_default();
        tracing::warn!(
            method = method,
            url = url,
            status = status.as_u16(),
            "Request rejected by server"
        );
        Err(HttpError::new(status.as_u16(), raw_body).into())
    }

    async fn read_json(response: Response) -> Result<JsonBody> {
        let status = response.status().as_u16();
        let content_type = content_type(&response);
        let text = response
            .text()
            .await
            .map_err(|e| GodwitError::Connection(format!("Failed to read response body: {e}")))?;
        JsonBody::from_text(status, content_type.as_deref(), text)
    }

    async fn read_raw(response: Response) -> Result<RawResponse> {
        let status = response.status().as_u16();
        let content_type = content_type(&response);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GodwitError::Connection(format!("Failed to read response body: {e}")))?;
        Ok(RawResponse {
            status,
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl ApiGateway for HttpGateway {
    fn urls(&self) -> &UrlResolver {
        &self.urls
    }

    async fn get_json(&self, path: &str) -> Result<JsonBody> {
        let url = self.urls.normalize(path);
        let request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        let response = self.send("GET", &url, request).await?;
        Self::read_json(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<JsonBody> {
        let url = self.urls.normalize(path);
        let request = self.client.post(&url).json(body);
        let response = self.send("POST", &url, request).await?;
        Self::read_json(response).await
    }

    async fn post_form(&self, path: &str, upload: &DocumentUpload) -> Result<JsonBody> {
        let url = self.urls.normalize(path);
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| {
                GodwitError::Other(format!(
                    "Invalid content type '{}': {e}",
                    upload.content_type
                ))
            })?;
        let form = Form::new().part("file", part);

        tracing::info!(
            url = %url,
            file_name = %upload.file_name,
            size = upload.bytes.len(),
            "Uploading document"
        );
        let request = self.client.post(&url).multipart(form);
        let response = self.send("POST", &url, request).await?;
        Self::read_json(response).await
    }

    async fn post_urlencoded(&self, path: &str, fields: &[(&str, &str)]) -> Result<JsonBody> {
        let url = self.urls.normalize(path);
        let request = self.client.post(&url).form(fields);
        let response = self.send("POST", &url, request).await?;
        Self::read_json(response).await
    }

    async fn post_json_raw(&self, path: &str, body: &Value) -> Result<RawResponse> {
        let url = self.urls.normalize(path);
        let request = self.client.post(&url).json(body);
        let response = self.send("POST", &url, request).await?;
        Self::read_raw(response).await
    }

    async fn get_binary(&self, url: &str) -> Result<RawResponse> {
        let url = self.urls.normalize(url);
        let request = self.client.get(&url);
        let response = self.send("GET", &url, request).await?;
        Self::read_raw(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway_for(server: &mockito::ServerGuard) -> HttpGateway {
        let config = ApiConfig {
            base_url: format!("{}/api", server.url()),
            ..Default::default()
        };
        HttpGateway::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_parses_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/me")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email":"a@b.c"}"#)
            .create_async()
            .await;

        let body = gateway_for(&server).get_json("/auth/me").await.unwrap();
        assert_eq!(body, JsonBody::Json(serde_json::json!({"email": "a@b.c"})));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_content_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/prescriptions/latest")
            .with_status(204)
            .create_async()
            .await;

        let body = gateway_for(&server)
            .get_json("/prescriptions/latest")
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_non_2xx_is_http_error_with_raw_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/registrations")
            .with_status(422)
            .with_body("Email is invalid")
            .create_async()
            .await;

        let err = gateway_for(&server)
            .post_json("/registrations", &serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            GodwitError::Http(http) => {
                assert_eq!(http.status, 422);
                assert_eq!(http.raw_body, "Email is invalid");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prefixed_path_is_not_doubled() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/doctor/prescriptions/9/pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4")
            .create_async()
            .await;

        let raw = gateway_for(&server)
            .get_binary("/api/doctor/prescriptions/9/pdf")
            .await
            .unwrap();
        assert!(raw.is_pdf());
        assert_eq!(raw.bytes, b"%PDF-1.4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_urlencoded_sends_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("email".into(), "a@b.c".into()),
                Matcher::UrlEncoded("password".into(), "pw".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;

        gateway_for(&server)
            .post_urlencoded("/auth/login", &[("email", "a@b.c"), ("password", "pw")])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_form_sends_file_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/registrations/7/document")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".into()),
            )
            .match_body(Matcher::Regex(
                r#"name="file"; filename="ticket.pdf""#.into(),
            ))
            .with_status(200)
            .with_body(r#"{"id":3,"fileName":"ticket.pdf","sizeBytes":4}"#)
            .create_async()
            .await;

        let upload = DocumentUpload::new("ticket.pdf", b"%PDF".to_vec());
        let body = gateway_for(&server)
            .post_form("/registrations/7/document", &upload)
            .await
            .unwrap();
        assert!(matches!(body, JsonBody::Json(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            timeout_seconds: Some(2),
            ..Default::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        let err = gateway.get_json("/auth/me").await.unwrap_err();
        assert!(matches!(err, GodwitError::Connection(_)));
    }
}
