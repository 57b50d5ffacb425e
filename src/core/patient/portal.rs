//! Patient-facing queries
//!
//! `204` and empty bodies are "nothing yet" and come back as `None` or an
//! empty list, never as errors.

use crate::adapters::api::{endpoints, ApiGateway, JsonBody};
use crate::core::artifact::{ArtifactManager, ArtifactPayload, ArtifactUrl};
use crate::domain::{
    CareHistory, ConsultationReceipt, DocumentMeta, GodwitError, NewConsultation,
    RegistrationRecord, Result,
};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct PatientPortal {
    gateway: Arc<dyn ApiGateway>,
    artifacts: ArtifactManager,
}

impl PatientPortal {
    pub fn new(gateway: Arc<dyn ApiGateway>, artifacts: ArtifactManager) -> Self {
        Self { gateway, artifacts }
    }

    /// The signed-in patient's care history
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the call.
    pub async fn care_history(&self) -> Result<Option<CareHistory>> {
        self.gateway
            .get_json(endpoints::CARE_HISTORY_MINE)
            .await?
            .decode()
    }

    /// URL of the patient's latest prescription PDF
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the call.
    pub async fn latest_prescription_url(&self) -> Result<Option<ArtifactUrl>> {
        self.latest_artifact(endpoints::PRESCRIPTIONS_LATEST).await
    }

    /// URL of the patient's latest referral PDF
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the call.
    pub async fn latest_referral_url(&self) -> Result<Option<ArtifactUrl>> {
        self.latest_artifact(endpoints::REFERRALS_LATEST).await
    }

    async fn latest_artifact(&self, path: &str) -> Result<Option<ArtifactUrl>> {
        let body = self.gateway.get_json(path).await?;
        let JsonBody::Json(value) = body else {
            return Ok(None);
        };
        match ArtifactPayload::from_json(&value) {
            Some(ArtifactPayload::Url(url)) => Ok(Some(self.artifacts.resolve_remote_url(&url)?)),
            _ => {
                tracing::debug!(path = path, "No artifact URL in latest-artifact response");
                Ok(None)
            }
        }
    }

    /// Latest registration saved under `email`
    ///
    /// The backend answers with one record, an array (the last element is
    /// the latest), or `204`.
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the call, or an invalid
    /// response error for an unexpected shape.
    pub async fn latest_registration(&self, email: &str) -> Result<Option<RegistrationRecord>> {
        let body = self
            .gateway
            .get_json(&endpoints::registrations_by_email(email))
            .await?;

        let value = match body {
            JsonBody::Json(Value::Array(mut rows)) => match rows.pop() {
                Some(last) => last,
                None => return Ok(None),
            },
            JsonBody::Json(Value::Null) | JsonBody::Empty { .. } => return Ok(None),
            JsonBody::Json(value) => value,
            JsonBody::Text(_) => {
                return Err(GodwitError::InvalidResponse(
                    "Expected a registration record".to_string(),
                ))
            }
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| GodwitError::InvalidResponse(format!("Unexpected registration shape: {e}")))
    }

    /// Documents attached to the latest registration under `email`
    ///
    /// # Errors
    ///
    /// Returns the error from either lookup.
    pub async fn latest_documents(&self, email: &str) -> Result<Vec<DocumentMeta>> {
        match self.latest_registration(email).await?.and_then(|r| r.id) {
            Some(id) => self.artifacts.list_documents(id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Logs a new consultation
    ///
    /// Detail notes are trimmed and blank ones dropped before sending.
    ///
    /// # Errors
    ///
    /// Returns the HTTP or connection error from the call.
    pub async fn log_consultation(&self, request: NewConsultation) -> Result<ConsultationReceipt> {
        let request = request.normalized();
        let receipt: ConsultationReceipt = self
            .gateway
            .post_json(endpoints::CONSULTATIONS, &serde_json::to_value(&request)?)
            .await?
            .decode_required()?;
        tracing::info!(
            consultation_id = %receipt.id,
            answers = request.answers.len(),
            "Consultation logged"
        );
        Ok(receipt)
    }

    pub fn artifacts(&self) -> &ArtifactManager {
        &self.artifacts
    }
}

impl std::fmt::Debug for PatientPortal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientPortal")
            .field("base", &self.gateway.urls().base())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::HttpGateway;
    use crate::adapters::storage::MemoryBlobStore;
    use crate::config::ApiConfig;
    use crate::domain::Answer;
    use mockito::Matcher;

    fn portal(server: &mockito::ServerGuard) -> PatientPortal {
        let config = ApiConfig {
            base_url: format!("{}/api", server.url()),
            ..Default::default()
        };
        let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&config).unwrap());
        let artifacts = ArtifactManager::new(gateway.clone(), Arc::new(MemoryBlobStore::new()));
        PatientPortal::new(gateway, artifacts)
    }

    #[tokio::test]
    async fn test_care_history_empty_state() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/care-history/mine")
            .with_status(204)
            .create_async()
            .await;

        assert_eq!(portal(&server).care_history().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_prescription_url_is_normalized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/prescriptions/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"pdfUrl":"/api/prescriptions/42/pdf"}"#)
            .create_async()
            .await;

        let url = portal(&server).latest_prescription_url().await.unwrap();
        assert_eq!(
            url,
            Some(ArtifactUrl::Remote(format!(
                "{}/api/prescriptions/42/pdf",
                server.url()
            )))
        );
    }

    #[tokio::test]
    async fn test_latest_prescription_none_yet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/prescriptions/latest")
            .with_status(204)
            .create_async()
            .await;

        assert_eq!(portal(&server).latest_prescription_url().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_referral_server_error_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/referrals/latest")
            .with_status(500)
            .with_body("down")
            .create_async()
            .await;

        let err = portal(&server).latest_referral_url().await.unwrap_err();
        assert!(matches!(err, GodwitError::Http(_)));
    }

    #[tokio::test]
    async fn test_latest_registration_array_takes_last() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/registrations")
            .match_query(Matcher::UrlEncoded("email".into(), "ada@example.com".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"packageDays":7},{"id":2,"packageDays":30}]"#)
            .create_async()
            .await;

        let record = portal(&server)
            .latest_registration("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id.map(|id| id.get()), Some(2));
        assert_eq!(record.package_days, 30);
    }

    #[tokio::test]
    async fn test_latest_registration_object_and_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/registrations")
            .match_query(Matcher::UrlEncoded("email".into(), "one@example.com".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":5,"firstName":"Ada","packageDays":14}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/registrations")
            .match_query(Matcher::UrlEncoded("email".into(), "none@example.com".into()))
            .with_status(204)
            .create_async()
            .await;

        let portal = portal(&server);
        let record = portal
            .latest_registration("one@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.first_name, "Ada");
        assert!(portal
            .latest_registration("none@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_log_consultation_sends_trimmed_notes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/consultations")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "currentLocation": "Lisbon",
                "answers": {"fever": "Yes", "rash": "No"},
                "detailsByQuestion": {"fever": "Since Tuesday"}
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":88,"status":"PENDING"}"#)
            .create_async()
            .await;

        let request = NewConsultation {
            current_location: "Lisbon".into(),
            ..Default::default()
        }
        .answer("fever", Answer::Yes, Some("  Since Tuesday "))
        .answer("rash", Answer::No, Some("   "));

        let receipt = portal(&server).log_consultation(request).await.unwrap();
        assert_eq!(receipt.id.get(), 88);
        mock.assert_async().await;
    }
}
