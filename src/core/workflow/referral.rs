//! Referral sub-flow
//!
//! The create call answers with a PDF stream, a JSON `pdfUrl`, or a JSON `id`
//! whose PDF must be fetched separately. All three are handled here.

use super::controller::ConsultationWorkflow;
use super::state::FlowState;
use crate::adapters::api::endpoints;
use crate::core::artifact::{ArtifactPayload, ArtifactUrl};
use crate::core::cancel::CancellationToken;
use crate::domain::referral::render_preview;
use crate::domain::{
    FollowUp, GodwitError, PartialSuccessError, PrimaryEffect, ReferralDraft, ReferralId,
    ReferralRequest, Result,
};
use crate::log_partial_success;

const NO_ARTIFACT: &str = "Referral created but no PDF URL/ID returned.";

impl ConsultationWorkflow {
    pub fn referral_draft(&self) -> &ReferralDraft {
        &self.referral
    }

    /// Editable letter; editing after a failure returns to `Composing`
    pub fn referral_draft_mut(&mut self) -> &mut ReferralDraft {
        if matches!(self.referral_state, FlowState::Failed { .. }) {
            self.referral_state = FlowState::Composing;
        }
        &mut self.referral
    }

    /// Discards edits and rebuilds the letter from the consultation
    ///
    /// # Errors
    ///
    /// Fails when the consultation has not been loaded.
    pub fn reset_referral(&mut self) -> Result<()> {
        let consultation = self.consultation().cloned().ok_or_else(|| {
            GodwitError::Other("Consultation must be loaded first".to_string())
        })?;
        self.referral = ReferralDraft::from_consultation(&consultation, &self.practitioner);
        self.referral_state = FlowState::Composing;
        Ok(())
    }

    pub fn referral_state(&self) -> &FlowState {
        &self.referral_state
    }

    pub fn created_referral(&self) -> Option<ReferralId> {
        self.created_referral
    }

    /// Hands the referral PDF to the caller, who then owns the blob
    pub fn take_referral_artifact(&mut self) -> Option<ArtifactUrl> {
        self.referral_slot.take()
    }

    /// Plain-text preview of the letter; no network call
    pub fn referral_preview(&self) -> Option<String> {
        self.consultation()
            .map(|c| render_preview(c, &self.practitioner, &self.referral.body))
    }

    /// Creates the referral and resolves its PDF
    ///
    /// # Errors
    ///
    /// - [`GodwitError::Validation`] for a blank letter, before any call
    /// - the create error, or an invalid response error when the server
    ///   returned neither a PDF, a URL nor an id; the flow moves to
    ///   [`FlowState::Failed`]
    /// - [`GodwitError::PartialSuccess`] when the referral was created by id
    ///   but its PDF could not be fetched
    pub async fn submit_referral(&mut self, token: &CancellationToken) -> Result<ArtifactUrl> {
        self.require_ready()?;
        let request = self.referral.validate()?;

        self.referral_state = FlowState::Submitting;
        tracing::info!(consultation_id = %self.id, "Creating referral");

        let payload = self.create_referral(&request).await;
        token.check()?;

        let payload = match payload {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.referral_state = FlowState::Failed {
                    message: NO_ARTIFACT.to_string(),
                };
                return Err(GodwitError::InvalidResponse(NO_ARTIFACT.to_string()));
            }
            Err(e) => {
                self.referral_state = FlowState::Failed {
                    message: format!("Failed to create referral: {e}"),
                };
                return Err(e);
            }
        };

        match payload {
            ArtifactPayload::Id(raw) => {
                let id = ReferralId::new(raw).map_err(GodwitError::InvalidResponse)?;
                self.created_referral = Some(id);
                tracing::info!(consultation_id = %self.id, referral_id = %id, "Referral created");
                self.fetch_referral_pdf(id, token).await
            }
            other => {
                let resolved = self
                    .artifacts
                    .resolve_payload(other, |raw| {
                        ReferralId::new(raw)
                            .map(endpoints::doctor_referral_pdf)
                            .map_err(GodwitError::InvalidResponse)
                    })
                    .await;
                match resolved {
                    Ok(url) => {
                        let url = match url {
                            ArtifactUrl::Blob(blob) => self.adopt_blob(blob, token)?,
                            remote => remote,
                        };
                        tracing::info!(consultation_id = %self.id, "Referral created");
                        self.referral_slot.assign(url.clone());
                        self.referral_state = FlowState::Succeeded(url.clone());
                        Ok(url)
                    }
                    Err(e) => {
                        self.referral_state = FlowState::Failed {
                            message: e.to_string(),
                        };
                        Err(e)
                    }
                }
            }
        }
    }

    /// Retries only the PDF fetch for a referral created by id
    ///
    /// # Errors
    ///
    /// Returns an error when no referral id is known, or the partial-success
    /// error from the fetch.
    pub async fn retry_referral_pdf(&mut self, token: &CancellationToken) -> Result<ArtifactUrl> {
        let id = self.created_referral.ok_or_else(|| {
            GodwitError::Other("No referral has been created yet".to_string())
        })?;
        self.referral_state = FlowState::Submitting;
        self.fetch_referral_pdf(id, token).await
    }

    async fn create_referral(&self, request: &ReferralRequest) -> Result<Option<ArtifactPayload>> {
        let body = serde_json::to_value(request)?;
        let raw = self
            .gateway
            .post_json_raw(&endpoints::doctor_referrals(self.id), &body)
            .await?;
        ArtifactPayload::from_response(raw)
    }

    async fn fetch_referral_pdf(
        &mut self,
        id: ReferralId,
        token: &CancellationToken,
    ) -> Result<ArtifactUrl> {
        let fetched = self
            .artifacts
            .fetch_artifact_blob(&endpoints::doctor_referral_pdf(id))
            .await;

        match fetched {
            Ok(blob) => {
                let url = self.adopt_blob(blob, token)?;
                self.referral_slot.assign(url.clone());
                self.referral_state = FlowState::Succeeded(url.clone());
                Ok(url)
            }
            Err(cause) => {
                token.check()?;
                let message =
                    format!("Referral #{id} created, but the PDF could not be retrieved: {cause}");
                let partial = PartialSuccessError::new(
                    PrimaryEffect::ReferralCreated(id),
                    FollowUp::ReferralPdf,
                    cause,
                );
                log_partial_success!(&partial);
                self.referral_state = FlowState::PdfFailed {
                    created_id: id.get(),
                    message,
                };
                Err(partial.into())
            }
        }
    }
}
