//! Consultation workflow controller
//!
//! One controller per consultation detail view. `load` moves the view from
//! `Loading` to `Ready`; the prescription and referral sub-flows then run
//! independently, each `Composing -> Submitting -> Succeeded | Failed`.
//!
//! Every async method takes a [`CancellationToken`] and checks it before
//! applying a result, so a controller whose owner has gone away never writes
//! stale state.

use super::state::{FlowState, LatestPrescription, ReadyView, ViewState};
use crate::adapters::api::{endpoints, ApiGateway};
use crate::adapters::storage::BlobUrl;
use crate::core::artifact::{ArtifactManager, ArtifactSlot, ArtifactUrl};
use crate::core::cancel::CancellationToken;
use crate::domain::{
    Consultation, ConsultationId, ConsultationStatus, ConsultationSummary, FollowUp, GodwitError,
    PartialSuccessError, Practitioner, PrescriptionCreated, PrescriptionDraft, PrescriptionId,
    PrescriptionMeta, PrescriptionRequest, PrimaryEffect, ReferralDraft, ReferralId, Result,
};
use crate::log_partial_success;
use std::sync::Arc;

/// Consultations visible to the signed-in doctor
///
/// # Errors
///
/// Returns the HTTP or connection error from the listing call.
pub async fn list_consultations(
    gateway: &dyn ApiGateway,
    status: Option<&ConsultationStatus>,
) -> Result<Vec<ConsultationSummary>> {
    let body = gateway
        .get_json(&endpoints::doctor_consultations(status))
        .await?;
    let rows: Vec<ConsultationSummary> = body.decode()?.unwrap_or_default();
    tracing::debug!(count = rows.len(), status = ?status, "Listed consultations");
    Ok(rows)
}

/// Orchestrates one consultation's prescription and referral
pub struct ConsultationWorkflow {
    pub(super) id: ConsultationId,
    pub(super) gateway: Arc<dyn ApiGateway>,
    pub(super) artifacts: ArtifactManager,
    pub(super) practitioner: Practitioner,
    pub(super) view: ViewState,

    pub(super) prescription: PrescriptionDraft,
    pub(super) prescription_state: FlowState,
    pub(super) prescription_slot: ArtifactSlot,
    pub(super) created_prescription: Option<PrescriptionId>,

    pub(super) referral: ReferralDraft,
    pub(super) referral_state: FlowState,
    pub(super) referral_slot: ArtifactSlot,
    pub(super) created_referral: Option<ReferralId>,
}

impl ConsultationWorkflow {
    pub fn new(
        id: ConsultationId,
        gateway: Arc<dyn ApiGateway>,
        artifacts: ArtifactManager,
        practitioner: Practitioner,
    ) -> Self {
        let prescription_slot = artifacts.new_slot();
        let referral_slot = artifacts.new_slot();
        Self {
            id,
            gateway,
            artifacts,
            practitioner,
            view: ViewState::Loading,
            prescription: PrescriptionDraft::new(),
            prescription_state: FlowState::Composing,
            prescription_slot,
            created_prescription: None,
            referral: ReferralDraft::default(),
            referral_state: FlowState::Composing,
            referral_slot,
            created_referral: None,
        }
    }

    pub fn id(&self) -> ConsultationId {
        self.id
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn consultation(&self) -> Option<&Consultation> {
        self.view.ready().map(|v| &v.consultation)
    }

    pub fn latest_prescription(&self) -> Option<&LatestPrescription> {
        self.view.ready().map(|v| &v.latest_prescription)
    }

    /// Fetches the consultation and, opportunistically, its latest prescription
    ///
    /// The referral letter is pre-filled from the consultation unless the user
    /// has already written one.
    ///
    /// # Errors
    ///
    /// Returns the error from the consultation fetch; the view moves to
    /// [`ViewState::LoadFailed`]. A failed prescription lookup does not fail
    /// the load.
    pub async fn load(&mut self, token: &CancellationToken) -> Result<&Consultation> {
        self.view = ViewState::Loading;
        tracing::debug!(consultation_id = %self.id, "Loading consultation");

        let fetched = self.fetch_consultation().await;
        token.check()?;

        let consultation = match fetched {
            Ok(consultation) => consultation,
            Err(e) => {
                self.view = ViewState::LoadFailed(e.to_string());
                return Err(e);
            }
        };

        let latest = self.fetch_latest_prescription().await;
        token.check()?;

        if self.referral.body.trim().is_empty() {
            self.referral = ReferralDraft::from_consultation(&consultation, &self.practitioner);
        }

        tracing::info!(
            consultation_id = %self.id,
            latest_prescription = matches!(latest, LatestPrescription::Present(_)),
            "Consultation loaded"
        );
        self.view = ViewState::Ready(Box::new(ReadyView {
            consultation,
            latest_prescription: latest,
        }));

        self.consultation().ok_or_else(|| {
            GodwitError::Other("Consultation view is not ready".to_string())
        })
    }

    async fn fetch_consultation(&self) -> Result<Consultation> {
        self.gateway
            .get_json(&endpoints::doctor_consultation(self.id))
            .await?
            .decode::<Consultation>()?
            .ok_or_else(|| {
                GodwitError::InvalidResponse(format!("Consultation {} not found", self.id))
            })
    }

    async fn fetch_latest_prescription(&self) -> LatestPrescription {
        let path = endpoints::doctor_latest_prescription(self.id);
        match self.gateway.get_json(&path).await {
            Ok(body) => match body.decode::<PrescriptionMeta>() {
                Ok(Some(meta)) => LatestPrescription::Present(meta),
                Ok(None) => LatestPrescription::None,
                Err(e) => LatestPrescription::Unavailable(e.to_string()),
            },
            Err(GodwitError::Http(e)) if e.is_not_found() => LatestPrescription::None,
            Err(e) => {
                tracing::warn!(consultation_id = %self.id, error = %e, "Latest prescription unavailable");
                LatestPrescription::Unavailable(e.to_string())
            }
        }
    }

    pub(super) fn require_ready(&self) -> Result<()> {
        match &self.view {
            ViewState::Ready(_) => Ok(()),
            _ => Err(GodwitError::Other(
                "Consultation must be loaded first".to_string(),
            )),
        }
    }

    /// Takes ownership of a fetched blob, unless the owner has gone away
    pub(super) fn adopt_blob(
        &self,
        blob: BlobUrl,
        token: &CancellationToken,
    ) -> Result<ArtifactUrl> {
        if let Err(e) = token.check() {
            if let Err(release) = self.artifacts.blobs().release(&blob) {
                tracing::warn!(url = %blob, error = %release, "Failed to release discarded artifact");
            }
            return Err(e);
        }
        Ok(ArtifactUrl::Blob(blob))
    }

    // ---- prescription sub-flow ----

    pub fn prescription_draft(&self) -> &PrescriptionDraft {
        &self.prescription
    }

    /// Editable prescription; editing after a failure returns to `Composing`
    pub fn prescription_draft_mut(&mut self) -> &mut PrescriptionDraft {
        if matches!(self.prescription_state, FlowState::Failed { .. }) {
            self.prescription_state = FlowState::Composing;
        }
        &mut self.prescription
    }

    pub fn prescription_state(&self) -> &FlowState {
        &self.prescription_state
    }

    pub fn created_prescription(&self) -> Option<PrescriptionId> {
        self.created_prescription
    }

    /// Hands the fetched prescription PDF to the caller
    ///
    /// The workflow no longer releases it; the caller owns the blob.
    pub fn take_prescription_artifact(&mut self) -> Option<ArtifactUrl> {
        self.prescription_slot.take()
    }

    /// Creates the prescription, then fetches its PDF
    ///
    /// # Errors
    ///
    /// - [`GodwitError::Validation`] before any network call; the flow stays
    ///   in `Composing`
    /// - the create error; the flow moves to [`FlowState::Failed`]
    /// - [`GodwitError::PartialSuccess`] when the prescription was created
    ///   but its PDF could not be fetched; the flow moves to
    ///   [`FlowState::PdfFailed`] holding the new identifier
    pub async fn submit_prescription(&mut self, token: &CancellationToken) -> Result<ArtifactUrl> {
        self.require_ready()?;
        let request = self.prescription.validate()?;

        self.prescription_state = FlowState::Submitting;
        tracing::info!(
            consultation_id = %self.id,
            medicines = request.medicines.len(),
            "Creating prescription"
        );

        let created = self.create_prescription(&request).await;
        token.check()?;

        let id = match created {
            Ok(created) => created.id,
            Err(e) => {
                self.prescription_state = FlowState::Failed {
                    message: format!("Failed to create prescription: {e}"),
                };
                return Err(e);
            }
        };
        self.created_prescription = Some(id);
        tracing::info!(consultation_id = %self.id, prescription_id = %id, "Prescription created");

        self.fetch_prescription_pdf(id, token).await
    }

    async fn create_prescription(&self, request: &PrescriptionRequest) -> Result<PrescriptionCreated> {
        let body = serde_json::to_value(request)?;
        self.gateway
            .post_json(&endpoints::doctor_prescriptions(self.id), &body)
            .await?
            .decode_required()
    }

    /// Retries only the PDF fetch for the prescription already created
    ///
    /// # Errors
    ///
    /// Returns an error when no prescription has been created, or the same
    /// partial-success error as [`ConsultationWorkflow::submit_prescription`].
    pub async fn retry_prescription_pdf(&mut self, token: &CancellationToken) -> Result<ArtifactUrl> {
        let id = self.created_prescription.ok_or_else(|| {
            GodwitError::Other("No prescription has been created yet".to_string())
        })?;
        self.prescription_state = FlowState::Submitting;
        self.fetch_prescription_pdf(id, token).await
    }

    async fn fetch_prescription_pdf(
        &mut self,
        id: PrescriptionId,
        token: &CancellationToken,
    ) -> Result<ArtifactUrl> {
        let path = endpoints::doctor_prescription_pdf(id);
        let fetched = self.artifacts.fetch_artifact_blob(&path).await;

        match fetched {
            Ok(blob) => {
                let url = self.adopt_blob(blob, token)?;
                self.prescription_slot.assign(url.clone());
                self.prescription_state = FlowState::Succeeded(url.clone());
                Ok(url)
            }
            Err(cause) => {
                token.check()?;
                let message = format!(
                    "Prescription #{id} created, but the PDF could not be retrieved: {cause}"
                );
                let partial = PartialSuccessError::new(
                    PrimaryEffect::PrescriptionCreated(id),
                    FollowUp::PrescriptionPdf,
                    cause,
                );
                log_partial_success!(&partial);
                self.prescription_state = FlowState::PdfFailed {
                    created_id: id.get(),
                    message,
                };
                Err(partial.into())
            }
        }
    }
}

impl std::fmt::Debug for ConsultationWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsultationWorkflow")
            .field("id", &self.id)
            .field("view", &self.view)
            .field("prescription_state", &self.prescription_state)
            .field("referral_state", &self.referral_state)
            .finish_non_exhaustive()
    }
}
