//! Three-step registration wizard
//!
//! Step 1 collects identity and contact details, step 2 the medical flags and
//! travel details, step 3 the package and an optional supporting document.
//! Validation lives here; the [`DraftStore`] only stores.

use super::store::{DraftStore, DraftUpdate};
use crate::adapters::api::{endpoints, ApiGateway};
use crate::core::artifact::ArtifactManager;
use crate::core::cancel::CancellationToken;
use crate::core::session::{NewAccount, SessionProvider};
use crate::domain::{
    DocumentMeta, DocumentUpload, FieldError, FollowUp, GodwitError, Identity, PartialSuccessError,
    PrimaryEffect, RegistrationDraft, RegistrationField, RegistrationId, RegistrationRecord,
    Result, ValidationErrors,
};
use crate::log_partial_success;
use std::fmt;
use std::sync::Arc;

/// Fields that must be non-blank before leaving step 1
pub const STEP_ONE_REQUIRED: [RegistrationField; 8] = [
    RegistrationField::FirstName,
    RegistrationField::LastName,
    RegistrationField::DateOfBirth,
    RegistrationField::Gender,
    RegistrationField::PrimaryNumber,
    RegistrationField::CarerNumber,
    RegistrationField::Email,
    RegistrationField::AccountPassword,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Personal,
    Medical,
    Package,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [WizardStep::Personal, WizardStep::Medical, WizardStep::Package];

    /// 1-based position
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Personal => 1,
            WizardStep::Medical => 2,
            WizardStep::Package => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Personal => "Personal details",
            WizardStep::Medical => "Health and travel",
            WizardStep::Package => "Package and documents",
        }
    }

    /// Draft fields collected on this step, in display order
    pub fn fields(self) -> &'static [RegistrationField] {
        match self {
            WizardStep::Personal => &[
                RegistrationField::FirstName,
                RegistrationField::MiddleName,
                RegistrationField::LastName,
                RegistrationField::DateOfBirth,
                RegistrationField::Gender,
                RegistrationField::PrimaryNumber,
                RegistrationField::CarerNumber,
                RegistrationField::Email,
                RegistrationField::AccountPassword,
            ],
            WizardStep::Medical => &[
                RegistrationField::LongTermMedication,
                RegistrationField::HealthCondition,
                RegistrationField::Allergies,
                RegistrationField::FitToFly,
                RegistrationField::TravellingFrom,
                RegistrationField::TravellingTo,
                RegistrationField::TravelStart,
                RegistrationField::TravelEnd,
            ],
            WizardStep::Package => &[
                RegistrationField::PackageDays,
                RegistrationField::DocumentFileName,
            ],
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of 3: {}", self.number(), self.title())
    }
}

fn collect_step(draft: &RegistrationDraft, step: WizardStep, errors: &mut ValidationErrors) {
    match step {
        WizardStep::Personal => {
            for field in STEP_ONE_REQUIRED {
                if draft.get(field).is_blank() {
                    errors.push(FieldError::required(field.label()));
                }
            }
        }
        WizardStep::Medical => {}
        WizardStep::Package => {
            if draft.package().is_none() {
                errors.push(FieldError::new(
                    RegistrationField::PackageDays.label(),
                    "Choose a 7, 14 or 30 day package",
                ));
            }
        }
    }
}

/// Validates one step, reporting every failing field
///
/// # Errors
///
/// Returns all field errors of the step at once.
pub fn validate_step(draft: &RegistrationDraft, step: WizardStep) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    collect_step(draft, step, &mut errors);
    errors.into_result(())
}

/// Validates every step
///
/// # Errors
///
/// Returns the field errors of all steps together.
pub fn validate_all(draft: &RegistrationDraft) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for step in WizardStep::ALL {
        collect_step(draft, step, &mut errors);
    }
    errors.into_result(())
}

/// Result of a completed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub registration_id: RegistrationId,
    pub document: Option<DocumentMeta>,
    /// Identity established by the automatic sign-in, if it worked
    pub signed_in: Option<Identity>,
}

/// Drives the wizard over a shared [`DraftStore`]
pub struct RegistrationWizard {
    drafts: Arc<DraftStore>,
    gateway: Arc<dyn ApiGateway>,
    artifacts: ArtifactManager,
    session: Arc<SessionProvider>,
    step: WizardStep,
}

impl RegistrationWizard {
    pub fn new(
        drafts: Arc<DraftStore>,
        gateway: Arc<dyn ApiGateway>,
        artifacts: ArtifactManager,
        session: Arc<SessionProvider>,
    ) -> Self {
        Self {
            drafts,
            gateway,
            artifacts,
            session,
            step: WizardStep::Personal,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn drafts(&self) -> &Arc<DraftStore> {
        &self.drafts
    }

    /// Validates the current step and moves forward
    ///
    /// Staying on the last step is not an error.
    ///
    /// # Errors
    ///
    /// Returns the current step's field errors; the step does not change.
    pub fn advance(&mut self) -> Result<WizardStep> {
        validate_step(&self.drafts.get_draft(), self.step)?;
        if let Some(next) = self.step.next() {
            tracing::debug!(from = self.step.number(), to = next.number(), "Wizard advanced");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves back one step without validating
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Submits the registration
    ///
    /// Creates the record, stores its identifier in the draft, uploads the
    /// document if one is attached, then creates the account and signs in on
    /// a best-effort basis. The draft is cleared only when all of that is done.
    ///
    /// # Errors
    ///
    /// - [`GodwitError::Validation`] before any network call
    /// - [`GodwitError::Http`] / [`GodwitError::Connection`] when the record
    ///   cannot be created
    /// - [`GodwitError::PartialSuccess`] when the record was saved but the
    ///   document upload failed; the draft keeps the record id so
    ///   [`RegistrationWizard::retry_document_upload`] can finish the job
    /// - [`GodwitError::Cancelled`] when `token` fires between steps
    pub async fn submit(
        &mut self,
        document: Option<DocumentUpload>,
        token: &CancellationToken,
    ) -> Result<SubmissionOutcome> {
        validate_all(&self.drafts.get_draft())?;

        if let Some(file) = &document {
            let name = file.file_name.clone();
            self.drafts.set_draft(DraftUpdate::apply(move |mut draft| {
                draft.document_file_name = Some(name);
                draft
            }))?;
        }

        let record = self.drafts.get_draft().to_record();
        tracing::info!(
            package_days = record.package_days,
            has_document = document.is_some(),
            "Submitting registration"
        );
        let body = self
            .gateway
            .post_json(endpoints::REGISTRATIONS, &serde_json::to_value(&record)?)
            .await?;
        let saved: RegistrationRecord = body.decode_required()?;
        let id = saved.id.ok_or_else(|| {
            GodwitError::InvalidResponse("Registration saved but no id returned".to_string())
        })?;

        // The record exists on the server now; keep its id even if cancelled
        self.drafts.set_draft(DraftUpdate::apply(move |mut draft| {
            draft.id = Some(id);
            draft
        }))?;
        tracing::info!(registration_id = %id, "Registration saved");
        token.check()?;

        let uploaded = match &document {
            Some(file) => Some(self.upload(id, file).await?),
            None => None,
        };
        token.check()?;

        self.finish(id, uploaded, token).await
    }

    /// Re-runs only the document upload for a saved registration
    ///
    /// On success the submission completes as [`RegistrationWizard::submit`]
    /// would have.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the draft has no saved record, and
    /// otherwise the same errors as the upload step of `submit`.
    pub async fn retry_document_upload(
        &mut self,
        document: DocumentUpload,
        token: &CancellationToken,
    ) -> Result<SubmissionOutcome> {
        let id = self.drafts.get_draft().id.ok_or_else(|| {
            GodwitError::from(ValidationErrors::from(vec![FieldError::new(
                "Registration",
                "Registration has not been saved yet",
            )]))
        })?;

        let name = document.file_name.clone();
        self.drafts.set_draft(DraftUpdate::apply(move |mut draft| {
            draft.document_file_name = Some(name);
            draft
        }))?;

        let meta = self.upload(id, &document).await?;
        token.check()?;
        self.finish(id, Some(meta), token).await
    }

    async fn upload(&self, id: RegistrationId, file: &DocumentUpload) -> Result<DocumentMeta> {
        match self.artifacts.upload_document(id, file).await {
            Ok(meta) => Ok(meta),
            Err(cause) => {
                let partial = PartialSuccessError::new(
                    PrimaryEffect::RegistrationSaved(id),
                    FollowUp::DocumentUpload,
                    cause,
                );
                log_partial_success!(&partial);
                Err(partial.into())
            }
        }
    }

    async fn finish(
        &mut self,
        id: RegistrationId,
        document: Option<DocumentMeta>,
        token: &CancellationToken,
    ) -> Result<SubmissionOutcome> {
        let account = NewAccount::from_draft(&self.drafts.get_draft());

        if let Err(e) = self.session.register_account(&account).await {
            tracing::warn!(error = %e, "Account creation failed; the registration is saved");
        }
        token.check()?;

        let signed_in = match self
            .session
            .login(account.login_identifier(), &account.password)
            .await
        {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "Automatic sign-in failed");
                None
            }
        };
        token.check()?;

        self.drafts.complete_submission()?;
        self.step = WizardStep::Personal;

        Ok(SubmissionOutcome {
            registration_id: id,
            document,
            signed_in,
        })
    }
}

impl fmt::Debug for RegistrationWizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationWizard")
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}
