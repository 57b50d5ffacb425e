//! Registration draft and wizard
//!
//! - [`store`] - the write-through [`DraftStore`]
//! - [`wizard`] - step validation and terminal submission

pub mod store;
pub mod wizard;

pub use store::{DraftStore, DraftUpdate, DRAFT_KEY};
pub use wizard::{
    validate_all, validate_step, RegistrationWizard, SubmissionOutcome, WizardStep,
    STEP_ONE_REQUIRED,
};
