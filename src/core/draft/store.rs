//! Draft registration store
//!
//! Holds the single active [`RegistrationDraft`] and mirrors every mutation to
//! durable storage before returning (write-through). All mutations go through
//! [`DraftStore::set_draft`].

use crate::adapters::storage::KeyValueStore;
use crate::domain::{
    FieldError, FieldValue, GodwitError, RegistrationDraft, RegistrationField, Result,
    ValidationErrors,
};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Durable-storage key holding the serialized draft
pub const DRAFT_KEY: &str = "reg-draft";

/// Change applied by [`DraftStore::set_draft`]
pub enum DraftUpdate {
    /// Replace the whole draft
    Replace(RegistrationDraft),
    /// Derive the next draft from the previous one
    Apply(Box<dyn FnOnce(RegistrationDraft) -> RegistrationDraft + Send>),
}

impl DraftUpdate {
    /// Wraps an updater function
    pub fn apply<F>(f: F) -> Self
    where
        F: FnOnce(RegistrationDraft) -> RegistrationDraft + Send + 'static,
    {
        DraftUpdate::Apply(Box::new(f))
    }

    fn run(self, previous: RegistrationDraft) -> RegistrationDraft {
        match self {
            DraftUpdate::Replace(draft) => draft,
            DraftUpdate::Apply(f) => f(previous),
        }
    }
}

impl From<RegistrationDraft> for DraftUpdate {
    fn from(draft: RegistrationDraft) -> Self {
        DraftUpdate::Replace(draft)
    }
}

impl fmt::Debug for DraftUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftUpdate::Replace(draft) => f.debug_tuple("Replace").field(draft).finish(),
            DraftUpdate::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// Process-wide registration draft with write-through persistence
///
/// # Example
///
/// ```rust
/// use godwit::adapters::storage::MemoryStore;
/// use godwit::core::draft::{DraftStore, DraftUpdate};
/// use std::sync::Arc;
///
/// # fn example() -> godwit::domain::Result<()> {
/// let store = DraftStore::load(Arc::new(MemoryStore::new()));
/// store.set_draft(DraftUpdate::apply(|mut d| {
///     d.first_name = "Ada".to_string();
///     d
/// }))?;
/// assert_eq!(store.get_draft().first_name, "Ada");
/// # Ok(())
/// # }
/// ```
pub struct DraftStore {
    storage: Arc<dyn KeyValueStore>,
    current: Mutex<RegistrationDraft>,
}

impl DraftStore {
    /// Loads the persisted draft, or starts from the default
    ///
    /// A missing, unreadable or unparseable value falls back to
    /// [`RegistrationDraft::default`]; this never fails.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let draft = match storage.get(DRAFT_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<RegistrationDraft>(&raw) {
                Ok(draft) => {
                    tracing::debug!(registration_id = ?draft.id, "Restored registration draft");
                    draft
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted draft is unreadable, starting fresh");
                    RegistrationDraft::default()
                }
            },
            Ok(None) => RegistrationDraft::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted draft, starting fresh");
                RegistrationDraft::default()
            }
        };

        Self {
            storage,
            current: Mutex::new(draft),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistrationDraft> {
        self.current.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Current draft
    pub fn get_draft(&self) -> RegistrationDraft {
        self.lock().clone()
    }

    /// Applies an update and persists the result before returning it
    ///
    /// # Errors
    ///
    /// Returns a storage error if the new draft could not be persisted. The
    /// in-memory draft is then left unchanged, so memory and storage agree.
    pub fn set_draft(&self, update: impl Into<DraftUpdate>) -> Result<RegistrationDraft> {
        let mut current = self.lock();
        let next = update.into().run(current.clone());

        let raw = serde_json::to_string(&next)?;
        self.storage.set(DRAFT_KEY, &raw)?;

        *current = next.clone();
        Ok(next)
    }

    /// Sets one field through the mapping table
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value kind does not fit the field,
    /// or a storage error from [`DraftStore::set_draft`].
    pub fn set_field(&self, field: RegistrationField, value: FieldValue) -> Result<RegistrationDraft> {
        RegistrationDraft::default()
            .set(field, value.clone())
            .map_err(|message| {
                GodwitError::from(ValidationErrors::from(vec![FieldError::new(
                    field.label(),
                    message,
                )]))
            })?;

        tracing::debug!(field = field.label(), "Updated draft field");
        self.set_draft(DraftUpdate::apply(move |mut draft| {
            // kind checked above
            let _ = draft.set(field, value);
            draft
        }))
    }

    /// Clears the draft after a successful terminal submission
    ///
    /// Removes the durable key so the next session starts clean.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the key could not be removed.
    pub fn complete_submission(&self) -> Result<()> {
        let mut current = self.lock();
        self.storage.remove(DRAFT_KEY)?;
        *current = RegistrationDraft::default();
        tracing::info!("Registration draft cleared");
        Ok(())
    }
}

impl fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftStore")
            .field("current", &*self.lock())
            .finish_non_exhaustive()
    }
}
