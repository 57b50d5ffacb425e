//! Domain identifier types
//!
//! Backend records are keyed by positive integers. Each record kind gets its
//! own newtype so a prescription id can never be passed where a consultation
//! id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a new identifier, rejecting zero
            pub fn new(id: u64) -> Result<Self, String> {
                NonZeroU64::new(id)
                    .map(Self)
                    .ok_or_else(|| concat!($label, " cannot be zero").to_string())
            }

            /// Returns the raw numeric value
            pub fn get(&self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .trim_start_matches('#')
                    .parse::<u64>()
                    .map_err(|e| format!(concat!("Invalid ", $label, " '{}': {}"), s, e))?;
                Self::new(raw)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a saved registration record
    RegistrationId,
    "registration ID"
);

numeric_id!(
    /// Identifier of an uploaded supporting document
    DocumentId,
    "document ID"
);

numeric_id!(
    /// Identifier of a consultation
    ///
    /// ```
    /// use godwit::domain::ids::ConsultationId;
    /// use std::str::FromStr;
    ///
    /// let id = ConsultationId::from_str("#17").unwrap();
    /// assert_eq!(id.get(), 17);
    /// ```
    ConsultationId,
    "consultation ID"
);

numeric_id!(
    /// Identifier of a created prescription
    PrescriptionId,
    "prescription ID"
);

numeric_id!(
    /// Identifier of a created referral
    ReferralId,
    "referral ID"
);

numeric_id!(
    /// Identifier of a signed-in account
    UserId,
    "user ID"
);

/// Human-facing patient reference
///
/// The backend issues references like `PV-000000123`, but older records may
/// carry a bare number. Both are kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PatientRef(String);

impl PatientRef {
    /// Creates a new patient reference
    pub fn new(reference: impl Into<String>) -> Result<Self, String> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err("Patient reference cannot be empty".to_string());
        }
        Ok(Self(reference.trim().to_string()))
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for PatientRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        PatientRef::new(text).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for PatientRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
