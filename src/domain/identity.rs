//! Signed-in identity
//!
//! Owned by the session provider. Orchestration code reads it to gate views
//! and to key queries; it never mutates it.

use super::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role tag attached to an identity
///
/// Backend tags are normalized: anything containing `DOCTOR`
/// (case-insensitive, e.g. `ROLE_DOCTOR`) is [`Role::Doctor`], `USER` and
/// `PATIENT` are [`Role::Patient`], anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Patient,
    Doctor,
    Other(String),
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        let upper = tag.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        if upper.contains("DOCTOR") {
            Role::Doctor
        } else if bare == "USER" || bare == "PATIENT" {
            Role::Patient
        } else {
            Role::Other(tag.trim().to_string())
        }
    }
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        Role::from(tag.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Patient => "USER".to_string(),
            Role::Doctor => "DOCTOR".to_string(),
            Role::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => f.write_str("patient"),
            Role::Doctor => f.write_str("doctor"),
            Role::Other(tag) => f.write_str(tag),
        }
    }
}

/// The signed-in user, as returned by `/auth/me` and `/auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Identity {
    /// Name shown in greetings; falls back to the email, then to "there"
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            name
        } else if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            email.to_string()
        } else {
            "there".to_string()
        }
    }

    /// True when the identity carries the role
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_doctor(&self) -> bool {
        self.has_role(&Role::Doctor)
    }

    pub fn is_patient(&self) -> bool {
        self.has_role(&Role::Patient)
    }
}

/// Outcome of gating a view on a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Signed in with the required role
    Granted(Identity),
    /// No session
    SignInRequired,
    /// Signed in, but without the required role
    Forbidden(Identity),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("DOCTOR", Role::Doctor)]
    #[test_case("ROLE_DOCTOR", Role::Doctor)]
    #[test_case("doctor", Role::Doctor)]
    #[test_case("USER", Role::Patient)]
    #[test_case("ROLE_PATIENT", Role::Patient)]
    #[test_case("ADMIN", Role::Other("ADMIN".to_string()))]
    fn test_role_normalization(tag: &str, expected: Role) {
        assert_eq!(Role::from(tag), expected);
    }

    #[test]
    fn test_identity_deserialize_user_dto() {
        let identity: Identity = serde_json::from_str(
            r#"{"id":3,"firstName":"Grace","lastName":"Hopper","email":"g@h.io","roles":["DOCTOR"]}"#,
        )
        .unwrap();
        assert!(identity.is_doctor());
        assert!(!identity.is_patient());
        assert_eq!(identity.display_name(), "Grace Hopper");
    }

    #[test]
    fn test_identity_tolerates_missing_fields() {
        let identity: Identity = serde_json::from_str(r#"{"email":"p@x.io"}"#).unwrap();
        assert!(identity.roles.is_empty());
        assert_eq!(identity.display_name(), "p@x.io");
    }

    #[test]
    fn test_identity_cache_roundtrip() {
        let identity = Identity {
            id: None,
            first_name: Some("Ada".into()),
            last_name: None,
            email: None,
            roles: vec![Role::Patient, Role::Other("BETA".into())],
        };
        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"USER\""));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }
}
