//! Password handling using the secrecy crate
//!
//! Account passwords flow through configuration (`[credentials]`), the
//! registration draft and the sign-in calls. They are always held as
//! [`SecretString`] so that:
//!
//! - memory is zeroed when the value is dropped
//! - `Debug` output is redacted and never reaches the logs
//! - reading the value requires an explicit `expose_secret()`
//!
//! # Example
//!
//! ```rust
//! use godwit::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("hunter2".to_string());
//! assert_eq!(password.expose_secret().as_str(), "hunter2");
//! assert!(!format!("{password:?}").contains("hunter2"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Default, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Borrows the underlying text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for an empty value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the value has no non-whitespace characters
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A password wrapped in a zeroizing, redacting container
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Compares two secrets without exposing either outside this module
pub fn secrets_equal(a: &SecretString, b: &SecretString) -> bool {
    a.expose_secret().as_str() == b.expose_secret().as_str()
}
