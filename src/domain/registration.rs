//! Registration draft and record types
//!
//! A registration exists in two shapes:
//!
//! - [`RegistrationDraft`] is the client-side, in-progress form. It is keyed by
//!   the human-readable field labels shown in the wizard, and that is also the
//!   shape kept in durable local storage.
//! - [`RegistrationRecord`] is the machine shape sent to and received from
//!   `/registrations`, keyed by stable camelCase field names.
//!
//! [`RegistrationField`] is the explicit bidirectional mapping table between
//! the two. Conversions between draft and record are written out field by
//! field rather than through runtime string-keyed lookup.

use super::ids::RegistrationId;
use crate::config::secret::{secret_string, secrets_equal, SecretString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Package lengths offered in the final wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageLength {
    /// 7 days
    Week,
    /// 14 days
    Fortnight,
    /// 30 days
    Month,
}

impl PackageLength {
    /// All selectable package lengths
    pub const ALL: [PackageLength; 3] = [
        PackageLength::Week,
        PackageLength::Fortnight,
        PackageLength::Month,
    ];

    /// Number of days covered
    pub fn days(self) -> u32 {
        match self {
            PackageLength::Week => 7,
            PackageLength::Fortnight => 14,
            PackageLength::Month => 30,
        }
    }

    /// Maps a day count back to a package, if it is one of the fixed lengths
    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.days() == days)
    }
}

impl Default for PackageLength {
    fn default() -> Self {
        PackageLength::Week
    }
}

impl fmt::Display for PackageLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

/// Password chosen for the patient account created on submission
///
/// Kept in the draft only. It never travels in a [`RegistrationRecord`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountPassword(SecretString);

impl AccountPassword {
    /// Wraps a plain password
    pub fn new(password: impl Into<String>) -> Self {
        Self(secret_string(password.into()))
    }

    /// True when nothing but whitespace has been entered
    pub fn is_blank(&self) -> bool {
        self.0.expose_secret().is_blank()
    }

    /// The protected value
    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl Default for AccountPassword {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl PartialEq for AccountPassword {
    fn eq(&self, other: &Self) -> bool {
        secrets_equal(&self.0, &other.0)
    }
}

impl fmt::Debug for AccountPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            write!(f, "AccountPassword(<unset>)")
        } else {
            write!(f, "AccountPassword([REDACTED])")
        }
    }
}

/// In-progress registration form
///
/// Serialized with the human-readable labels as keys. Missing keys take their
/// default value on load so older persisted drafts still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationDraft {
    /// Backend identifier, assigned once the record has been saved
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RegistrationId>,

    #[serde(rename = "First Name")]
    pub first_name: String,

    #[serde(rename = "Middle Name")]
    pub middle_name: String,

    #[serde(rename = "Last Name")]
    pub last_name: String,

    #[serde(rename = "Date of Birth")]
    pub date_of_birth: String,

    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "Primary WhatsApp Number")]
    pub primary_number: String,

    #[serde(rename = "Carer/Secondary WhatsApp Number")]
    pub carer_number: String,

    #[serde(rename = "Email Address")]
    pub email: String,

    #[serde(rename = "Are you on any long-term/regular medication that we should be aware of?")]
    pub long_term_medication: bool,

    #[serde(rename = "Do you have any health condition that can affect your trip?")]
    pub health_condition: bool,

    #[serde(rename = "Do you have any allergies that can affect your trip?")]
    pub allergies: bool,

    #[serde(rename = "Have you been advised to produce a fit-to-fly certificate?")]
    pub fit_to_fly: bool,

    #[serde(rename = "Travelling From")]
    pub travelling_from: String,

    #[serde(rename = "Travelling To (UK & Europe)")]
    pub travelling_to: String,

    #[serde(rename = "Travel Start Date")]
    pub travel_start: String,

    #[serde(rename = "Travel End Date")]
    pub travel_end: String,

    /// Raw day count; only 7, 14 and 30 pass validation
    #[serde(rename = "Package Days")]
    pub package_days: u32,

    #[serde(rename = "Document File Name", skip_serializing_if = "Option::is_none")]
    pub document_file_name: Option<String>,

    #[serde(rename = "Account Password")]
    pub account_password: AccountPassword,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            id: None,
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            date_of_birth: String::new(),
            gender: String::new(),
            primary_number: String::new(),
            carer_number: String::new(),
            email: String::new(),
            long_term_medication: false,
            health_condition: false,
            allergies: false,
            fit_to_fly: false,
            travelling_from: String::new(),
            travelling_to: String::new(),
            travel_start: String::new(),
            travel_end: String::new(),
            package_days: PackageLength::default().days(),
            document_file_name: None,
            account_password: AccountPassword::default(),
        }
    }
}

impl RegistrationDraft {
    /// Selected package, if the stored day count is one of the fixed lengths
    pub fn package(&self) -> Option<PackageLength> {
        PackageLength::from_days(self.package_days)
    }

    /// Reads a field through the mapping table
    ///
    /// The account password is reported as [`FieldValue::Secret`] so it can
    /// be checked for presence without being printed.
    pub fn get(&self, field: RegistrationField) -> FieldValue {
        use RegistrationField as F;
        match field {
            F::FirstName => FieldValue::Text(self.first_name.clone()),
            F::MiddleName => FieldValue::Text(self.middle_name.clone()),
            F::LastName => FieldValue::Text(self.last_name.clone()),
            F::DateOfBirth => FieldValue::Text(self.date_of_birth.clone()),
            F::Gender => FieldValue::Text(self.gender.clone()),
            F::PrimaryNumber => FieldValue::Text(self.primary_number.clone()),
            F::CarerNumber => FieldValue::Text(self.carer_number.clone()),
            F::Email => FieldValue::Text(self.email.clone()),
            F::LongTermMedication => FieldValue::Flag(self.long_term_medication),
            F::HealthCondition => FieldValue::Flag(self.health_condition),
            F::Allergies => FieldValue::Flag(self.allergies),
            F::FitToFly => FieldValue::Flag(self.fit_to_fly),
            F::TravellingFrom => FieldValue::Text(self.travelling_from.clone()),
            F::TravellingTo => FieldValue::Text(self.travelling_to.clone()),
            F::TravelStart => FieldValue::Text(self.travel_start.clone()),
            F::TravelEnd => FieldValue::Text(self.travel_end.clone()),
            F::PackageDays => FieldValue::Days(self.package_days),
            F::DocumentFileName => match &self.document_file_name {
                Some(name) => FieldValue::Text(name.clone()),
                None => FieldValue::Absent,
            },
            F::AccountPassword => FieldValue::Secret(self.account_password.clone()),
        }
    }

    /// Writes a field through the mapping table
    ///
    /// # Errors
    ///
    /// Returns an error when the value kind does not match the field kind.
    pub fn set(&mut self, field: RegistrationField, value: FieldValue) -> Result<(), String> {
        use RegistrationField as F;

        let mismatch = |value: &FieldValue| {
            format!(
                "{} expects {} but got {}",
                field.label(),
                field.kind(),
                value.kind_name()
            )
        };

        match (field, value) {
            (F::LongTermMedication, FieldValue::Flag(v)) => self.long_term_medication = v,
            (F::HealthCondition, FieldValue::Flag(v)) => self.health_condition = v,
            (F::Allergies, FieldValue::Flag(v)) => self.allergies = v,
            (F::FitToFly, FieldValue::Flag(v)) => self.fit_to_fly = v,
            (F::PackageDays, FieldValue::Days(v)) => self.package_days = v,
            (F::DocumentFileName, FieldValue::Text(v)) => {
                self.document_file_name = if v.trim().is_empty() { None } else { Some(v) }
            }
            (F::DocumentFileName, FieldValue::Absent) => self.document_file_name = None,
            (F::AccountPassword, FieldValue::Secret(v)) => self.account_password = v,
            (F::AccountPassword, FieldValue::Text(v)) => {
                self.account_password = AccountPassword::new(v)
            }
            (field, FieldValue::Text(v)) if field.kind() == FieldKind::Text => {
                *self.text_slot(field).ok_or_else(|| mismatch(&FieldValue::Text(String::new())))? = v
            }
            (_, other) => return Err(mismatch(&other)),
        }
        Ok(())
    }

    fn text_slot(&mut self, field: RegistrationField) -> Option<&mut String> {
        use RegistrationField as F;
        Some(match field {
            F::FirstName => &mut self.first_name,
            F::MiddleName => &mut self.middle_name,
            F::LastName => &mut self.last_name,
            F::DateOfBirth => &mut self.date_of_birth,
            F::Gender => &mut self.gender,
            F::PrimaryNumber => &mut self.primary_number,
            F::CarerNumber => &mut self.carer_number,
            F::Email => &mut self.email,
            F::TravellingFrom => &mut self.travelling_from,
            F::TravellingTo => &mut self.travelling_to,
            F::TravelStart => &mut self.travel_start,
            F::TravelEnd => &mut self.travel_end,
            _ => return None,
        })
    }

    /// Builds the record sent to the backend
    pub fn to_record(&self) -> RegistrationRecord {
        RegistrationRecord {
            id: self.id,
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth.clone(),
            gender: self.gender.clone(),
            primary_whats_app_number: self.primary_number.clone(),
            carer_secondary_whats_app_number: self.carer_number.clone(),
            email_address: self.email.clone(),
            long_term_medication: self.long_term_medication,
            health_condition: self.health_condition,
            allergies: self.allergies,
            fit_to_fly_certificate: self.fit_to_fly,
            travelling_from: self.travelling_from.clone(),
            travelling_to: self.travelling_to.clone(),
            travel_start_date: self.travel_start.clone(),
            travel_end_date: self.travel_end.clone(),
            package_days: self.package_days,
            document_file_name: self.document_file_name.clone(),
        }
    }

    /// Rebuilds a draft from a backend record
    ///
    /// The account password is not part of the record and stays empty.
    pub fn from_record(record: RegistrationRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            middle_name: record.middle_name,
            last_name: record.last_name,
            date_of_birth: record.date_of_birth,
            gender: record.gender,
            primary_number: record.primary_whats_app_number,
            carer_number: record.carer_secondary_whats_app_number,
            email: record.email_address,
            long_term_medication: record.long_term_medication,
            health_condition: record.health_condition,
            allergies: record.allergies,
            fit_to_fly: record.fit_to_fly_certificate,
            travelling_from: record.travelling_from,
            travelling_to: record.travelling_to,
            travel_start: record.travel_start_date,
            travel_end: record.travel_end_date,
            package_days: record.package_days,
            document_file_name: record.document_file_name,
            account_password: AccountPassword::default(),
        }
    }
}

/// Kind of value a registration field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Yes/no medical flag
    Flag,
    /// Package length in days
    Days,
    /// Optional free text
    OptionalText,
    /// Password
    Secret,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Flag => "a yes/no flag",
            FieldKind::Days => "a day count",
            FieldKind::OptionalText => "optional text",
            FieldKind::Secret => "a password",
        };
        f.write_str(name)
    }
}

/// A single field value read from or written to a draft
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Days(u32),
    /// Optional field with no value
    Absent,
    Secret(AccountPassword),
}

impl FieldValue {
    fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Flag(_) => "a flag",
            FieldValue::Days(_) => "a day count",
            FieldValue::Absent => "no value",
            FieldValue::Secret(_) => "a password",
        }
    }

    /// True for empty text, an absent value or a blank password
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Absent => true,
            FieldValue::Secret(p) => p.is_blank(),
            FieldValue::Flag(_) | FieldValue::Days(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Flag(true) => f.write_str("Yes"),
            FieldValue::Flag(false) => f.write_str("No"),
            FieldValue::Days(d) => write!(f, "{d}"),
            FieldValue::Absent => f.write_str("-"),
            FieldValue::Secret(p) if p.is_blank() => f.write_str("(not set)"),
            FieldValue::Secret(_) => f.write_str("********"),
        }
    }
}

/// Every field of the registration draft
///
/// Each field has a human label (the durable-storage key), an optional wire
/// name (the API field; `None` for draft-only fields) and a value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationField {
    FirstName,
    MiddleName,
    LastName,
    DateOfBirth,
    Gender,
    PrimaryNumber,
    CarerNumber,
    Email,
    LongTermMedication,
    HealthCondition,
    Allergies,
    FitToFly,
    TravellingFrom,
    TravellingTo,
    TravelStart,
    TravelEnd,
    PackageDays,
    DocumentFileName,
    AccountPassword,
}

impl RegistrationField {
    /// All fields in wizard order
    pub const ALL: [RegistrationField; 19] = [
        RegistrationField::FirstName,
        RegistrationField::MiddleName,
        RegistrationField::LastName,
        RegistrationField::DateOfBirth,
        RegistrationField::Gender,
        RegistrationField::PrimaryNumber,
        RegistrationField::CarerNumber,
        RegistrationField::Email,
        RegistrationField::LongTermMedication,
        RegistrationField::HealthCondition,
        RegistrationField::Allergies,
        RegistrationField::FitToFly,
        RegistrationField::TravellingFrom,
        RegistrationField::TravellingTo,
        RegistrationField::TravelStart,
        RegistrationField::TravelEnd,
        RegistrationField::PackageDays,
        RegistrationField::DocumentFileName,
        RegistrationField::AccountPassword,
    ];

    /// Human-readable label, also the durable-storage key
    pub fn label(self) -> &'static str {
        use RegistrationField as F;
        match self {
            F::FirstName => "First Name",
            F::MiddleName => "Middle Name",
            F::LastName => "Last Name",
            F::DateOfBirth => "Date of Birth",
            F::Gender => "Gender",
            F::PrimaryNumber => "Primary WhatsApp Number",
            F::CarerNumber => "Carer/Secondary WhatsApp Number",
            F::Email => "Email Address",
            F::LongTermMedication => {
                "Are you on any long-term/regular medication that we should be aware of?"
            }
            F::HealthCondition => "Do you have any health condition that can affect your trip?",
            F::Allergies => "Do you have any allergies that can affect your trip?",
            F::FitToFly => "Have you been advised to produce a fit-to-fly certificate?",
            F::TravellingFrom => "Travelling From",
            F::TravellingTo => "Travelling To (UK & Europe)",
            F::TravelStart => "Travel Start Date",
            F::TravelEnd => "Travel End Date",
            F::PackageDays => "Package Days",
            F::DocumentFileName => "Document File Name",
            F::AccountPassword => "Account Password",
        }
    }

    /// API field name, `None` for draft-only fields
    pub fn wire_name(self) -> Option<&'static str> {
        use RegistrationField as F;
        Some(match self {
            F::FirstName => "firstName",
            F::MiddleName => "middleName",
            F::LastName => "lastName",
            F::DateOfBirth => "dateOfBirth",
            F::Gender => "gender",
            F::PrimaryNumber => "primaryWhatsAppNumber",
            F::CarerNumber => "carerSecondaryWhatsAppNumber",
            F::Email => "emailAddress",
            F::LongTermMedication => "longTermMedication",
            F::HealthCondition => "healthCondition",
            F::Allergies => "allergies",
            F::FitToFly => "fitToFlyCertificate",
            F::TravellingFrom => "travellingFrom",
            F::TravellingTo => "travellingTo",
            F::TravelStart => "travelStartDate",
            F::TravelEnd => "travelEndDate",
            F::PackageDays => "packageDays",
            F::DocumentFileName => "documentFileName",
            F::AccountPassword => return None,
        })
    }

    /// Value kind held by the field
    pub fn kind(self) -> FieldKind {
        use RegistrationField as F;
        match self {
            F::LongTermMedication | F::HealthCondition | F::Allergies | F::FitToFly => {
                FieldKind::Flag
            }
            F::PackageDays => FieldKind::Days,
            F::DocumentFileName => FieldKind::OptionalText,
            F::AccountPassword => FieldKind::Secret,
            _ => FieldKind::Text,
        }
    }

    /// Looks a field up by its human label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(label))
    }

    /// Looks a field up by its API field name
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.wire_name() == Some(name.trim()))
    }

    /// Resolves a label, wire name or enum-style key
    pub fn lookup(key: &str) -> Option<Self> {
        Self::from_label(key).or_else(|| Self::from_wire_name(key)).or_else(|| {
            let wanted = key.trim().replace(['-', '_', ' '], "").to_ascii_lowercase();
            Self::ALL.into_iter().find(|f| {
                f.wire_name()
                    .map(|w| w.to_ascii_lowercase() == wanted)
                    .unwrap_or(false)
                    || format!("{f:?}").to_ascii_lowercase() == wanted
            })
        })
    }

    /// Parses user input into a value of this field's kind
    ///
    /// # Errors
    ///
    /// Returns a message when the input cannot be read as the field's kind.
    pub fn parse(self, raw: &str) -> Result<FieldValue, String> {
        match self.kind() {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::OptionalText => Ok(if raw.trim().is_empty() {
                FieldValue::Absent
            } else {
                FieldValue::Text(raw.trim().to_string())
            }),
            FieldKind::Secret => Ok(FieldValue::Secret(AccountPassword::new(raw))),
            FieldKind::Flag => match raw.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" => Ok(FieldValue::Flag(true)),
                "no" | "n" | "false" | "0" => Ok(FieldValue::Flag(false)),
                other => Err(format!("{}: expected yes or no, got '{other}'", self.label())),
            },
            FieldKind::Days => raw
                .trim()
                .parse::<u32>()
                .map(FieldValue::Days)
                .map_err(|_| format!("{}: expected a number of days, got '{raw}'", self.label())),
        }
    }
}

impl fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registration as exchanged with `/registrations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<RegistrationId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub middle_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(
        rename = "primaryWhatsAppNumber",
        default,
        deserialize_with = "null_as_default"
    )]
    pub primary_whats_app_number: String,
    #[serde(
        rename = "carerSecondaryWhatsAppNumber",
        default,
        deserialize_with = "null_as_default"
    )]
    pub carer_secondary_whats_app_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub long_term_medication: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub health_condition: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allergies: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fit_to_fly_certificate: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub travelling_from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub travelling_to: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub travel_start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub travel_end_date: String,
    #[serde(default = "default_package_days")]
    pub package_days: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub document_file_name: Option<String>,
}

fn default_package_days() -> u32 {
    PackageLength::default().days()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_draft() {
        let draft = RegistrationDraft::default();
        assert_eq!(draft.package_days, 7);
        assert_eq!(draft.package(), Some(PackageLength::Week));
        assert!(!draft.long_term_medication);
        assert!(!draft.fit_to_fly);
        assert!(draft.first_name.is_empty());
        assert!(draft.account_password.is_blank());
        assert!(draft.id.is_none());
    }

    #[test]
    fn test_draft_serializes_with_labels() {
        let mut draft = RegistrationDraft::default();
        draft.first_name = "Ada".to_string();
        draft.allergies = true;

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["First Name"], "Ada");
        assert_eq!(
            json["Do you have any allergies that can affect your trip?"],
            true
        );
        assert_eq!(json["Package Days"], 7);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_draft_parses_partial_json() {
        let draft: RegistrationDraft =
            serde_json::from_str(r#"{"First Name":"Ada","Package Days":14}"#).unwrap();
        assert_eq!(draft.first_name, "Ada");
        assert_eq!(draft.package(), Some(PackageLength::Fortnight));
        assert!(draft.last_name.is_empty());
    }

    #[test]
    fn test_draft_roundtrip_keeps_password() {
        let mut draft = RegistrationDraft::default();
        draft.account_password = AccountPassword::new("s3cret!");
        let json = serde_json::to_string(&draft).unwrap();
        let back: RegistrationDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draft);
        assert!(!format!("{back:?}").contains("s3cret!"));
    }

    #[test]
    fn test_mapping_table_is_bijective() {
        for field in RegistrationField::ALL {
            assert_eq!(RegistrationField::from_label(field.label()), Some(field));
            if let Some(wire) = field.wire_name() {
                assert_eq!(RegistrationField::from_wire_name(wire), Some(field));
            }
        }
        let wire_count = RegistrationField::ALL
            .iter()
            .filter(|f| f.wire_name().is_some())
            .count();
        assert_eq!(wire_count, 18);
    }

    #[test]
    fn test_mapping_table_matches_serde_names() {
        let mut draft = RegistrationDraft::default();
        draft.document_file_name = Some("ticket.pdf".to_string());
        let draft_json = serde_json::to_value(&draft).unwrap();
        let record_json = serde_json::to_value(draft.to_record()).unwrap();

        for field in RegistrationField::ALL {
            assert!(
                draft_json.get(field.label()).is_some(),
                "draft key missing: {}",
                field.label()
            );
            match field.wire_name() {
                Some(wire) => assert!(record_json.get(wire).is_some(), "wire key missing: {wire}"),
                None => assert!(record_json.get("accountPassword").is_none()),
            }
        }
    }

    #[test_case("First Name", RegistrationField::FirstName ; "label")]
    #[test_case("primaryWhatsAppNumber", RegistrationField::PrimaryNumber ; "wire name")]
    #[test_case("package-days", RegistrationField::PackageDays ; "kebab case")]
    #[test_case("fit_to_fly", RegistrationField::FitToFly ; "variant name")]
    #[test_case("email address", RegistrationField::Email ; "case insensitive label")]
    fn test_field_lookup(key: &str, expected: RegistrationField) {
        assert_eq!(RegistrationField::lookup(key), Some(expected));
    }

    #[test_case(RegistrationField::Allergies, "yes", FieldValue::Flag(true))]
    #[test_case(RegistrationField::Allergies, "No", FieldValue::Flag(false))]
    #[test_case(RegistrationField::PackageDays, "14", FieldValue::Days(14))]
    #[test_case(RegistrationField::Gender, "Female", FieldValue::Text("Female".to_string()))]
    #[test_case(RegistrationField::DocumentFileName, "  ", FieldValue::Absent)]
    fn test_field_parse(field: RegistrationField, raw: &str, expected: FieldValue) {
        assert_eq!(field.parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_field_parse_rejects_bad_input() {
        assert!(RegistrationField::Allergies.parse("maybe").is_err());
        assert!(RegistrationField::PackageDays.parse("two weeks").is_err());
    }

    #[test]
    fn test_set_and_get_fields() {
        let mut draft = RegistrationDraft::default();
        draft
            .set(RegistrationField::Email, FieldValue::Text("a@b.c".into()))
            .unwrap();
        draft
            .set(RegistrationField::HealthCondition, FieldValue::Flag(true))
            .unwrap();
        draft
            .set(RegistrationField::PackageDays, FieldValue::Days(30))
            .unwrap();

        assert_eq!(
            draft.get(RegistrationField::Email),
            FieldValue::Text("a@b.c".into())
        );
        assert!(draft.health_condition);
        assert_eq!(draft.package(), Some(PackageLength::Month));
    }

    #[test]
    fn test_set_rejects_kind_mismatch() {
        let mut draft = RegistrationDraft::default();
        let err = draft
            .set(RegistrationField::Allergies, FieldValue::Text("yes".into()))
            .unwrap_err();
        assert!(err.contains("yes/no"));
        assert!(draft
            .set(RegistrationField::FirstName, FieldValue::Flag(true))
            .is_err());
    }

    #[test]
    fn test_record_uses_wire_names_and_skips_password() {
        let mut draft = RegistrationDraft::default();
        draft.first_name = "Ada".into();
        draft.primary_number = "+447700900001".into();
        draft.package_days = 14;
        draft.account_password = AccountPassword::new("pw");

        let json = serde_json::to_value(draft.to_record()).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["primaryWhatsAppNumber"], "+447700900001");
        assert_eq!(json["packageDays"], 14);
        assert!(json.get("id").is_none());
        assert!(!json.to_string().contains("pw\""));
    }

    #[test]
    fn test_record_tolerates_nulls() {
        let record: RegistrationRecord = serde_json::from_str(
            r#"{"id":7,"firstName":"Ada","middleName":null,"allergies":null,"packageDays":30}"#,
        )
        .unwrap();
        assert_eq!(record.id.map(|i| i.get()), Some(7));
        assert_eq!(record.middle_name, "");
        assert!(!record.allergies);

        let draft = RegistrationDraft::from_record(record);
        assert_eq!(draft.first_name, "Ada");
        assert_eq!(draft.package(), Some(PackageLength::Month));
    }

    #[test]
    fn test_package_length_from_days() {
        assert_eq!(PackageLength::from_days(14), Some(PackageLength::Fortnight));
        assert_eq!(PackageLength::from_days(10), None);
    }
}
