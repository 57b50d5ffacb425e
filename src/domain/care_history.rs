//! Patient care history (`GET /care-history/mine`)

use super::consultation::{lenient_date, lenient_patient_ref};
use super::ids::{ConsultationId, PatientRef};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareHistoryPatient {
    pub name: String,
    #[serde(deserialize_with = "lenient_patient_ref")]
    pub patient_id: Option<PatientRef>,
    #[serde(deserialize_with = "lenient_date")]
    pub dob: Option<NaiveDate>,
}

/// One consultation that produced a prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareHistoryItem {
    pub consultation_id: ConsultationId,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_travelling_to: String,
    #[serde(default)]
    pub presenting_complaint: String,
    #[serde(default)]
    pub diagnosis: String,
    /// Newline-separated medicine lines
    #[serde(default)]
    pub medicines: String,
    #[serde(default)]
    pub recommendations: String,
}

impl CareHistoryItem {
    /// Medicine lines, blanks removed
    pub fn medicine_lines(&self) -> Vec<&str> {
        self.medicines
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareHistory {
    pub patient: CareHistoryPatient,
    pub items: Vec<CareHistoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_care_history_parses() {
        let history: CareHistory = serde_json::from_str(
            r#"{
                "patient": {"name": "Ada", "patientId": 12345, "dob": ""},
                "items": [{
                    "consultationId": 4,
                    "date": "2025-01-05T12:00:00Z",
                    "locationTravellingTo": "Madrid",
                    "presentingComplaint": "Sore throat",
                    "diagnosis": "Pharyngitis",
                    "medicines": "Penicillin V 500mg\n\n Lozenges "
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(history.patient.patient_id.as_ref().map(|p| p.as_str()), Some("12345"));
        assert!(history.patient.dob.is_none());
        assert_eq!(history.items.len(), 1);
        assert_eq!(
            history.items[0].medicine_lines(),
            vec!["Penicillin V 500mg", "Lozenges"]
        );
        assert_eq!(history.items[0].recommendations, "");
    }
}
