//! Patient wire model.
//!
//! Field names travel in camelCase and enumerated values travel as their display strings
//! (`"In Treatment"`, `"General Ward"`), matching the patients resource.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error returned when a string does not name a legal option value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
}

// Case, spaces, hyphens and underscores are ignored so "general-ward" names General Ward.
fn normalise(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_option<T: Copy>(
    kind: &'static str,
    options: &[T],
    name: impl Fn(T) -> &'static str,
    value: &str,
) -> Result<T, ParseOptionError> {
    let wanted = normalise(value);
    options
        .iter()
        .copied()
        .find(|option| normalise(name(*option)) == wanted)
        .ok_or_else(|| ParseOptionError {
            kind,
            value: value.to_string(),
        })
}

// ============================================================================
// Enumerated fields
// ============================================================================

/// Where a patient currently is in their care pathway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum StatusTrack {
    Admission,
    #[serde(rename = "In Treatment")]
    InTreatment,
    Waiting,
    Discharged,
    Critical,
}

impl StatusTrack {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTrack::Admission => "Admission",
            StatusTrack::InTreatment => "In Treatment",
            StatusTrack::Waiting => "Waiting",
            StatusTrack::Discharged => "Discharged",
            StatusTrack::Critical => "Critical",
        }
    }
}

/// The five fixed departments of the board, in board order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Department {
    Emergency,
    #[serde(rename = "ICU")]
    Icu,
    #[serde(rename = "General Ward")]
    GeneralWard,
    Outpatient,
    Radiology,
}

impl Department {
    /// All departments in board order.
    pub const ALL: [Department; 5] = [
        Department::Emergency,
        Department::Icu,
        Department::GeneralWard,
        Department::Outpatient,
        Department::Radiology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Emergency => "Emergency",
            Department::Icu => "ICU",
            Department::GeneralWard => "General Ward",
            Department::Outpatient => "Outpatient",
            Department::Radiology => "Radiology",
        }
    }

    /// Position of this department on the board.
    pub fn index(self) -> usize {
        match self {
            Department::Emergency => 0,
            Department::Icu => 1,
            Department::GeneralWard => 2,
            Department::Outpatient => 3,
            Department::Radiology => 4,
        }
    }
}

/// Triage priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    Critical,
    Urgent,
    Standard,
    Routine,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::Urgent => "Urgent",
            Priority::Standard => "Standard",
            Priority::Routine => "Routine",
        }
    }
}

/// Legal status values, in form order.
pub const STATUS_OPTIONS: [StatusTrack; 5] = [
    StatusTrack::Admission,
    StatusTrack::InTreatment,
    StatusTrack::Waiting,
    StatusTrack::Discharged,
    StatusTrack::Critical,
];

/// Legal department values, in form order.
pub const DEPARTMENT_OPTIONS: [Department; 5] = Department::ALL;

/// Legal priority values, in form order.
pub const PRIORITY_OPTIONS: [Priority; 4] = [
    Priority::Critical,
    Priority::Urgent,
    Priority::Standard,
    Priority::Routine,
];

impl FromStr for StatusTrack {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option("status", &STATUS_OPTIONS, StatusTrack::as_str, s)
    }
}

impl FromStr for Department {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option("department", &DEPARTMENT_OPTIONS, Department::as_str, s)
    }
}

impl FromStr for Priority {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option("priority", &PRIORITY_OPTIONS, Priority::as_str, s)
    }
}

impl fmt::Display for StatusTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Server-assigned patient identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PatientId)
    }
}

/// A patient as stored by the patients resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    /// Medical record number.
    #[serde(default)]
    pub mrn: String,
    #[serde(default)]
    pub name: String,
    pub status_track: StatusTrack,
    pub department: Department,
    pub priority: Priority,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub nurse_name: String,
    /// ISO-8601 admission timestamp.
    #[serde(default)]
    pub admission_date: String,
    #[serde(default)]
    pub bed_number: String,
    /// Minutes spent waiting.
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub waiting_time: u32,
}

/// A patient that has not been stored yet and so carries no id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub mrn: String,
    pub name: String,
    pub status_track: StatusTrack,
    pub department: Department,
    pub priority: Priority,
    pub doctor_name: String,
    pub nurse_name: String,
    pub admission_date: String,
    pub bed_number: String,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    pub waiting_time: u32,
}

impl NewPatient {
    /// Attach a server-assigned id.
    pub fn with_id(self, id: PatientId) -> Patient {
        Patient {
            id,
            mrn: self.mrn,
            name: self.name,
            status_track: self.status_track,
            department: self.department,
            priority: self.priority,
            doctor_name: self.doctor_name,
            nurse_name: self.nurse_name,
            admission_date: self.admission_date,
            bed_number: self.bed_number,
            waiting_time: self.waiting_time,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMinutes {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

fn clamp_minutes(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

// Waiting time arrives as whatever the backend stored: null, fractions and numeric strings
// become whole minutes, anything unusable becomes 0.
fn deserialize_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawMinutes>::deserialize(deserializer)?;
    Ok(match raw {
        None => 0,
        Some(RawMinutes::Whole(n)) => u32::try_from(n).unwrap_or(u32::MAX),
        Some(RawMinutes::Fractional(f)) => clamp_minutes(f),
        Some(RawMinutes::Text(text)) => text.trim().parse::<f64>().map_or(0, clamp_minutes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_new_patient() -> NewPatient {
        NewPatient {
            mrn: "MRN482913".into(),
            name: "Amara Okafor".into(),
            status_track: StatusTrack::InTreatment,
            department: Department::GeneralWard,
            priority: Priority::Urgent,
            doctor_name: "Dr. Hale".into(),
            nurse_name: "Nurse Ruiz".into(),
            admission_date: "2024-03-01T08:30:00.000Z".into(),
            bed_number: "GW-04".into(),
            waiting_time: 15,
        }
    }

    #[test]
    fn test_patient_serialises_with_wire_names() {
        let patient = sample_new_patient().with_id(PatientId(7));
        let value = serde_json::to_value(&patient).expect("should serialise patient");

        assert_eq!(
            value,
            json!({
                "id": 7,
                "mrn": "MRN482913",
                "name": "Amara Okafor",
                "statusTrack": "In Treatment",
                "department": "General Ward",
                "priority": "Urgent",
                "doctorName": "Dr. Hale",
                "nurseName": "Nurse Ruiz",
                "admissionDate": "2024-03-01T08:30:00.000Z",
                "bedNumber": "GW-04",
                "waitingTime": 15
            })
        );
    }

    #[test]
    fn test_new_patient_has_no_id_and_waiting_time_defaults_to_zero() {
        let value = serde_json::to_value(sample_new_patient()).expect("should serialise");
        assert!(value.get("id").is_none());

        let mut without_wait = value;
        without_wait
            .as_object_mut()
            .expect("object")
            .remove("waitingTime");
        let parsed: NewPatient =
            serde_json::from_value(without_wait).expect("waitingTime should be optional");
        assert_eq!(parsed.waiting_time, 0);
    }

    #[test]
    fn test_unknown_department_is_rejected() {
        let mut value = serde_json::to_value(sample_new_patient().with_id(PatientId(1)))
            .expect("should serialise");
        value["department"] = json!("Cardiology");

        assert!(serde_json::from_value::<Patient>(value).is_err());
    }

    #[test]
    fn test_options_parse_leniently_from_display_names() {
        assert_eq!("General Ward".parse::<Department>(), Ok(Department::GeneralWard));
        assert_eq!("general-ward".parse::<Department>(), Ok(Department::GeneralWard));
        assert_eq!("icu".parse::<Department>(), Ok(Department::Icu));
        assert_eq!("in_treatment".parse::<StatusTrack>(), Ok(StatusTrack::InTreatment));
        assert_eq!("ROUTINE".parse::<Priority>(), Ok(Priority::Routine));

        let err = "Cardiology".parse::<Department>().expect_err("not a department");
        assert_eq!(err.to_string(), "unknown department 'Cardiology'");
    }

    #[test]
    fn test_department_order_matches_board() {
        for (position, department) in Department::ALL.iter().enumerate() {
            assert_eq!(department.index(), position);
        }
        assert_eq!(DEPARTMENT_OPTIONS[2].as_str(), "General Ward");
    }

    #[test]
    fn test_waiting_time_is_decoded_leniently() {
        let mut value = serde_json::to_value(sample_new_patient().with_id(PatientId(2)))
            .expect("should serialise");

        for (raw, expected) in [
            (json!(null), 0),
            (json!(12.5), 13),
            (json!(7.2), 7),
            (json!(-3), 0),
            (json!("20"), 20),
            (json!("soon"), 0),
        ] {
            value["waitingTime"] = raw.clone();
            let patient: Patient =
                serde_json::from_value(value.clone()).expect("waitingTime should not reject");
            assert_eq!(patient.waiting_time, expected, "waitingTime {raw}");
        }
    }

    #[test]
    fn test_missing_text_fields_default_to_empty() {
        let patient: Patient = serde_json::from_value(json!({
            "id": 5,
            "statusTrack": "Waiting",
            "department": "Radiology",
            "priority": "Routine"
        }))
        .expect("sparse record should decode");

        assert_eq!(patient.department, Department::Radiology);
        assert_eq!(patient.name, "");
        assert_eq!(patient.waiting_time, 0);
    }
}
