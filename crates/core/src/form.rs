//! Patient form validation and draft construction.
//!
//! A form is what a user fills in to create or edit a patient. Validation reports every missing
//! field at once. A validated form becomes either a [`NewPatient`] (with a generated MRN, the
//! current admission time and no waiting time) or an edit of an existing [`Patient`].

use crate::constants::{MRN_NUMBER_LIMIT, MRN_PREFIX};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use ward_directory::{Department, NewPatient, Patient, Priority, StatusTrack};
use ward_types::NonEmptyText;

/// A field of the patient form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FormField {
    Name,
    StatusTrack,
    Department,
    Priority,
    DoctorName,
    NurseName,
    BedNumber,
}

impl FormField {
    /// Label shown to the user.
    pub fn display_name(self) -> &'static str {
        match self {
            FormField::Name => "Patient Name",
            FormField::StatusTrack => "Status",
            FormField::Department => "Department",
            FormField::Priority => "Priority",
            FormField::DoctorName => "Doctor Name",
            FormField::NurseName => "Nurse Name",
            FormField::BedNumber => "Bed Number",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn describe(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|f| f.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The form has missing or invalid fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("please fill in: {}", describe(.invalid))]
pub struct FormError {
    /// Invalid fields in form order.
    pub invalid: Vec<FormField>,
}

/// Raw form input. Every field is required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub status_track: Option<StatusTrack>,
    pub department: Option<Department>,
    pub priority: Option<Priority>,
    pub doctor_name: String,
    pub nurse_name: String,
    pub bed_number: String,
}

impl PatientForm {
    /// A form for a new patient: Admission, Emergency, Standard, everything else blank.
    pub fn blank() -> Self {
        Self {
            status_track: Some(StatusTrack::Admission),
            department: Some(Department::Emergency),
            priority: Some(Priority::Standard),
            ..Self::default()
        }
    }

    /// A form pre-filled from an existing patient.
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            status_track: Some(patient.status_track),
            department: Some(patient.department),
            priority: Some(patient.priority),
            doctor_name: patient.doctor_name.clone(),
            nurse_name: patient.nurse_name.clone(),
            bed_number: patient.bed_number.clone(),
        }
    }

    pub fn validate(&self) -> Result<ValidatedForm, FormError> {
        let mut invalid = Vec::new();

        let name = required(&self.name, FormField::Name, &mut invalid);
        let status_track = selected(self.status_track, FormField::StatusTrack, &mut invalid);
        let department = selected(self.department, FormField::Department, &mut invalid);
        let priority = selected(self.priority, FormField::Priority, &mut invalid);
        let doctor_name = required(&self.doctor_name, FormField::DoctorName, &mut invalid);
        let nurse_name = required(&self.nurse_name, FormField::NurseName, &mut invalid);
        let bed_number = required(&self.bed_number, FormField::BedNumber, &mut invalid);

        match (
            name,
            status_track,
            department,
            priority,
            doctor_name,
            nurse_name,
            bed_number,
        ) {
            (
                Some(name),
                Some(status_track),
                Some(department),
                Some(priority),
                Some(doctor_name),
                Some(nurse_name),
                Some(bed_number),
            ) => Ok(ValidatedForm {
                name,
                status_track,
                department,
                priority,
                doctor_name,
                nurse_name,
                bed_number,
            }),
            _ => Err(FormError { invalid }),
        }
    }
}

fn required(value: &str, field: FormField, invalid: &mut Vec<FormField>) -> Option<NonEmptyText> {
    let text = NonEmptyText::new(value).ok();
    if text.is_none() {
        invalid.push(field);
    }
    text
}

fn selected<T>(value: Option<T>, field: FormField, invalid: &mut Vec<FormField>) -> Option<T> {
    if value.is_none() {
        invalid.push(field);
    }
    value
}

/// A form whose required fields are all present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedForm {
    pub name: NonEmptyText,
    pub status_track: StatusTrack,
    pub department: Department,
    pub priority: Priority,
    pub doctor_name: NonEmptyText,
    pub nurse_name: NonEmptyText,
    pub bed_number: NonEmptyText,
}

impl ValidatedForm {
    /// Build a new patient admitted now, with a random MRN.
    pub fn into_new_patient(self) -> NewPatient {
        self.into_new_patient_with(&mut rand::thread_rng(), Utc::now())
    }

    pub fn into_new_patient_with<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> NewPatient {
        NewPatient {
            mrn: generate_mrn(rng),
            name: self.name.into_string(),
            status_track: self.status_track,
            department: self.department,
            priority: self.priority,
            doctor_name: self.doctor_name.into_string(),
            nurse_name: self.nurse_name.into_string(),
            admission_date: admission_timestamp(now),
            bed_number: self.bed_number.into_string(),
            waiting_time: 0,
        }
    }

    /// Overlay the form onto `existing`. Id, MRN, admission date and waiting time are kept.
    pub fn apply_to(self, existing: &Patient) -> Patient {
        Patient {
            name: self.name.into_string(),
            status_track: self.status_track,
            department: self.department,
            priority: self.priority,
            doctor_name: self.doctor_name.into_string(),
            nurse_name: self.nurse_name.into_string(),
            bed_number: self.bed_number.into_string(),
            ..existing.clone()
        }
    }
}

/// `"MRN"` followed by a random number below one million, without padding. Not unique.
pub fn generate_mrn<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{MRN_PREFIX}{}", rng.gen_range(0..MRN_NUMBER_LIMIT))
}

/// UTC timestamp with millisecond precision and a `Z` suffix.
pub fn admission_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
