//! `reqwest` implementation of [`PatientDirectory`].

use crate::model::{Department, NewPatient, Patient, PatientId};
use crate::{DirectoryError, DirectoryResult, PatientDirectory};
use async_trait::async_trait;
use std::time::Duration;

/// Patients resource reached over HTTP.
///
/// `base_url` is the server root; requests go to `{base_url}/patients` and
/// `{base_url}/patients/{id}`.
#[derive(Clone, Debug)]
pub struct HttpPatientDirectory {
    patients_url: String,
    client: reqwest::Client,
}

impl HttpPatientDirectory {
    /// Create a client for the patients resource under `base_url`.
    ///
    /// `timeout` is handed to the transport; `None` leaves requests unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::InvalidConfig`] if `base_url` is blank and
    /// [`DirectoryError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> DirectoryResult<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(DirectoryError::InvalidConfig(
                "patients base URL cannot be empty".into(),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            patients_url: format!("{base}/patients"),
            client: builder.build()?,
        })
    }

    pub fn patients_url(&self) -> &str {
        &self.patients_url
    }

    fn patient_url(&self, id: PatientId) -> String {
        format!("{}/{}", self.patients_url, id)
    }
}

/// Read the body of a response, turning non-2xx statuses into [`DirectoryError::Status`].
async fn read_body(response: reqwest::Response) -> DirectoryResult<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DirectoryError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.text().await?)
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> DirectoryResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        DirectoryError::Decode {
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Decode a single patient body.
pub fn decode_patient(body: &str) -> DirectoryResult<Patient> {
    decode(body)
}

/// Decode a patient list body.
///
/// The body must be a JSON array. Records whose department is not one of the five known names
/// are dropped with a warning. Loose fields do not drop a record: missing text becomes empty and
/// `waitingTime` is coerced to whole minutes. A record in a known department can still be
/// unrepresentable (no usable id, status or priority); it is skipped and logged as an error.
pub fn decode_patient_list(body: &str) -> DirectoryResult<Vec<Patient>> {
    let records: Vec<serde_json::Value> = decode(body)?;
    let total = records.len();

    let patients: Vec<Patient> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let department = record.get("department").cloned();
            match serde_json::from_value::<Patient>(record) {
                Ok(patient) => Some(patient),
                Err(error) => {
                    let known = department
                        .and_then(|d| serde_json::from_value::<Department>(d).ok())
                        .is_some();
                    if known {
                        tracing::error!(index, %error, "patient record in a known department could not be decoded");
                    } else {
                        tracing::warn!(index, "dropping patient record outside the five departments");
                    }
                    None
                }
            }
        })
        .collect();

    if patients.len() < total {
        tracing::warn!(
            skipped = total - patients.len(),
            total,
            "patient list contained records that were dropped"
        );
    }

    Ok(patients)
}

#[async_trait]
impl PatientDirectory for HttpPatientDirectory {
    async fn list(&self) -> DirectoryResult<Vec<Patient>> {
        tracing::debug!(url = %self.patients_url, "listing patients");
        let response = self.client.get(&self.patients_url).send().await?;
        let body = read_body(response).await?;
        decode_patient_list(&body)
    }

    async fn update(&self, patient: &Patient) -> DirectoryResult<Patient> {
        tracing::debug!(id = %patient.id, "patching patient");
        let response = self
            .client
            .patch(self.patient_url(patient.id))
            .json(patient)
            .send()
            .await?;
        let body = read_body(response).await?;
        decode_patient(&body)
    }

    async fn create(&self, patient: &NewPatient) -> DirectoryResult<Patient> {
        tracing::debug!(mrn = %patient.mrn, "creating patient");
        let response = self
            .client
            .post(&self.patients_url)
            .json(patient)
            .send()
            .await?;
        let body = read_body(response).await?;
        decode_patient(&body)
    }

    async fn delete(&self, id: PatientId) -> DirectoryResult<()> {
        tracing::debug!(%id, "deleting patient");
        let response = self.client.delete(self.patient_url(id)).send().await?;
        read_body(response).await?;
        Ok(())
    }
}
