//! In-memory patient store with json-server style semantics.

use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use ward_directory::{NewPatient, Patient, PatientId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("patient {0} not found")]
    NotFound(PatientId),
    #[error("invalid patient at {path}: {message}")]
    Invalid { path: String, message: String },
    #[error("failed to read seed file: {0}")]
    SeedRead(#[source] std::io::Error),
    #[error("failed to parse seed file at {path}: {message}")]
    SeedParse { path: String, message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Seed file layout: `{ "patients": [ ... ] }`.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    patients: Vec<Patient>,
}

fn error_path(path: &serde_path_to_error::Path) -> String {
    let path = path.to_string();
    if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    }
}

/// Shared, ordered patient collection.
#[derive(Clone, Debug, Default)]
pub struct PatientStore {
    patients: Arc<RwLock<Vec<Patient>>>,
}

impl PatientStore {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients: Arc::new(RwLock::new(patients)),
        }
    }

    /// Load a store from a seed file.
    pub fn from_seed_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(StoreError::SeedRead)?;
        Self::from_seed_str(&raw)
    }

    pub fn from_seed_str(raw: &str) -> StoreResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let seed: SeedFile =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
                StoreError::SeedParse {
                    path: error_path(err.path()),
                    message: err.into_inner().to_string(),
                }
            })?;
        Ok(Self::new(seed.patients))
    }

    pub fn list(&self) -> Vec<Patient> {
        self.patients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.patients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `patient` under the next id (one past the largest in use).
    pub fn create(&self, patient: NewPatient) -> Patient {
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        let next = patients.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        let stored = patient.with_id(PatientId(next));
        patients.push(stored.clone());
        stored
    }

    /// Merge the fields of `patch` into the stored patient.
    ///
    /// The id is always taken from `id`, never from the body. The merged result must still be a
    /// valid patient.
    pub fn merge(&self, id: PatientId, patch: serde_json::Value) -> StoreResult<Patient> {
        let serde_json::Value::Object(fields) = patch else {
            return Err(StoreError::Invalid {
                path: "<root>".into(),
                message: "patch body must be a JSON object".into(),
            });
        };

        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        let slot = patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let mut merged = serde_json::to_value(&*slot).map_err(|err| StoreError::Invalid {
            path: "<root>".into(),
            message: err.to_string(),
        })?;
        if let serde_json::Value::Object(target) = &mut merged {
            target.extend(fields);
            target.insert("id".into(), serde_json::Value::from(id.0));
        }

        let updated: Patient =
            serde_path_to_error::deserialize(merged).map_err(|err| StoreError::Invalid {
                path: error_path(err.path()),
                message: err.into_inner().to_string(),
            })?;
        *slot = updated.clone();
        Ok(updated)
    }

    pub fn delete(&self, id: PatientId) -> StoreResult<Patient> {
        let mut patients = self.patients.write().unwrap_or_else(PoisonError::into_inner);
        let index = patients
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(patients.remove(index))
    }
}
