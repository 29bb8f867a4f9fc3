//! Drives the coordinator against the development backend over real HTTP.

use api_rest::{router, PatientStore};
use axum::http::header;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use ward_core::{CoreConfig, DepartmentCoordinator, MoveFailurePolicy, MoveIntent, PatientForm};
use ward_directory::{Department, HttpPatientDirectory, PatientId, Priority};

const SEED: &str = r#"{"patients": [
    {"id": 1, "mrn": "MRN1", "name": "Ada", "statusTrack": "Waiting",
     "department": "Emergency", "priority": "Critical", "doctorName": "Dr. A",
     "nurseName": "N. A", "admissionDate": "2024-01-01T00:00:00.000Z",
     "bedNumber": "E-1", "waitingTime": 30},
    {"id": 2, "mrn": "MRN2", "name": "Ben", "statusTrack": "Admission",
     "department": "Emergency", "priority": "Standard", "doctorName": "Dr. B",
     "nurseName": "N. B", "admissionDate": "2024-01-01T00:00:00.000Z",
     "bedNumber": "E-2", "waitingTime": 10},
    {"id": 3, "mrn": "MRN3", "name": "Cleo", "statusTrack": "In Treatment",
     "department": "ICU", "priority": "Urgent", "doctorName": "Dr. C",
     "nurseName": "N. C", "admissionDate": "2024-01-01T00:00:00.000Z",
     "bedNumber": "I-1", "waitingTime": 0}
]}"#;

async fn serve(store: PatientStore) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(store))
            .await
            .expect("server should run");
    });
    format!("http://{addr}")
}

async fn coordinator(
    store: PatientStore,
    policy: MoveFailurePolicy,
) -> DepartmentCoordinator<HttpPatientDirectory> {
    let base_url = serve(store).await;
    let cfg = Arc::new(
        CoreConfig::new(base_url)
            .expect("config")
            .with_request_timeout(Some(Duration::from_secs(5)))
            .with_move_failure_policy(policy),
    );
    let directory =
        HttpPatientDirectory::new(cfg.api_base_url(), cfg.request_timeout()).expect("client");
    DepartmentCoordinator::new(directory, cfg)
}

#[tokio::test]
async fn test_load_create_move_delete_round_trip() {
    let store = PatientStore::from_seed_str(SEED).expect("seed");
    let coordinator = coordinator(store.clone(), MoveFailurePolicy::Keep).await;

    assert_eq!(coordinator.load().await.expect("load"), 3);
    assert_eq!(coordinator.board().bucket(Department::Emergency).len(), 2);

    let form = PatientForm {
        name: "Dev Patel".into(),
        department: Some(Department::Icu),
        priority: Some(Priority::Urgent),
        doctor_name: "Dr. D".into(),
        nurse_name: "N. D".into(),
        bed_number: "I-2".into(),
        ..PatientForm::blank()
    };
    let draft = form.validate().expect("form").into_new_patient();
    let created = coordinator.create_patient(draft).await.expect("create");
    assert_eq!(created.id, PatientId(4));
    assert_eq!(coordinator.board().bucket(Department::Icu).len(), 2);

    let moved = coordinator
        .move_patient(MoveIntent::new(
            PatientId(1),
            Department::Emergency,
            Department::Radiology,
            0,
        ))
        .await
        .expect("move")
        .expect("move should not be a no-op");
    assert_eq!(moved.department, Department::Radiology);
    assert_eq!(store.list()[0].department, Department::Radiology);

    coordinator.delete_patient(PatientId(2)).await.expect("delete");
    assert!(coordinator.board().bucket(Department::Emergency).is_empty());

    // A fresh load agrees with what the coordinator holds.
    let before = coordinator.board();
    coordinator.load().await.expect("reload");
    assert_eq!(coordinator.board(), before);
    assert!(coordinator.board().is_consistent());
}

#[tokio::test]
async fn test_load_drops_only_unknown_departments() {
    const MIXED: &str = r#"[
        {"id": 1, "mrn": "MRN1", "name": "Ada", "statusTrack": "Waiting",
         "department": "ICU", "priority": "Critical", "waitingTime": null},
        {"id": 2, "mrn": "MRN2", "name": "Ben", "statusTrack": "Admission",
         "department": "Cardiology", "priority": "Routine", "waitingTime": 5},
        {"id": 3, "mrn": "MRN3", "name": "Cleo", "statusTrack": "In Treatment",
         "department": "Outpatient", "priority": "Urgent", "waitingTime": 12.5}
    ]"#;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().route(
        "/patients",
        get(|| async { ([(header::CONTENT_TYPE, "application/json")], MIXED) }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });

    let cfg = Arc::new(CoreConfig::new(format!("http://{addr}")).expect("config"));
    let directory =
        HttpPatientDirectory::new(cfg.api_base_url(), cfg.request_timeout()).expect("client");
    let coordinator = DepartmentCoordinator::new(directory, cfg);

    assert_eq!(coordinator.load().await.expect("load"), 2);
    let board = coordinator.board();
    assert_eq!(board.bucket(Department::Icu).len(), 1);
    assert_eq!(board.bucket(Department::Outpatient).len(), 1);
    assert_eq!(board.find(PatientId(3)).map(|p| p.waiting_time), Some(13));
    assert!(board.locate(PatientId(2)).is_none());
    assert!(board.is_consistent());
}

#[tokio::test]
async fn test_delete_of_unknown_patient_surfaces_error() {
    let store = PatientStore::from_seed_str(SEED).expect("seed");
    let coordinator = coordinator(store, MoveFailurePolicy::Keep).await;
    coordinator.load().await.expect("load");

    let err = coordinator
        .delete_patient(PatientId(7))
        .await
        .expect_err("delete should fail");

    assert!(err.directory_error().is_not_found());
    assert_eq!(coordinator.error().as_deref(), Some("Failed to delete patient"));
    assert_eq!(coordinator.total_patients(), 3);
}

#[tokio::test]
async fn test_move_of_patient_deleted_elsewhere_rolls_back() {
    let store = PatientStore::from_seed_str(SEED).expect("seed");
    let coordinator = coordinator(store.clone(), MoveFailurePolicy::Rollback).await;
    coordinator.load().await.expect("load");
    let before = coordinator.board();

    store.delete(PatientId(3)).expect("delete behind the board's back");
    let err = coordinator
        .move_patient(MoveIntent::new(
            PatientId(3),
            Department::Icu,
            Department::Outpatient,
            0,
        ))
        .await
        .expect_err("move should fail");

    assert!(err.directory_error().is_not_found());
    assert_eq!(coordinator.board(), before);
    assert_eq!(coordinator.error().as_deref(), Some("Failed to update patient"));
}
