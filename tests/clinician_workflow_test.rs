//! Integration tests for the consultation → prescription → referral workflow
//!
//! The backend is a mockito server; fetched PDFs land in a memory blob store
//! so release accounting can be checked.

use godwit::adapters::api::{ApiGateway, HttpGateway};
use godwit::adapters::storage::{BlobStore, BlobUrl, MemoryBlobStore};
use godwit::config::ApiConfig;
use godwit::core::artifact::{ArtifactManager, ArtifactUrl};
use godwit::core::cancel::{CancelHandle, CancellationToken};
use godwit::core::workflow::{ConsultationWorkflow, FlowState, LatestPrescription};
use godwit::domain::{ConsultationId, FollowUp, GodwitError, Practitioner, PrimaryEffect};
use mockito::{Matcher, ServerGuard};
use std::sync::Arc;

const CONSULTATION: &str = r#"{
    "id": 12,
    "patientId": "P-77",
    "patient": {"firstName": "Ada", "lastName": "Lovelace", "dob": "1990-12-10"},
    "currentLocation": "Lisbon",
    "contactName": "Charles",
    "contactPhone": "+44 7700 900001",
    "answers": {"fever": "yes", "rash": "no"},
    "detailsByQuestion": {"fever": "Since Tuesday"},
    "status": "PENDING"
}"#;

struct Harness {
    workflow: ConsultationWorkflow,
    blobs: Arc<MemoryBlobStore>,
}

fn harness(server: &ServerGuard) -> Harness {
    let config = ApiConfig {
        base_url: format!("{}/api", server.url()),
        ..Default::default()
    };
    let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&config).unwrap());
    let blobs = Arc::new(MemoryBlobStore::new());
    let artifacts = ArtifactManager::new(gateway.clone(), blobs.clone());
    let practitioner = Practitioner {
        name: "Dr Grace Hopper".to_string(),
        registration: "GMC 1234567".to_string(),
        ..Default::default()
    };
    Harness {
        workflow: ConsultationWorkflow::new(
            ConsultationId::new(12).unwrap(),
            gateway,
            artifacts,
            practitioner,
        ),
        blobs,
    }
}

async fn mock_consultation(server: &mut ServerGuard) {
    server
        .mock("GET", "/api/doctor/consultations/12")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CONSULTATION)
        .create_async()
        .await;
    server
        .mock("GET", "/api/doctor/consultations/12/prescriptions/latest")
        .with_status(204)
        .create_async()
        .await;
}

fn blob_of(url: &ArtifactUrl) -> BlobUrl {
    match url {
        ArtifactUrl::Blob(blob) => blob.clone(),
        other => panic!("expected a local blob, got {other}"),
    }
}

#[tokio::test]
async fn test_load_prefills_referral_and_tolerates_missing_prescription() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;

    let mut h = harness(&server);
    let consultation = h.workflow.load(&CancellationToken::never()).await.unwrap();
    assert_eq!(consultation.patient_name().as_deref(), Some("Ada Lovelace"));

    assert_eq!(h.workflow.latest_prescription(), Some(&LatestPrescription::None));
    let letter = &h.workflow.referral_draft().body;
    assert!(letter.contains("Ada Lovelace"));
    assert!(letter.contains("Dr Grace Hopper"));
}

#[tokio::test]
async fn test_load_failure_moves_view_to_load_failed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/doctor/consultations/12")
        .with_status(404)
        .create_async()
        .await;

    let mut h = harness(&server);
    let err = h.workflow.load(&CancellationToken::never()).await.unwrap_err();
    assert!(matches!(err, GodwitError::Http(ref e) if e.status == 404));
    assert!(h.workflow.consultation().is_none());
}

#[tokio::test]
async fn test_invalid_prescription_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    let create = server
        .mock("POST", "/api/doctor/consultations/12/prescriptions")
        .expect(0)
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();

    let err = h.workflow.submit_prescription(&token).await.unwrap_err();
    match err {
        GodwitError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["Diagnosis", "Medicines"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(h.workflow.prescription_state(), &FlowState::Composing);
    create.assert_async().await;
}

#[tokio::test]
async fn test_prescription_pdf_failure_is_partial_success_then_retry_succeeds() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    let create = server
        .mock("POST", "/api/doctor/consultations/12/prescriptions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "diagnosis": "Traveller's diarrhoea",
            "medicines": ["Loperamide 2mg"]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":42}"#)
        .expect(1)
        .create_async()
        .await;
    let broken_pdf = server
        .mock("GET", "/api/doctor/prescriptions/42/pdf")
        .with_status(500)
        .with_body("renderer down")
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();
    {
        let draft = h.workflow.prescription_draft_mut();
        draft.diagnosis = " Traveller's diarrhoea ".to_string();
        draft.set_medicine(0, "Loperamide 2mg");
        draft.add_medicine();
    }

    let err = h.workflow.submit_prescription(&token).await.unwrap_err();
    match err {
        GodwitError::PartialSuccess(partial) => {
            assert_eq!(partial.primary_id(), 42);
            assert!(matches!(partial.effect, PrimaryEffect::PrescriptionCreated(_)));
            assert_eq!(partial.follow_up, FollowUp::PrescriptionPdf);
        }
        other => panic!("expected partial success, got {other:?}"),
    }
    assert_eq!(h.workflow.prescription_state().retryable_id(), Some(42));
    assert_eq!(h.workflow.created_prescription().map(|id| id.get()), Some(42));
    assert!(h
        .workflow
        .prescription_state()
        .message()
        .unwrap_or_default()
        .contains("#42"));

    broken_pdf.remove_async().await;
    server
        .mock("GET", "/api/doctor/prescriptions/42/pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4 prescription")
        .create_async()
        .await;

    let url = h.workflow.retry_prescription_pdf(&token).await.unwrap();
    let blob = blob_of(&url);
    assert_eq!(h.workflow.prescription_state(), &FlowState::Succeeded(url));
    assert_eq!(
        h.blobs.get(&blob).map(|(_, bytes)| bytes),
        Some(b"%PDF-1.4 prescription".to_vec())
    );

    // Only the fetch was retried
    create.assert_async().await;
}

#[tokio::test]
async fn test_prescription_blob_released_exactly_once() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/prescriptions")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":42}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/doctor/prescriptions/42/pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4")
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();
    h.workflow.prescription_draft_mut().diagnosis = "Sunburn".to_string();
    h.workflow.prescription_draft_mut().set_medicine(0, "Aloe gel");

    let first = blob_of(&h.workflow.submit_prescription(&token).await.unwrap());
    let second = blob_of(&h.workflow.retry_prescription_pdf(&token).await.unwrap());
    assert_ne!(first, second);
    assert_eq!(h.blobs.release_count(&first), 1);
    assert_eq!(h.blobs.release_count(&second), 0);

    let blobs = h.blobs.clone();
    drop(h);
    assert_eq!(blobs.release_count(&first), 1);
    assert_eq!(blobs.release_count(&second), 1);
    assert_eq!(blobs.live_count(), 0);
}

#[tokio::test]
async fn test_taken_artifacts_are_not_released_by_workflow() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/prescriptions")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":42}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/doctor/prescriptions/42/pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4")
        .create_async()
        .await;
    server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .with_status(201)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.7 referral")
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();
    h.workflow.prescription_draft_mut().diagnosis = "Sunburn".to_string();
    h.workflow.prescription_draft_mut().set_medicine(0, "Aloe gel");

    let prescription = h.workflow.submit_prescription(&token).await.unwrap();
    let referral = h.workflow.submit_referral(&token).await.unwrap();
    assert_eq!(h.workflow.take_prescription_artifact(), Some(prescription.clone()));
    assert_eq!(h.workflow.take_referral_artifact(), Some(referral.clone()));
    assert_eq!(h.workflow.take_prescription_artifact(), None);

    let blobs = h.blobs.clone();
    drop(h);
    assert_eq!(blobs.release_count(&blob_of(&prescription)), 0);
    assert_eq!(blobs.release_count(&blob_of(&referral)), 0);
    assert_eq!(blobs.live_count(), 2);
}

#[tokio::test]
async fn test_cancelled_prescription_discards_result() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/prescriptions")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":42}"#)
        .create_async()
        .await;
    let pdf = server
        .mock("GET", "/api/doctor/prescriptions/42/pdf")
        .expect(0)
        .create_async()
        .await;

    let mut h = harness(&server);
    h.workflow.load(&CancellationToken::never()).await.unwrap();
    h.workflow.prescription_draft_mut().diagnosis = "Sunburn".to_string();
    h.workflow.prescription_draft_mut().set_medicine(0, "Aloe gel");

    let handle = CancelHandle::new();
    let token = handle.token();
    handle.cancel();

    let err = h.workflow.submit_prescription(&token).await.unwrap_err();
    assert!(matches!(err, GodwitError::Cancelled));
    assert_eq!(h.workflow.created_prescription(), None);
    assert_eq!(h.blobs.created_count(), 0);
    pdf.assert_async().await;
}

#[tokio::test]
async fn test_referral_pdf_stream_becomes_blob() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .match_body(Matcher::Regex("paragraph".to_string()))
        .with_status(201)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.7 referral")
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();

    let url = h.workflow.submit_referral(&token).await.unwrap();
    assert!(url.is_blob());
    assert_eq!(h.workflow.referral_state(), &FlowState::Succeeded(url));
    assert_eq!(h.blobs.created_count(), 1);
}

#[tokio::test]
async fn test_referral_pdf_url_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":3,"pdfUrl":"/api/referrals/3/pdf"}"#)
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();

    let url = h.workflow.submit_referral(&token).await.unwrap();
    assert_eq!(
        url,
        ArtifactUrl::Remote(format!("{}/api/referrals/3/pdf", server.url()))
    );
    assert_eq!(h.blobs.created_count(), 0);
}

#[tokio::test]
async fn test_referral_id_only_fetches_pdf() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":5}"#)
        .create_async()
        .await;
    let pdf = server
        .mock("GET", "/api/doctor/referrals/5/pdf")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.7")
        .expect(1)
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();

    let url = h.workflow.submit_referral(&token).await.unwrap();
    assert!(url.is_blob());
    assert_eq!(h.workflow.created_referral().map(|id| id.get()), Some(5));
    pdf.assert_async().await;
}

#[tokio::test]
async fn test_referral_id_only_with_failed_fetch_is_partial_success() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":5}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/doctor/referrals/5/pdf")
        .with_status(503)
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();

    let err = h.workflow.submit_referral(&token).await.unwrap_err();
    assert!(matches!(
        err,
        GodwitError::PartialSuccess(ref partial) if partial.follow_up == FollowUp::ReferralPdf
    ));
    assert_eq!(h.workflow.referral_state().retryable_id(), Some(5));
}

#[tokio::test]
async fn test_referral_without_pdf_or_id_fails() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();

    let err = h.workflow.submit_referral(&token).await.unwrap_err();
    assert!(matches!(err, GodwitError::InvalidResponse(_)));
    assert!(matches!(h.workflow.referral_state(), FlowState::Failed { .. }));
    assert_eq!(h.workflow.created_referral(), None);
}

#[tokio::test]
async fn test_blank_referral_is_rejected_locally() {
    let mut server = mockito::Server::new_async().await;
    mock_consultation(&mut server).await;
    let create = server
        .mock("POST", "/api/doctor/consultations/12/referrals")
        .expect(0)
        .create_async()
        .await;

    let mut h = harness(&server);
    let token = CancellationToken::never();
    h.workflow.load(&token).await.unwrap();
    h.workflow.referral_draft_mut().body = "   ".to_string();

    let err = h.workflow.submit_referral(&token).await.unwrap_err();
    assert!(matches!(err, GodwitError::Validation(_)));
    create.assert_async().await;
}
