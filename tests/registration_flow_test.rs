//! Integration tests for the registration wizard
//!
//! Covers the write-through draft, submission with and without a document,
//! and the partial success left behind by a failed upload.

use godwit::adapters::api::{ApiGateway, HttpGateway};
use godwit::adapters::storage::{FileStore, KeyValueStore, MemoryBlobStore, MemoryStore};
use godwit::config::ApiConfig;
use godwit::core::artifact::ArtifactManager;
use godwit::core::cancel::{CancelHandle, CancellationToken};
use godwit::core::draft::{DraftStore, RegistrationWizard, WizardStep, DRAFT_KEY};
use godwit::core::session::SessionProvider;
use godwit::domain::{
    DocumentUpload, FieldValue, FollowUp, GodwitError, RegistrationDraft, RegistrationField,
};
use mockito::{Matcher, ServerGuard};
use std::sync::Arc;

const PATIENT: &str =
    r#"{"id":9,"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","roles":["USER"]}"#;

fn new_wizard(server: &ServerGuard, store: Arc<dyn KeyValueStore>) -> RegistrationWizard {
    let config = ApiConfig {
        base_url: format!("{}/api", server.url()),
        ..Default::default()
    };
    let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&config).unwrap());
    let artifacts = ArtifactManager::new(gateway.clone(), Arc::new(MemoryBlobStore::new()));
    let session = Arc::new(SessionProvider::new(gateway.clone(), store.clone()));
    RegistrationWizard::new(
        Arc::new(DraftStore::load(store)),
        gateway,
        artifacts,
        session,
    )
}

fn fill_personal(drafts: &DraftStore) {
    let text = [
        (RegistrationField::FirstName, "Ada"),
        (RegistrationField::LastName, "Lovelace"),
        (RegistrationField::DateOfBirth, "1990-12-10"),
        (RegistrationField::Gender, "Female"),
        (RegistrationField::PrimaryNumber, "+447700900001"),
        (RegistrationField::CarerNumber, "+447700900002"),
        (RegistrationField::Email, "ada@example.com"),
        (RegistrationField::AccountPassword, "s3cret"),
    ];
    for (field, raw) in text {
        let value = field.parse(raw).unwrap();
        drafts.set_field(field, value).unwrap();
    }
}

fn toggle_medical_flags(drafts: &DraftStore) {
    for flag in [
        RegistrationField::LongTermMedication,
        RegistrationField::HealthCondition,
        RegistrationField::Allergies,
        RegistrationField::FitToFly,
    ] {
        drafts.set_field(flag, FieldValue::Flag(true)).unwrap();
    }
}

fn choose_package(drafts: &DraftStore) {
    drafts
        .set_field(RegistrationField::PackageDays, FieldValue::Days(14))
        .unwrap();
}

fn fill(drafts: &DraftStore) {
    fill_personal(drafts);
    toggle_medical_flags(drafts);
    choose_package(drafts);
}

async fn mock_account(server: &mut ServerGuard) {
    server
        .mock("POST", "/api/auth/register")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "ada@example.com",
            "username": "+447700900001"
        })))
        .with_status(201)
        .create_async()
        .await;
    server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::UrlEncoded("email".into(), "ada@example.com".into()))
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/api/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PATIENT)
        .create_async()
        .await;
}

#[tokio::test]
async fn test_empty_draft_cannot_advance() {
    let server = mockito::Server::new_async().await;
    let mut wizard = new_wizard(&server, Arc::new(MemoryStore::new()));

    let err = wizard.advance().unwrap_err();
    match err {
        GodwitError::Validation(errors) => assert_eq!(errors.len(), 8),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(wizard.step(), WizardStep::Personal);
}

#[tokio::test]
async fn test_submit_without_document() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/api/registrations")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "firstName": "Ada",
            "packageDays": 14,
            "longTermMedication": true,
            "healthCondition": true,
            "allergies": true,
            "fitToFlyCertificate": true
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":7,"firstName":"Ada","packageDays":14}"#)
        .expect(1)
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/api/registrations/7/document")
        .expect(0)
        .create_async()
        .await;
    mock_account(&mut server).await;

    let store = Arc::new(MemoryStore::new());
    let mut wizard = new_wizard(&server, store.clone());
    fill_personal(wizard.drafts());
    assert_eq!(wizard.advance().unwrap(), WizardStep::Medical);
    toggle_medical_flags(wizard.drafts());
    assert_eq!(wizard.advance().unwrap(), WizardStep::Package);
    choose_package(wizard.drafts());

    let outcome = wizard
        .submit(None, &CancellationToken::never())
        .await
        .unwrap();
    assert_eq!(outcome.registration_id.get(), 7);
    assert!(outcome.document.is_none());
    assert_eq!(
        outcome.signed_in.map(|identity| identity.display_name()),
        Some("Ada Lovelace".to_string())
    );

    assert!(store.snapshot(DRAFT_KEY).is_none());
    assert_eq!(wizard.drafts().get_draft(), RegistrationDraft::default());
    assert_eq!(wizard.step(), WizardStep::Personal);
    create.assert_async().await;
    upload.assert_async().await;
}

#[test]
fn test_password_never_reaches_registration_record() {
    let drafts = DraftStore::load(Arc::new(MemoryStore::new()));
    fill(&drafts);

    let record = serde_json::to_string(&drafts.get_draft().to_record()).unwrap();
    assert!(!record.contains("s3cret"));
    assert!(!record.to_lowercase().contains("password"));
}

#[tokio::test]
async fn test_failed_upload_keeps_draft_then_retry_completes() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/api/registrations")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "documentFileName": "ticket.pdf"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":7}"#)
        .expect(1)
        .create_async()
        .await;
    let rejected = server
        .mock("POST", "/api/registrations/7/document")
        .with_status(413)
        .with_body("File too large")
        .create_async()
        .await;
    mock_account(&mut server).await;

    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let mut wizard = new_wizard(&server, store.clone());
    fill(wizard.drafts());

    let token = CancellationToken::never();
    let document = DocumentUpload::new("ticket.pdf", b"%PDF-1.4".to_vec());
    let err = wizard.submit(Some(document.clone()), &token).await.unwrap_err();
    match err {
        GodwitError::PartialSuccess(partial) => {
            assert_eq!(partial.primary_id(), 7);
            assert_eq!(partial.follow_up, FollowUp::DocumentUpload);
            assert!(matches!(*partial.cause, GodwitError::Upload(_)));
        }
        other => panic!("expected partial success, got {other:?}"),
    }

    // The saved id survives a restart
    let reloaded = DraftStore::load(store.clone()).get_draft();
    assert_eq!(reloaded.id.map(|id| id.get()), Some(7));
    assert_eq!(reloaded.document_file_name.as_deref(), Some("ticket.pdf"));

    rejected.remove_async().await;
    server
        .mock("POST", "/api/registrations/7/document")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":3,"fileName":"ticket.pdf","sizeBytes":8}"#)
        .create_async()
        .await;

    let mut resumed = new_wizard(&server, store.clone());
    let outcome = resumed.retry_document_upload(document, &token).await.unwrap();
    assert_eq!(outcome.registration_id.get(), 7);
    assert_eq!(outcome.document.map(|doc| doc.id.get()), Some(3));
    assert!(store.get(DRAFT_KEY).unwrap().is_none());

    // The record was created once
    create.assert_async().await;
}

#[tokio::test]
async fn test_retry_upload_without_saved_record_is_validation_error() {
    let server = mockito::Server::new_async().await;
    let mut wizard = new_wizard(&server, Arc::new(MemoryStore::new()));

    let err = wizard
        .retry_document_upload(
            DocumentUpload::new("ticket.pdf", b"%PDF".to_vec()),
            &CancellationToken::never(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GodwitError::Validation(_)));
}

#[tokio::test]
async fn test_failed_write_leaves_memory_and_storage_in_agreement() {
    let store = Arc::new(MemoryStore::new());
    let drafts = DraftStore::load(store.clone());
    drafts
        .set_field(RegistrationField::FirstName, FieldValue::Text("Ada".into()))
        .unwrap();

    store.fail_writes(true);
    let err = drafts
        .set_field(RegistrationField::FirstName, FieldValue::Text("Grace".into()))
        .unwrap_err();
    assert!(matches!(err, GodwitError::Storage(_)));

    assert_eq!(drafts.get_draft().first_name, "Ada");
    let persisted: RegistrationDraft =
        serde_json::from_str(&store.snapshot(DRAFT_KEY).unwrap()).unwrap();
    assert_eq!(persisted.first_name, "Ada");
}

#[tokio::test]
async fn test_registration_server_error_keeps_draft() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/registrations")
        .with_status(500)
        .with_body("database unavailable")
        .create_async()
        .await;
    let account = server
        .mock("POST", "/api/auth/register")
        .expect(0)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut wizard = new_wizard(&server, store.clone());
    fill(wizard.drafts());

    let err = wizard
        .submit(None, &CancellationToken::never())
        .await
        .unwrap_err();
    assert!(matches!(err, GodwitError::Http(ref e) if e.status == 500));
    assert_eq!(wizard.drafts().get_draft().first_name, "Ada");
    assert!(wizard.drafts().get_draft().id.is_none());
    assert!(store.snapshot(DRAFT_KEY).is_some());
    account.assert_async().await;
}

#[tokio::test]
async fn test_cancelled_submit_keeps_saved_registration_id() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/api/registrations")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":7}"#)
        .expect(1)
        .create_async()
        .await;
    let account = server
        .mock("POST", "/api/auth/register")
        .expect(0)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut wizard = new_wizard(&server, store.clone());
    fill(wizard.drafts());

    let handle = CancelHandle::new();
    handle.cancel();
    let err = wizard.submit(None, &handle.token()).await.unwrap_err();
    assert!(matches!(err, GodwitError::Cancelled));

    assert_eq!(wizard.drafts().get_draft().id.map(|id| id.get()), Some(7));
    let persisted: RegistrationDraft =
        serde_json::from_str(&store.snapshot(DRAFT_KEY).unwrap()).unwrap();
    assert_eq!(persisted.id.map(|id| id.get()), Some(7));

    create.assert_async().await;
    account.assert_async().await;
}

#[tokio::test]
async fn test_resubmit_after_cancel_carries_saved_id() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("POST", "/api/registrations")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":7}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut wizard = new_wizard(&server, store.clone());
    fill(wizard.drafts());

    let handle = CancelHandle::new();
    handle.cancel();
    assert!(wizard.submit(None, &handle.token()).await.is_err());
    first.assert_async().await;
    first.remove_async().await;

    let update = server
        .mock("POST", "/api/registrations")
        .match_body(Matcher::PartialJson(serde_json::json!({ "id": 7 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":7}"#)
        .expect(1)
        .create_async()
        .await;
    mock_account(&mut server).await;

    let mut resumed = new_wizard(&server, store);
    let outcome = resumed
        .submit(None, &CancellationToken::never())
        .await
        .unwrap();
    assert_eq!(outcome.registration_id.get(), 7);
    update.assert_async().await;
}
