use super::helpers::*;
use super::mock_server::CONTRACT_ADDRESS;
use certificate_portal::domain::{CertificateId, ImageFile, Settings};
use certificate_portal::infrastructure::api::{ApiError, CertificateApi, CertificateForm};

fn form(image: Option<ImageFile>) -> CertificateForm {
    CertificateForm {
        recipient_name: "Alice Smith".to_string(),
        recipient_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
        course_name: "Blockchain Basics".to_string(),
        issue_date: "2024-01-01".to_string(),
        description: "Completed \"with honors\"".to_string(),
        image,
    }
}

#[tokio::test]
async fn test_list_and_get_certificates() {
    let backend = TestBackend::start().await;
    backend.server.seed(certificate(1, "Alice", "Rust", "2024-01-01"));
    backend.server.seed(certificate(2, "Bob", "Go", "2024-02-01"));

    let list = backend.api.list_certificates().await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].recipient_name, "Bob");

    let one = backend.api.get_certificate(&CertificateId::from(2)).await.unwrap();
    assert_eq!(one.course_name, "Go");
    assert_eq!(
        backend.server.requests(),
        ["GET /api/certificates", "GET /api/certificates/2"]
    );
}

#[tokio::test]
async fn test_missing_certificate_maps_to_not_found() {
    let backend = TestBackend::start().await;
    let result = backend.api.get_certificate(&CertificateId::from(99)).await;
    assert!(matches!(result, Err(ApiError::NotFound)));
}

#[tokio::test]
async fn test_server_error_carries_detail() {
    let backend = TestBackend::start().await;
    backend.server.fail_next(503);

    match backend.api.list_certificates().await {
        Err(ApiError::Status { status, detail }) => {
            assert_eq!(status, 503);
            assert_eq!(detail, "Backend unavailable");
        }
        other => panic!("expected status error, got {:?}", other.map(|l| l.len())),
    }
}

#[tokio::test]
async fn test_create_sends_multipart_form() {
    let backend = TestBackend::start().await;
    let image = ImageFile::new("pixel.png", "image/png", PIXEL_PNG.to_vec());

    let created = backend.api.create_certificate(&form(Some(image))).await.unwrap();

    assert_eq!(created.id.as_str(), "1");
    assert_eq!(created.recipient_name, "Alice Smith");
    assert_eq!(created.description, "Completed \"with honors\"");
    assert_eq!(created.token_uri, "ipfs://QmMeta1");
    assert_eq!(backend.server.certificates().len(), 1);
}

#[tokio::test]
async fn test_create_without_image_reports_validation_detail() {
    let backend = TestBackend::start().await;

    match backend.api.create_certificate(&form(None)).await {
        Err(ApiError::Status { status, detail }) => {
            assert_eq!(status, 422);
            assert!(detail.contains("field required"));
        }
        other => panic!("expected validation error, got {:?}", other.is_ok()),
    }
    assert!(backend.server.certificates().is_empty());
}

#[tokio::test]
async fn test_update_certificate() {
    let backend = TestBackend::start().await;
    backend.server.seed(certificate(1, "Alice", "Rust", "2024-01-01"));

    let mut changes = form(None);
    changes.course_name = "Advanced Rust".to_string();
    let updated = backend
        .api
        .update_certificate(&CertificateId::from(1), &changes)
        .await
        .unwrap();
    assert_eq!(updated.course_name, "Advanced Rust");
}

#[tokio::test]
async fn test_revoke_accepts_message_body() {
    let backend = TestBackend::start().await;
    backend.server.seed(certificate(7, "Alice", "Rust", "2024-01-01"));

    backend.api.revoke_certificate(&CertificateId::from(7)).await.unwrap();
    assert!(backend.server.certificates()[0].revoked);
    assert_eq!(backend.server.requests(), ["DELETE /api/certificates/7"]);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let backend = TestBackend::start().await;

    let mut settings = backend.api.get_settings().await.unwrap();
    assert_eq!(settings.contract_address, CONTRACT_ADDRESS);
    assert!(settings.use_mock_ipfs);

    settings.use_mock_ipfs = false;
    settings.pinata_secret_key = "s3cret".to_string();
    // The backend answers with a message, so the submitted copy comes back.
    let saved = backend.api.save_settings(&settings).await.unwrap();
    assert_eq!(saved, settings);

    let reloaded: Settings = backend.api.get_settings().await.unwrap();
    assert!(!reloaded.use_mock_ipfs);
    assert!(reloaded.secret_is_masked());
}

#[tokio::test]
async fn test_network_info() {
    let backend = TestBackend::start().await;
    let info = backend.api.network_info().await.unwrap();

    assert_eq!(info.network_id, 1337);
    assert_eq!(info.network_name, "Local Development Chain");
    assert_eq!(info.contract_address, CONTRACT_ADDRESS);
}

#[tokio::test]
async fn test_metadata_is_fetched_through_gateway() {
    let backend = TestBackend::start().await;
    backend.server.seed(certificate(3, "Carol", "Solidity", "2024-03-01"));

    let metadata = backend.api.fetch_metadata("ipfs://QmMeta3").await.unwrap();
    assert_eq!(metadata.name, "Certificate: Solidity");
    assert_eq!(metadata.image, "ipfs://QmImage3");
    assert_eq!(backend.server.requests(), ["GET /ipfs/QmMeta3"]);
}
