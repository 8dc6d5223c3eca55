use super::mock_server::MockCertificateServer;
use certificate_portal::config::ClientConfig;
use certificate_portal::domain::{Certificate, CertificateId};
use certificate_portal::infrastructure::api::HttpCertificateApi;
use std::path::PathBuf;
use tempfile::TempDir;

/// Smallest valid PNG: a single transparent pixel.
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

/// A running mock backend plus a client configured against it.
/// The session database lives in a temporary directory removed on drop.
pub struct TestBackend {
    pub server: MockCertificateServer,
    pub config: ClientConfig,
    pub api: HttpCertificateApi,
    pub dir: TempDir,
}

impl TestBackend {
    pub async fn start() -> Self {
        let server = MockCertificateServer::new();
        let url = server.start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = ClientConfig::new(&url).unwrap();
        config.ipfs_gateway = format!("{}/ipfs/", url);
        config.session_db = dir
            .path()
            .join("session.db")
            .to_string_lossy()
            .to_string();
        let api = HttpCertificateApi::new(&config);

        Self {
            server,
            config,
            api,
            dir,
        }
    }

    /// Write an image file into the temp directory and return its path.
    pub fn image_file(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, PIXEL_PNG).unwrap();
        path
    }
}

pub fn certificate(id: u64, recipient_name: &str, course_name: &str, issue_date: &str) -> Certificate {
    Certificate {
        id: CertificateId::from(id),
        recipient_name: recipient_name.to_string(),
        recipient_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
        course_name: course_name.to_string(),
        issue_date: issue_date.to_string(),
        description: String::new(),
        token_uri: format!("ipfs://QmMeta{}", id),
        owner: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
        revoked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_png_has_signature() {
        assert_eq!(&PIXEL_PNG[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_certificate_points_at_metadata() {
        let c = certificate(4, "Alice", "Rust", "2024-01-01");
        assert_eq!(c.token_uri, "ipfs://QmMeta4");
    }
}
