use crate::config::ClientConfig;
use crate::domain::{
    Certificate, CertificateId, CertificateMetadata, ImageFile, IssuanceDraft, NetworkInfo,
    Settings,
};
use crate::infrastructure::ipfs::gateway_url;
use crate::infrastructure::multipart::MultipartForm;
use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use thiserror::Error;
use tracing::{debug, error};

pub type HttpsClient = Client<HttpsConnector<HttpConnector>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,

    #[error("Server returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Transport error: {0}")]
    Transport(#[from] hyper::Error),

    #[error("Invalid request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Multipart payload for creating or updating a certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateForm {
    pub recipient_name: String,
    pub recipient_address: String,
    pub course_name: String,
    pub issue_date: String,
    pub description: String,
    pub image: Option<ImageFile>,
}

impl CertificateForm {
    pub fn from_draft(draft: &IssuanceDraft) -> Self {
        Self {
            recipient_name: draft.recipient_name.clone(),
            recipient_address: draft.recipient_address.clone(),
            course_name: draft.course_name.clone(),
            issue_date: draft.issue_date.clone(),
            description: draft.description.clone(),
            image: draft.image.clone(),
        }
    }

    /// Encode as `(content_type, body)`.
    pub fn encode(&self) -> (String, Vec<u8>) {
        let mut form = MultipartForm::new()
            .text("recipient_name", &self.recipient_name)
            .text("recipient_address", &self.recipient_address)
            .text("course_name", &self.course_name)
            .text("issue_date", &self.issue_date)
            .text("description", &self.description);
        if let Some(image) = &self.image {
            form = form.file("image", &image.file_name, &image.media_type, &image.bytes);
        }
        form.finish()
    }
}

/// Backend operations the views depend on.
#[async_trait]
pub trait CertificateApi: Send + Sync {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError>;
    async fn get_certificate(&self, id: &CertificateId) -> Result<Certificate, ApiError>;
    async fn create_certificate(&self, form: &CertificateForm) -> Result<Certificate, ApiError>;
    async fn update_certificate(
        &self,
        id: &CertificateId,
        form: &CertificateForm,
    ) -> Result<Certificate, ApiError>;
    async fn revoke_certificate(&self, id: &CertificateId) -> Result<(), ApiError>;
    async fn get_settings(&self) -> Result<Settings, ApiError>;
    async fn save_settings(&self, settings: &Settings) -> Result<Settings, ApiError>;
    async fn network_info(&self) -> Result<NetworkInfo, ApiError>;
    /// Fetch the metadata document behind a token URI, via the IPFS gateway.
    async fn fetch_metadata(&self, token_uri: &str) -> Result<CertificateMetadata, ApiError>;
}

pub struct HttpCertificateApi {
    client: HttpsClient,
    base_url: String,
    gateway: String,
}

impl HttpCertificateApi {
    pub fn new(config: &ClientConfig) -> Self {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Self {
            client: Client::builder().build(https),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            gateway: config.ipfs_gateway.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: Request<Body>) -> Result<Bytes, ApiError> {
        let method = request.method().clone();
        let uri = request.uri().clone();
        debug!(%method, %uri, "sending request");

        let response = self.client.request(request).await.map_err(|e| {
            error!(%method, %uri, "request failed: {}", e);
            ApiError::from(e)
        })?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let detail = error_detail(&body, status);
            error!(%method, %uri, status = status.as_u16(), "{}", detail);
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(body)
    }

    async fn get(&self, url: String) -> Result<Bytes, ApiError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())?;
        self.send(request).await
    }

    async fn send_form(
        &self,
        method: Method,
        url: String,
        form: &CertificateForm,
    ) -> Result<Certificate, ApiError> {
        let (content_type, body) = form.encode();
        let request = Request::builder()
            .method(method)
            .uri(url)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))?;
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CertificateApi for HttpCertificateApi {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError> {
        let body = self.get(self.url("/api/certificates")).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_certificate(&self, id: &CertificateId) -> Result<Certificate, ApiError> {
        let body = self
            .get(self.url(&format!("/api/certificates/{}", id)))
            .await?;
        let certificate: Option<Certificate> = serde_json::from_slice(&body)?;
        certificate.ok_or(ApiError::NotFound)
    }

    async fn create_certificate(&self, form: &CertificateForm) -> Result<Certificate, ApiError> {
        self.send_form(Method::POST, self.url("/api/certificates"), form)
            .await
    }

    async fn update_certificate(
        &self,
        id: &CertificateId,
        form: &CertificateForm,
    ) -> Result<Certificate, ApiError> {
        self.send_form(
            Method::PUT,
            self.url(&format!("/api/certificates/{}", id)),
            form,
        )
        .await
    }

    async fn revoke_certificate(&self, id: &CertificateId) -> Result<(), ApiError> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(self.url(&format!("/api/certificates/{}", id)))
            .body(Body::empty())?;
        // The body is either the updated record or a plain message; callers
        // refetch the record either way.
        self.send(request).await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, ApiError> {
        let body = self.get(self.url("/api/settings")).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn save_settings(&self, settings: &Settings) -> Result<Settings, ApiError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.url("/api/settings"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(settings)?))?;
        let body = self.send(request).await?;

        // Some deployments echo the settings, others answer with a message.
        let echoed: serde_json::Value = serde_json::from_slice(&body)?;
        if echoed.get("useMockContract").is_some() {
            Ok(serde_json::from_value(echoed)?)
        } else {
            Ok(settings.clone())
        }
    }

    async fn network_info(&self) -> Result<NetworkInfo, ApiError> {
        let body = self.get(self.url("/api/network")).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_metadata(&self, token_uri: &str) -> Result<CertificateMetadata, ApiError> {
        let body = self.get(gateway_url(token_uri, &self.gateway)).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull a readable message out of an error response.
///
/// FastAPI-style bodies carry it under `detail`, either as a string or as a
/// structured list of validation problems.
fn error_detail(body: &[u8], status: StatusCode) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    };
    let Ok(text) = std::str::from_utf8(body) else {
        return fallback();
    };
    match json::parse(text) {
        Ok(parsed) => {
            let detail = &parsed["detail"];
            if let Some(message) = detail.as_str() {
                message.to_string()
            } else if !detail.is_null() {
                detail.dump()
            } else if text.trim().is_empty() {
                fallback()
            } else {
                text.trim().to_string()
            }
        }
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => fallback(),
    }
}
