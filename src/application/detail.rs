use crate::application::lifetime::{RequestSlot, Ticket, ViewLifetime};
use crate::application::notify::Notifications;
use crate::application::session::WalletSession;
use crate::domain::{Certificate, CertificateId, CertificateMetadata};
use crate::infrastructure::api::{ApiError, CertificateApi};
use crate::infrastructure::ipfs::gateway_url;
use thiserror::Error;
use tracing::{debug, warn};

pub const LOAD_FAILED: &str = "Failed to load certificate. Please try again.";
pub const REVOKE_FAILED: &str = "Failed to revoke certificate. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// No deployed contract to read from.
    Undeployed,
    Loading,
    Loaded {
        certificate: Certificate,
        metadata: Option<CertificateMetadata>,
    },
    NotFound,
    Failed,
}

#[derive(Error, Debug)]
pub enum DetailError {
    #[error("Certificate is not loaded")]
    NotLoaded,

    #[error("Certificate is already revoked")]
    AlreadyRevoked,

    #[error("Revocation has not been confirmed")]
    NotConfirmed,

    #[error("A revocation is already in progress")]
    RevokeInProgress,

    #[error("Failed to revoke certificate: {0}")]
    Api(#[from] ApiError),

    #[error("Revocation result no longer applies")]
    Stale,
}

/// State behind a single certificate's page, including revocation.
pub struct CertificateDetailView {
    id: CertificateId,
    gateway: String,
    state: DetailState,
    error: Option<String>,
    revoke_dialog_open: bool,
    revoking: bool,
    notifications: Notifications,
    lifetime: ViewLifetime,
    load_slot: RequestSlot,
    revoke_slot: RequestSlot,
}

impl CertificateDetailView {
    pub fn mount(id: CertificateId, gateway: &str) -> Self {
        Self {
            id,
            gateway: gateway.to_string(),
            state: DetailState::Loading,
            error: None,
            revoke_dialog_open: false,
            revoking: false,
            notifications: Notifications::default(),
            lifetime: ViewLifetime::new(),
            load_slot: RequestSlot::default(),
            revoke_slot: RequestSlot::default(),
        }
    }

    pub fn unmount(&self) {
        self.lifetime.unmount();
    }

    pub fn id(&self) -> &CertificateId {
        &self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        match &self.state {
            DetailState::Loaded { certificate, .. } => Some(certificate),
            _ => None,
        }
    }

    pub fn metadata(&self) -> Option<&CertificateMetadata> {
        match &self.state {
            DetailState::Loaded { metadata, .. } => metadata.as_ref(),
            _ => None,
        }
    }

    /// Certificate image resolved through the IPFS gateway.
    pub fn image_url(&self) -> Option<String> {
        self.metadata()
            .filter(|m| !m.image.is_empty())
            .map(|m| gateway_url(&m.image, &self.gateway))
    }

    pub fn metadata_url(&self) -> Option<String> {
        self.certificate()
            .filter(|c| !c.token_uri.is_empty())
            .map(|c| gateway_url(&c.token_uri, &self.gateway))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_revoke_dialog_open(&self) -> bool {
        self.revoke_dialog_open
    }

    pub fn is_revoking(&self) -> bool {
        self.revoking
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn begin_load(&mut self, session: &WalletSession) -> Option<Ticket> {
        if !session.is_deployed() {
            self.state = DetailState::Undeployed;
            return None;
        }
        self.state = DetailState::Loading;
        Some(self.lifetime.ticket(&mut self.load_slot))
    }

    pub fn finish_load(
        &mut self,
        ticket: Ticket,
        result: Result<Certificate, ApiError>,
        metadata: Option<CertificateMetadata>,
    ) -> bool {
        if !self.load_slot.accepts(&ticket) {
            debug!(id = %self.id, "discarding stale certificate");
            return false;
        }
        self.state = match result {
            Ok(certificate) => DetailState::Loaded {
                certificate,
                metadata,
            },
            Err(ApiError::NotFound) => DetailState::NotFound,
            Err(e) => {
                tracing::error!(id = %self.id, "error fetching certificate: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
                self.notifications.error("Failed to load certificate");
                DetailState::Failed
            }
        };
        true
    }

    /// Fetch the certificate, then its metadata. Metadata problems only
    /// leave the metadata empty.
    pub async fn load(&mut self, api: &dyn CertificateApi, session: &WalletSession) {
        let Some(ticket) = self.begin_load(session) else {
            return;
        };
        let result = api.get_certificate(&self.id).await;
        let metadata = match &result {
            Ok(certificate) if !certificate.token_uri.is_empty() => {
                match api.fetch_metadata(&certificate.token_uri).await {
                    Ok(metadata) => Some(metadata),
                    Err(e) => {
                        warn!(id = %self.id, "error fetching metadata: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };
        self.finish_load(ticket, result, metadata);
    }

    pub fn open_revoke_dialog(&mut self) -> Result<(), DetailError> {
        let certificate = self.certificate().ok_or(DetailError::NotLoaded)?;
        if certificate.revoked {
            return Err(DetailError::AlreadyRevoked);
        }
        self.revoke_dialog_open = true;
        Ok(())
    }

    pub fn cancel_revoke(&mut self) {
        if !self.revoking {
            self.revoke_dialog_open = false;
        }
    }

    pub fn begin_revoke(&mut self) -> Result<Ticket, DetailError> {
        let certificate = self.certificate().ok_or(DetailError::NotLoaded)?;
        if certificate.revoked {
            return Err(DetailError::AlreadyRevoked);
        }
        if self.revoking {
            return Err(DetailError::RevokeInProgress);
        }
        if !self.revoke_dialog_open {
            return Err(DetailError::NotConfirmed);
        }
        self.revoking = true;
        Ok(self.lifetime.ticket(&mut self.revoke_slot))
    }

    /// Apply the refetched record. Nothing changes in the view until both
    /// the revoke and the refetch have resolved.
    pub fn finish_revoke(
        &mut self,
        ticket: Ticket,
        result: Result<Certificate, ApiError>,
    ) -> Result<(), DetailError> {
        if !self.revoke_slot.accepts(&ticket) {
            debug!(id = %self.id, "discarding stale revocation result");
            return Err(DetailError::Stale);
        }
        self.revoking = false;
        self.revoke_dialog_open = false;
        match result {
            Ok(updated) => {
                if let DetailState::Loaded { certificate, .. } = &mut self.state {
                    certificate.absorb(updated);
                }
                self.notifications.success("Certificate has been revoked");
                Ok(())
            }
            Err(e) => {
                tracing::error!(id = %self.id, "error revoking certificate: {}", e);
                self.error = Some(REVOKE_FAILED.to_string());
                self.notifications.error("Failed to revoke certificate");
                Err(DetailError::Api(e))
            }
        }
    }

    /// Revoke, then refetch, strictly in that order.
    pub async fn confirm_revoke(&mut self, api: &dyn CertificateApi) -> Result<(), DetailError> {
        let ticket = self.begin_revoke()?;
        let result = match api.revoke_certificate(&self.id).await {
            Ok(()) => api.get_certificate(&self.id).await,
            Err(e) => Err(e),
        };
        self.finish_revoke(ticket, result)
    }
}
