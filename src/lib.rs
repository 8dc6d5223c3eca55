pub mod application;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{
    CertificateDetailView, CertificateListView, IssuanceWizard, SettingsView, ViewControls,
    WalletSession,
};
pub use config::ClientConfig;
pub use domain::{Certificate, CertificateId, IssuanceDraft, Settings};
pub use infrastructure::api::{ApiError, CertificateApi, HttpCertificateApi};
