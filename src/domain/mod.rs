mod certificate;
mod draft;
mod metadata;
mod network;
mod settings;

pub use certificate::{
    detail_path, parse_issue_date, short_address, Certificate, CertificateId,
};
pub use draft::{DraftField, ImageFile, IssuanceDraft};
pub use metadata::{CertificateMetadata, MetadataAttribute};
pub use network::{network_name, NetworkInfo};
pub use settings::{Settings, MASKED_SECRET};
