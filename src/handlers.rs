// Command handlers behind the certportal binary. Each one drives the same
// view models a graphical front end would and returns printable output.

use crate::application::{
    CertificateDetailView, CertificateListView, DetailState, IssuanceWizard, SettingsView,
    ViewControls, WalletSession,
};
use crate::config::ClientConfig;
use crate::domain::{short_address, Certificate, CertificateId, DraftField, ImageFile};
use crate::infrastructure::api::CertificateApi;
use crate::infrastructure::session_store::{SqliteSessionStore, StoreError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

const NOT_DEPLOYED: &str = "Contract not deployed. Deploy a contract or configure one in the backend settings.";

/// Open the wallet session, persistent when possible.
/// Falls back to an in-memory store if the configured file cannot be opened.
pub fn open_session(config: &ClientConfig) -> Result<WalletSession, StoreError> {
    let store = match SqliteSessionStore::new(&config.session_db) {
        Ok(store) => store,
        Err(e) => {
            warn!(path = %config.session_db, "session store unavailable, using memory: {}", e);
            SqliteSessionStore::new_in_memory()?
        }
    };
    let mut session = WalletSession::new(Box::new(store));
    if let Err(e) = session.load_stored_contract() {
        warn!("could not read stored contract: {}", e);
    }
    Ok(session)
}

/// Without a wallet, the CLI works against whatever contract the backend
/// is configured with.
pub async fn ensure_contract(api: &dyn CertificateApi, session: &mut WalletSession) {
    if session.is_deployed() {
        return;
    }
    let address = match api.network_info().await {
        Ok(info) if !info.contract_address.is_empty() => Some(info.contract_address),
        _ => match api.get_settings().await {
            Ok(settings) if !settings.contract_address.is_empty() => {
                Some(settings.contract_address)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("could not read backend settings: {}", e);
                None
            }
        },
    };
    if let Some(address) = address {
        if let Err(e) = session.adopt_contract(&address) {
            warn!("could not store contract address: {}", e);
        }
    }
}

pub async fn handle_list(
    api: &dyn CertificateApi,
    session: &WalletSession,
    controls: ViewControls,
) -> Result<String, Box<dyn Error>> {
    let mut view = CertificateListView::mount();
    view.set_search(&controls.search);
    view.set_filter(controls.filter_by);
    view.set_sort(controls.sort);

    view.load(api, session).await;
    if view.contract_missing() {
        return Err(NOT_DEPLOYED.into());
    }
    if let Some(error) = view.error() {
        return Err(error.into());
    }

    let mut out = String::new();
    writeln!(out, "{}", view.summary())?;
    for certificate in view.visible() {
        writeln!(out, "{}", list_row(certificate))?;
    }
    Ok(out)
}

fn list_row(certificate: &Certificate) -> String {
    format!(
        "#{:<6} {:<30} {:<25} {}{}",
        certificate.id,
        certificate.course_name,
        certificate.recipient_name,
        certificate.issue_date,
        if certificate.revoked { "  [REVOKED]" } else { "" }
    )
}

async fn load_detail(
    api: &dyn CertificateApi,
    session: &WalletSession,
    gateway: &str,
    id: &str,
) -> Result<CertificateDetailView, Box<dyn Error>> {
    let mut view = CertificateDetailView::mount(CertificateId::new(id), gateway);
    view.load(api, session).await;
    let failure = match view.state() {
        DetailState::Loaded { .. } => None,
        DetailState::NotFound => Some(format!("Certificate #{} not found", id)),
        DetailState::Undeployed => Some(NOT_DEPLOYED.to_string()),
        DetailState::Loading | DetailState::Failed => Some(
            view.error()
                .unwrap_or(crate::application::detail::LOAD_FAILED)
                .to_string(),
        ),
    };
    match failure {
        Some(message) => Err(message.into()),
        None => Ok(view),
    }
}

pub async fn handle_show(
    api: &dyn CertificateApi,
    session: &WalletSession,
    gateway: &str,
    id: &str,
) -> Result<String, Box<dyn Error>> {
    let view = load_detail(api, session, gateway, id).await?;
    let certificate = view.certificate().ok_or("certificate missing")?;

    let mut out = String::new();
    writeln!(out, "Certificate #{}", certificate.id)?;
    writeln!(out, "Course:    {}", certificate.course_name)?;
    writeln!(
        out,
        "Recipient: {} ({})",
        certificate.recipient_name,
        short_address(&certificate.recipient_address)
    )?;
    writeln!(out, "Issued:    {}", certificate.issue_date)?;
    if !certificate.owner.is_empty() {
        writeln!(out, "Owner:     {}", short_address(&certificate.owner))?;
    }
    writeln!(
        out,
        "Status:    {}",
        if certificate.revoked { "Revoked" } else { "Active" }
    )?;
    if !certificate.description.is_empty() {
        writeln!(out, "About:     {}", certificate.description)?;
    }
    if let Some(url) = view.metadata_url() {
        writeln!(out, "Metadata:  {}", url)?;
    }
    if let Some(url) = view.image_url() {
        writeln!(out, "Image:     {}", url)?;
    }
    Ok(out)
}

pub async fn handle_revoke(
    api: &dyn CertificateApi,
    session: &WalletSession,
    gateway: &str,
    id: &str,
    confirmed: bool,
) -> Result<String, Box<dyn Error>> {
    if !confirmed {
        return Err("Revocation cannot be undone; pass --yes to confirm".into());
    }
    let mut view = load_detail(api, session, gateway, id).await?;
    view.open_revoke_dialog()?;
    view.confirm_revoke(api).await?;

    let revoked = view.certificate().is_some_and(|c| c.revoked);
    info!(%id, revoked, "revocation finished");
    if revoked {
        Ok(format!("Certificate #{} has been revoked\n", id))
    } else {
        Ok(format!(
            "Revocation of certificate #{} was accepted but the record is not revoked yet\n",
            id
        ))
    }
}

#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub recipient_name: String,
    pub recipient_address: String,
    pub course_name: String,
    pub issue_date: Option<String>,
    pub description: String,
    pub image: ImageFile,
}

pub async fn handle_issue(
    api: &dyn CertificateApi,
    session: &WalletSession,
    request: IssueRequest,
    today: NaiveDate,
) -> Result<String, Box<dyn Error>> {
    let mut wizard = IssuanceWizard::mount(session, today)?;

    wizard.set_field(DraftField::RecipientName, &request.recipient_name)?;
    wizard.set_field(DraftField::RecipientAddress, &request.recipient_address)?;
    wizard.next()?;

    wizard.set_field(DraftField::CourseName, &request.course_name)?;
    if let Some(date) = &request.issue_date {
        wizard.set_field(DraftField::IssueDate, date)?;
    }
    wizard.set_field(DraftField::Description, &request.description)?;
    wizard.next()?;

    let preview = wizard.select_image(request.image)?;
    wizard.apply_preview(preview.render());

    let id = wizard.submit(api).await?;
    let path = wizard
        .take_navigation()
        .map(|n| n.path)
        .unwrap_or_default();
    Ok(format!("Issued certificate #{} ({})\n", id, path))
}

pub async fn handle_settings(api: &dyn CertificateApi) -> Result<String, Box<dyn Error>> {
    let mut view = SettingsView::mount();
    view.load(api).await;
    if let Some(error) = view.error() {
        return Err(error.into());
    }
    let settings = view.settings();

    let mut out = String::new();
    writeln!(out, "Mock contract:    {}", settings.use_mock_contract)?;
    writeln!(out, "Mock IPFS:        {}", settings.use_mock_ipfs)?;
    writeln!(out, "RPC URL:          {}", settings.network_rpc_url)?;
    writeln!(out, "Contract address: {}", settings.contract_address)?;
    writeln!(out, "Pinata API key:   {}", settings.pinata_api_key)?;
    writeln!(
        out,
        "Pinata secret:    {}",
        if settings.pinata_secret_key.is_empty() { "(not set)" } else { "(set)" }
    )?;
    Ok(out)
}

pub async fn handle_network(api: &dyn CertificateApi) -> Result<String, Box<dyn Error>> {
    let info = api.network_info().await?;
    Ok(format!(
        "{} (ID: {})\nRPC URL:  {}\nContract: {}\n",
        info.network_name, info.network_id, info.rpc_url, info.contract_address
    ))
}

/// Media type from the file extension; browsers do the same for picked files.
pub fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

pub fn read_image(path: &Path) -> std::io::Result<ImageFile> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("certificate");
    Ok(ImageFile::new(file_name, media_type_for(path), bytes))
}
