use crate::application::lifetime::{RequestSlot, Ticket, ViewLifetime};
use crate::application::notify::Notifications;
use crate::domain::Settings;
use crate::infrastructure::api::{ApiError, CertificateApi};
use thiserror::Error;
use tracing::debug;

pub const LOAD_FAILED: &str = "Failed to load settings. Please try again.";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to save settings: {0}")]
    Api(#[from] ApiError),

    #[error("Save result no longer applies")]
    Stale,
}

pub struct SettingsView {
    settings: Settings,
    loading: bool,
    saving: bool,
    saved: bool,
    error: Option<String>,
    notifications: Notifications,
    lifetime: ViewLifetime,
    load_slot: RequestSlot,
    save_slot: RequestSlot,
}

impl SettingsView {
    pub fn mount() -> Self {
        Self {
            settings: Settings::default(),
            loading: false,
            saving: false,
            saved: false,
            error: None,
            notifications: Notifications::default(),
            lifetime: ViewLifetime::new(),
            load_slot: RequestSlot::default(),
            save_slot: RequestSlot::default(),
        }
    }

    pub fn unmount(&self) {
        self.lifetime.unmount();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    fn edit(&mut self) -> &mut Settings {
        self.saved = false;
        &mut self.settings
    }

    pub fn set_use_mock_contract(&mut self, value: bool) {
        self.edit().use_mock_contract = value;
    }

    pub fn set_use_mock_ipfs(&mut self, value: bool) {
        self.edit().use_mock_ipfs = value;
    }

    pub fn set_network_rpc_url(&mut self, value: &str) {
        self.edit().network_rpc_url = value.to_string();
    }

    pub fn set_contract_address(&mut self, value: &str) {
        self.edit().contract_address = value.to_string();
    }

    pub fn set_pinata_api_key(&mut self, value: &str) {
        self.edit().pinata_api_key = value.to_string();
    }

    pub fn set_pinata_secret_key(&mut self, value: &str) {
        self.edit().pinata_secret_key = value.to_string();
    }

    pub fn begin_load(&mut self) -> Ticket {
        self.loading = true;
        self.lifetime.ticket(&mut self.load_slot)
    }

    pub fn finish_load(&mut self, ticket: Ticket, result: Result<Settings, ApiError>) -> bool {
        if !self.load_slot.accepts(&ticket) {
            debug!("discarding stale settings");
            return false;
        }
        self.loading = false;
        match result {
            Ok(settings) => {
                self.settings = settings;
                self.error = None;
            }
            Err(e) => {
                tracing::error!("error loading settings: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
                self.notifications.error("Failed to load settings");
            }
        }
        true
    }

    pub async fn load(&mut self, api: &dyn CertificateApi) {
        let ticket = self.begin_load();
        let result = api.get_settings().await;
        self.finish_load(ticket, result);
    }

    pub fn begin_save(&mut self) -> (Ticket, Settings) {
        self.saving = true;
        (
            self.lifetime.ticket(&mut self.save_slot),
            self.settings.clone(),
        )
    }

    pub fn finish_save(
        &mut self,
        ticket: Ticket,
        result: Result<Settings, ApiError>,
    ) -> Result<(), SettingsError> {
        if !self.save_slot.accepts(&ticket) {
            debug!("discarding stale settings save");
            return Err(SettingsError::Stale);
        }
        self.saving = false;
        match result {
            Ok(stored) => {
                self.settings = stored;
                self.saved = true;
                self.notifications.success("Settings saved successfully!");
                Ok(())
            }
            Err(e) => {
                tracing::error!("error saving settings: {}", e);
                self.notifications.error("Failed to save settings");
                Err(SettingsError::Api(e))
            }
        }
    }

    /// Post the draft. On failure the draft stays as edited.
    pub async fn save(&mut self, api: &dyn CertificateApi) -> Result<(), SettingsError> {
        let (ticket, draft) = self.begin_save();
        let result = api.save_settings(&draft).await;
        self.finish_save(ticket, result)
    }
}
