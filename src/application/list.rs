use crate::application::filter::{self, SortDirection, StatusFilter, ViewControls};
use crate::application::lifetime::{RequestSlot, Ticket, ViewLifetime};
use crate::application::notify::Notifications;
use crate::application::session::WalletSession;
use crate::domain::Certificate;
use crate::infrastructure::api::{ApiError, CertificateApi};
use tracing::debug;

pub const LOAD_FAILED: &str = "Failed to load certificates. Please try again.";

/// State behind the certificate list page.
///
/// `visible` is recomputed explicitly after every change to the list or the
/// view controls.
pub struct CertificateListView {
    certificates: Vec<Certificate>,
    controls: ViewControls,
    visible: Vec<Certificate>,
    loading: bool,
    contract_missing: bool,
    error: Option<String>,
    notifications: Notifications,
    lifetime: ViewLifetime,
    load_slot: RequestSlot,
}

impl CertificateListView {
    pub fn mount() -> Self {
        Self {
            certificates: Vec::new(),
            controls: ViewControls::default(),
            visible: Vec::new(),
            loading: false,
            contract_missing: false,
            error: None,
            notifications: Notifications::default(),
            lifetime: ViewLifetime::new(),
            load_slot: RequestSlot::default(),
        }
    }

    pub fn unmount(&self) {
        self.lifetime.unmount();
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn visible(&self) -> &[Certificate] {
        &self.visible
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set when a load was attempted without a deployed contract.
    pub fn contract_missing(&self) -> bool {
        self.contract_missing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn summary(&self) -> String {
        filter::summary(self.visible.len(), self.certificates.len(), &self.controls)
    }

    /// Starts a fetch, or returns `None` when there is no contract to read.
    pub fn begin_load(&mut self, session: &WalletSession) -> Option<Ticket> {
        if !session.is_deployed() {
            self.contract_missing = true;
            return None;
        }
        self.contract_missing = false;
        self.loading = true;
        Some(self.lifetime.ticket(&mut self.load_slot))
    }

    /// Returns false when the result arrived too late to be applied.
    pub fn finish_load(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Certificate>, ApiError>,
    ) -> bool {
        if !self.load_slot.accepts(&ticket) {
            debug!("discarding stale certificate list");
            return false;
        }
        self.loading = false;
        match result {
            Ok(certificates) => {
                self.certificates = certificates;
                self.error = None;
                self.notifications.success("Certificates loaded successfully");
            }
            Err(e) => {
                tracing::error!("error fetching certificates: {}", e);
                self.certificates.clear();
                self.error = Some(LOAD_FAILED.to_string());
                self.notifications.error("Failed to load certificates");
            }
        }
        self.recompute();
        true
    }

    pub async fn load(&mut self, api: &dyn CertificateApi, session: &WalletSession) {
        let Some(ticket) = self.begin_load(session) else {
            return;
        };
        let result = api.list_certificates().await;
        self.finish_load(ticket, result);
    }

    pub fn set_search(&mut self, search: &str) {
        self.controls.search = search.to_string();
        self.recompute();
    }

    pub fn set_filter(&mut self, filter_by: StatusFilter) {
        self.controls.filter_by = filter_by;
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortDirection) {
        self.controls.sort = sort;
        self.recompute();
    }

    pub fn toggle_sort(&mut self) {
        self.controls.sort = self.controls.sort.toggled();
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.controls.search.clear();
        self.controls.filter_by = StatusFilter::All;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.visible = filter::visible_certificates(&self.certificates, &self.controls);
    }
}
