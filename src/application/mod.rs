pub mod detail;
pub mod filter;
pub mod lifetime;
pub mod list;
pub mod notify;
pub mod session;
pub mod settings;
pub mod wizard;

pub use detail::{CertificateDetailView, DetailError, DetailState};
pub use filter::{visible_certificates, SortDirection, StatusFilter, ViewControls};
pub use list::CertificateListView;
pub use notify::{Level, Notification, Notifications};
pub use session::{ProviderError, SessionError, WalletConnection, WalletProvider, WalletSession};
pub use settings::{SettingsError, SettingsView};
pub use wizard::{IssuanceWizard, Navigation, Phase, Step, ValidationErrors, WizardError};
