//! Three-step certificate issuance form.
//!
//! Recipient -> Details -> Preview & Submit. `next` only advances past a
//! step whose fields validate; `back` never validates. Submitting sends one
//! multipart create call and, on success, schedules a single navigation to
//! the new certificate.

use crate::application::lifetime::{RequestSlot, Ticket, ViewLifetime};
use crate::application::notify::Notifications;
use crate::application::session::WalletSession;
use crate::domain::{Certificate, CertificateId, DraftField, ImageFile, IssuanceDraft};
use crate::infrastructure::api::{ApiError, CertificateApi, CertificateForm};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const STEP_TITLES: [&str; 3] = ["Recipient Information", "Certificate Details", "Preview & Submit"];

/// Delay between a successful submit and leaving for the detail page.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

pub const IMAGE_TYPE_MESSAGE: &str = "Please upload an image file (JPG, PNG, etc.)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Recipient,
    Details,
    Preview,
}

impl Step {
    pub fn index(self) -> usize {
        match self {
            Step::Recipient => 0,
            Step::Details => 1,
            Step::Preview => 2,
        }
    }

    pub fn title(self) -> &'static str {
        STEP_TITLES[self.index()]
    }

    fn next(self) -> Option<Step> {
        match self {
            Step::Recipient => Some(Step::Details),
            Step::Details => Some(Step::Preview),
            Step::Preview => None,
        }
    }

    fn prev(self) -> Option<Step> {
        match self {
            Step::Recipient => None,
            Step::Details => Some(Step::Recipient),
            Step::Preview => Some(Step::Details),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Editing,
    Submitting,
    Success(Certificate),
}

/// Field name -> message for every field that failed its last check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<DraftField, String>);

impl ValidationErrors {
    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: DraftField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: DraftField, message: &str) {
        self.0.insert(field, message.to_string());
    }

    fn remove(&mut self, field: DraftField) -> bool {
        self.0.remove(&field).is_some()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Contract not deployed. Please deploy a contract first.")]
    ContractNotDeployed,

    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("{0} is not a text field")]
    NotText(DraftField),

    #[error("Already at the final step")]
    AlreadyAtFinalStep,

    #[error("Certificates can only be submitted from the final step")]
    NotAtFinalStep,

    #[error("Cannot go back from this step")]
    BackUnavailable,

    #[error("The form cannot be changed while submitting or after issuing")]
    Locked,

    #[error("Failed to issue certificate: {0}")]
    Submit(#[from] ApiError),

    #[error("Submission result no longer applies")]
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub delay: Duration,
}

/// Pending preview of a freshly selected image.
#[derive(Debug)]
pub struct PreviewJob {
    generation: u64,
    image: ImageFile,
}

#[derive(Debug)]
pub struct RenderedPreview {
    generation: u64,
    data_uri: String,
}

impl PreviewJob {
    pub fn render(self) -> RenderedPreview {
        RenderedPreview {
            generation: self.generation,
            data_uri: self.image.preview_data_uri(),
        }
    }
}

pub struct SubmitTicket {
    pub ticket: Ticket,
    pub form: CertificateForm,
}

/// Errors for the given step's required fields, in isolation.
pub fn validate_step(draft: &IssuanceDraft, step: Step) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    match step {
        Step::Recipient => {
            if !draft.has(DraftField::RecipientName) {
                errors.insert(DraftField::RecipientName, "Recipient name is required");
            }
            if !draft.has(DraftField::RecipientAddress) {
                errors.insert(DraftField::RecipientAddress, "Recipient address is required");
            } else if !draft.recipient_address.starts_with("0x") {
                errors.insert(DraftField::RecipientAddress, "Invalid Ethereum address format");
            }
        }
        Step::Details => {
            if !draft.has(DraftField::CourseName) {
                errors.insert(DraftField::CourseName, "Course name is required");
            }
            if !draft.has(DraftField::IssueDate) {
                errors.insert(DraftField::IssueDate, "Issue date is required");
            }
        }
        Step::Preview => {
            if !draft.has(DraftField::Image) {
                errors.insert(DraftField::Image, "Certificate image is required");
            }
        }
    }
    errors
}

pub struct IssuanceWizard {
    draft: IssuanceDraft,
    step: Step,
    phase: Phase,
    validation_errors: ValidationErrors,
    preview: Option<String>,
    image_generation: u64,
    error: Option<String>,
    navigation: Option<Navigation>,
    notifications: Notifications,
    lifetime: ViewLifetime,
    submit_slot: RequestSlot,
}

impl IssuanceWizard {
    pub fn mount(session: &WalletSession, today: NaiveDate) -> Result<Self, WizardError> {
        if !session.is_deployed() {
            return Err(WizardError::ContractNotDeployed);
        }
        Ok(Self {
            draft: IssuanceDraft::new(today),
            step: Step::Recipient,
            phase: Phase::Editing,
            validation_errors: ValidationErrors::default(),
            preview: None,
            image_generation: 0,
            error: None,
            navigation: None,
            notifications: Notifications::default(),
            lifetime: ViewLifetime::new(),
            submit_slot: RequestSlot::default(),
        })
    }

    pub fn unmount(&self) {
        self.lifetime.unmount();
    }

    pub fn draft(&self) -> &IssuanceDraft {
        &self.draft
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn active_step(&self) -> usize {
        self.step.index()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn can_go_back(&self) -> bool {
        self.phase == Phase::Editing && self.step != Step::Recipient
    }

    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.validation_errors
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// Submit failure banner.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// The scheduled redirect after a successful submit. Yields it once.
    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        if self.phase == Phase::Editing {
            Ok(())
        } else {
            Err(WizardError::Locked)
        }
    }

    /// Editing a field clears that field's error and nothing else.
    pub fn set_field(&mut self, field: DraftField, value: &str) -> Result<(), WizardError> {
        self.ensure_editing()?;
        let slot = self
            .draft
            .text_mut(field)
            .ok_or(WizardError::NotText(field))?;
        *slot = value.to_string();
        self.validation_errors.remove(field);
        Ok(())
    }

    /// Accept one file as the certificate image.
    ///
    /// Non-image files are rejected with a validation error and leave any
    /// previously accepted image (and its preview) in place.
    pub fn select_image(&mut self, file: ImageFile) -> Result<PreviewJob, WizardError> {
        self.ensure_editing()?;
        if !file.is_image() {
            debug!(media_type = %file.media_type, "rejecting non-image file");
            self.validation_errors.insert(DraftField::Image, IMAGE_TYPE_MESSAGE);
            let mut errors = ValidationErrors::default();
            errors.insert(DraftField::Image, IMAGE_TYPE_MESSAGE);
            return Err(WizardError::Invalid(errors));
        }

        self.validation_errors.remove(DraftField::Image);
        self.image_generation += 1;
        self.preview = None;
        self.draft.image = Some(file.clone());
        Ok(PreviewJob {
            generation: self.image_generation,
            image: file,
        })
    }

    /// Store a rendered preview unless a newer image replaced its source.
    pub fn apply_preview(&mut self, rendered: RenderedPreview) -> bool {
        if !self.lifetime.is_mounted() || rendered.generation != self.image_generation {
            return false;
        }
        self.preview = Some(rendered.data_uri);
        true
    }

    pub fn next(&mut self) -> Result<usize, WizardError> {
        self.ensure_editing()?;
        let Some(next) = self.step.next() else {
            return Err(WizardError::AlreadyAtFinalStep);
        };
        self.validation_errors = validate_step(&self.draft, self.step);
        if !self.validation_errors.is_empty() {
            return Err(WizardError::Invalid(self.validation_errors.clone()));
        }
        self.step = next;
        Ok(self.step.index())
    }

    pub fn back(&mut self) -> Result<usize, WizardError> {
        if self.phase != Phase::Editing {
            return Err(WizardError::BackUnavailable);
        }
        let prev = self.step.prev().ok_or(WizardError::BackUnavailable)?;
        self.step = prev;
        Ok(self.step.index())
    }

    pub fn begin_submit(&mut self) -> Result<SubmitTicket, WizardError> {
        self.ensure_editing()?;
        if self.step != Step::Preview {
            return Err(WizardError::NotAtFinalStep);
        }
        self.validation_errors = validate_step(&self.draft, Step::Preview);
        if !self.validation_errors.is_empty() {
            return Err(WizardError::Invalid(self.validation_errors.clone()));
        }

        self.phase = Phase::Submitting;
        self.error = None;
        Ok(SubmitTicket {
            ticket: self.lifetime.ticket(&mut self.submit_slot),
            form: CertificateForm::from_draft(&self.draft),
        })
    }

    pub fn finish_submit(
        &mut self,
        ticket: Ticket,
        result: Result<Certificate, ApiError>,
    ) -> Result<CertificateId, WizardError> {
        if !self.submit_slot.accepts(&ticket) {
            debug!("discarding stale submission result");
            return Err(WizardError::Stale);
        }
        match result {
            Ok(certificate) => {
                let id = certificate.id.clone();
                info!(%id, "certificate issued");
                self.navigation = Some(Navigation {
                    path: certificate.detail_path(),
                    delay: REDIRECT_DELAY,
                });
                self.phase = Phase::Success(certificate);
                self.notifications.success("Certificate issued successfully!");
                Ok(id)
            }
            Err(e) => {
                self.phase = Phase::Editing;
                self.error = Some(e.to_string());
                self.notifications.error("Failed to issue certificate");
                Err(WizardError::Submit(e))
            }
        }
    }

    pub async fn submit(&mut self, api: &dyn CertificateApi) -> Result<CertificateId, WizardError> {
        let SubmitTicket { ticket, form } = self.begin_submit()?;
        let result = api.create_certificate(&form).await;
        self.finish_submit(ticket, result)
    }
}
