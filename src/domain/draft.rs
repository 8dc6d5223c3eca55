use base64::Engine;
use chrono::NaiveDate;
use std::fmt;

/// Editable fields of a certificate that has not been issued yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DraftField {
    RecipientName,
    RecipientAddress,
    CourseName,
    IssueDate,
    Description,
    Image,
}

impl DraftField {
    /// Form field name used on the wire and as validation error key.
    pub fn name(self) -> &'static str {
        match self {
            DraftField::RecipientName => "recipient_name",
            DraftField::RecipientAddress => "recipient_address",
            DraftField::CourseName => "course_name",
            DraftField::IssueDate => "issue_date",
            DraftField::Description => "description",
            DraftField::Image => "image",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file picked by the user.
#[derive(Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: &str, media_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            media_type: media_type.to_string(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    pub fn preview_data_uri(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.media_type, payload)
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssuanceDraft {
    pub recipient_name: String,
    pub recipient_address: String,
    pub course_name: String,
    pub issue_date: String,
    pub description: String,
    pub image: Option<ImageFile>,
}

impl IssuanceDraft {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            recipient_name: String::new(),
            recipient_address: String::new(),
            course_name: String::new(),
            issue_date: today.format("%Y-%m-%d").to_string(),
            description: String::new(),
            image: None,
        }
    }

    /// Text value of a field. The image has no text value.
    pub fn text(&self, field: DraftField) -> Option<&str> {
        match field {
            DraftField::RecipientName => Some(&self.recipient_name),
            DraftField::RecipientAddress => Some(&self.recipient_address),
            DraftField::CourseName => Some(&self.course_name),
            DraftField::IssueDate => Some(&self.issue_date),
            DraftField::Description => Some(&self.description),
            DraftField::Image => None,
        }
    }

    pub(crate) fn text_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match field {
            DraftField::RecipientName => Some(&mut self.recipient_name),
            DraftField::RecipientAddress => Some(&mut self.recipient_address),
            DraftField::CourseName => Some(&mut self.course_name),
            DraftField::IssueDate => Some(&mut self.issue_date),
            DraftField::Description => Some(&mut self.description),
            DraftField::Image => None,
        }
    }

    pub fn has(&self, field: DraftField) -> bool {
        match field {
            DraftField::Image => self.image.is_some(),
            _ => self.text(field).is_some_and(|v| !v.trim().is_empty()),
        }
    }
}
