use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Token identifier as reported by the backend.
///
/// The backend emits numeric token ids, but nothing in the client depends on
/// them being numbers, so both JSON numbers and strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<u64> for CertificateId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CertificateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CertificateId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_address: String,
    pub course_name: String,
    pub issue_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub revoked: bool,
}

impl Certificate {
    /// Issue date as a point in time, `None` when it does not parse.
    ///
    /// Plain calendar dates map to midnight, RFC 3339 timestamps are
    /// normalized to UTC.
    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        parse_issue_date(&self.issue_date)
    }

    /// `lowered_query` must already be lower-cased.
    pub fn matches_search(&self, lowered_query: &str) -> bool {
        self.recipient_name.to_lowercase().contains(lowered_query)
            || self.course_name.to_lowercase().contains(lowered_query)
    }

    /// Replace this record with a fresher copy of itself.
    ///
    /// Revocation is one-way: a stale copy claiming the certificate is active
    /// again does not undo it.
    pub fn absorb(&mut self, newer: Certificate) {
        let was_revoked = self.revoked;
        *self = newer;
        if was_revoked && !self.revoked {
            tracing::warn!(id = %self.id, "ignoring un-revocation of certificate");
            self.revoked = true;
        }
    }

    pub fn detail_path(&self) -> String {
        detail_path(&self.id)
    }
}

pub fn detail_path(id: &CertificateId) -> String {
    format!("/certificate/{}", id)
}

pub fn parse_issue_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Shortened address for display, e.g. `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
