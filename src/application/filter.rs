//! Derived certificate list: status filter, text search, date sort.

use crate::domain::Certificate;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct ParseControlError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Revoked,
}

impl StatusFilter {
    pub fn admits(self, certificate: &Certificate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !certificate.revoked,
            StatusFilter::Revoked => certificate.revoked,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Revoked => "revoked",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "revoked" => Ok(StatusFilter::Revoked),
            _ => Err(ParseControlError {
                kind: "status filter",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "oldest" => Ok(SortDirection::Asc),
            "desc" | "newest" => Ok(SortDirection::Desc),
            _ => Err(ParseControlError {
                kind: "sort direction",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewControls {
    pub search: String,
    pub filter_by: StatusFilter,
    pub sort: SortDirection,
}

impl ViewControls {
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || self.filter_by != StatusFilter::All
    }
}

/// Apply the view controls to a certificate list.
///
/// Records whose issue date does not parse sort after all dated records in
/// either direction. The sort is stable, so equal dates (and undated records
/// among themselves) keep their input order.
pub fn visible_certificates(certificates: &[Certificate], controls: &ViewControls) -> Vec<Certificate> {
    if certificates.is_empty() {
        return Vec::new();
    }

    let query = controls.search.to_lowercase();
    let mut keyed: Vec<(Option<NaiveDateTime>, &Certificate)> = certificates
        .iter()
        .filter(|c| controls.filter_by.admits(c))
        .filter(|c| query.is_empty() || c.matches_search(&query))
        .map(|c| (c.issued_at(), c))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_dates(*a, *b, controls.sort));

    keyed.into_iter().map(|(_, c)| c.clone()).collect()
}

fn compare_dates(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>, sort: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match sort {
            SortDirection::Asc => a.cmp(&b),
            SortDirection::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Results line shown above the list.
pub fn summary(shown: usize, total: usize, controls: &ViewControls) -> String {
    let mut line = format!("Showing {} of {} certificates", shown, total);
    match controls.filter_by {
        StatusFilter::All => {}
        StatusFilter::Active => line.push_str(" (Active only)"),
        StatusFilter::Revoked => line.push_str(" (Revoked only)"),
    }
    if !controls.search.is_empty() {
        line.push_str(&format!(" matching \"{}\"", controls.search));
    }
    line
}
