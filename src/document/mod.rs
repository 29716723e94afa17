//! Capture document
//!
//! Pages own regions, regions own the tokens recognized inside them. Totals
//! are derived on demand from the current entities and never cached.

pub mod aggregate;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::Bounds;
use crate::id::{PageId, RegionId, TokenId};

pub use aggregate::sum_tokens;
pub use store::CaptureDocument;

/// Structural errors raised by document mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// A region was staged against a page that does not exist
    #[error("unable to stage region: page {0} does not exist")]
    PageNotFound(PageId),
}

/// One logical sheet of captured work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    /// 1-based position at creation time
    pub index: usize,
    pub label: String,
    /// Owned regions in capture order
    pub region_ids: Vec<RegionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub(crate) fn new(index: usize, label: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: PageId::generate(),
            index,
            label: label
                .map(str::to_string)
                .unwrap_or_else(|| format!("Page {index}")),
            region_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Recognition lifecycle of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStatus {
    /// Waiting for a recognition job
    Pending,
    /// A recognition job is in flight
    Processing,
    /// Tokens come from a finished recognition pass
    Complete,
    /// The last recognition pass failed; tokens are from before it
    Failed,
}

impl RegionStatus {
    /// Whether recognition for the region has not settled yet
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RegionStatus::Pending | RegionStatus::Processing)
    }
}

/// One user-drawn rectangle and its recognition result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    /// Owning page
    pub page_id: PageId,
    /// Always in source space
    pub bounds: Bounds,
    pub status: RegionStatus,
    pub tokens: Vec<Token>,
    /// Signed aggregate of `tokens`
    pub sum: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Region {
    pub(crate) fn new(page_id: PageId, bounds: Bounds) -> Self {
        let now = Utc::now();
        Self {
            id: RegionId::generate(),
            page_id,
            bounds,
            status: RegionStatus::Pending,
            tokens: Vec::new(),
            sum: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One recognized text fragment inside a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    /// Raw recognized text
    pub text: String,
    /// Non-negative magnitude, `None` for non-numeric fragments
    pub normalized_value: Option<f64>,
    pub is_negative: bool,
    pub confidence: Option<f64>,
    /// Set once a human overrides value or sign
    pub corrected_by_user: bool,
}

impl Token {
    /// Signed contribution to a region sum
    pub fn signed_value(&self) -> Option<f64> {
        let magnitude = self.normalized_value.filter(|v| !v.is_nan())?.abs();
        Some(if self.is_negative { -magnitude } else { magnitude })
    }
}

/// A manual override of a token's value and sign
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenCorrection {
    pub value: Option<f64>,
    pub is_negative: bool,
}

/// Transient set of regions chosen for an ad-hoc subtotal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub region_ids: Vec<RegionId>,
    /// Reserved for token-level selection
    pub token_ids: Vec<TokenId>,
}

impl Selection {
    pub fn contains_region(&self, region_id: &RegionId) -> bool {
        self.region_ids.contains(region_id)
    }

    pub fn is_empty(&self) -> bool {
        self.region_ids.is_empty() && self.token_ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.region_ids.clear();
        self.token_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_label() {
        assert_eq!(Page::new(3, None).label, "Page 3");
        assert_eq!(Page::new(1, Some("Receipts")).label, "Receipts");
    }

    #[test]
    fn test_new_region_is_pending() {
        let region = Region::new(PageId::from("page-1"), Bounds::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(region.status, RegionStatus::Pending);
        assert!(region.tokens.is_empty());
        assert_eq!(region.sum, 0.0);
        assert!(region.id.as_str().starts_with("region-"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&RegionStatus::Processing).unwrap(), "\"processing\"");
        assert!(RegionStatus::Pending.is_in_flight());
        assert!(!RegionStatus::Failed.is_in_flight());
    }

    #[test]
    fn test_error_message() {
        let err = CaptureError::PageNotFound(PageId::from("page-x"));
        assert_eq!(err.to_string(), "unable to stage region: page page-x does not exist");
    }
}
