//! Capture document store
//!
//! Every mutation is a single synchronous step. Unknown ids are ignored
//! rather than reported, since they can race against a concurrent removal.
//! The only error is staging a region for a page that does not exist.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::capture::Bounds;
use crate::document::{
    sum_tokens, CaptureError, Page, Region, RegionStatus, Selection, Token, TokenCorrection,
};
use crate::id::{PageId, RegionId, TokenId};

/// Pages, regions and selection of one capture session
#[derive(Debug, Clone)]
pub struct CaptureDocument {
    pages: HashMap<PageId, Page>,
    regions: HashMap<RegionId, Region>,
    page_order: Vec<PageId>,
    active_page_id: PageId,
    selection: Selection,
}

impl Default for CaptureDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDocument {
    /// Create a document with a single empty page
    pub fn new() -> Self {
        let page = Page::new(1, None);
        let id = page.id.clone();
        Self {
            pages: HashMap::from([(id.clone(), page)]),
            regions: HashMap::new(),
            page_order: vec![id.clone()],
            active_page_id: id,
            selection: Selection::default(),
        }
    }

    // ---- Pages ----

    /// Append a page at the end of the page order and make it active
    pub fn add_page(&mut self, label: Option<&str>) -> PageId {
        let page = Page::new(self.page_order.len() + 1, label);
        let id = page.id.clone();
        info!("Added page {} ({})", page.index, page.label);

        self.pages.insert(id.clone(), page);
        self.page_order.push(id.clone());
        self.active_page_id = id.clone();
        id
    }

    /// Switch the active page; unknown ids are ignored
    pub fn go_to_page(&mut self, page_id: &PageId) {
        if self.pages.contains_key(page_id) {
            self.active_page_id = page_id.clone();
        }
    }

    /// Change a page label; ignored for unknown pages or an unchanged label
    pub fn rename_page(&mut self, page_id: &PageId, label: &str) {
        let Some(page) = self.pages.get_mut(page_id) else {
            return;
        };
        if page.label == label {
            return;
        }
        page.label = label.to_string();
        page.updated_at = Utc::now();
    }

    pub fn active_page_id(&self) -> &PageId {
        &self.active_page_id
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.pages.get(&self.active_page_id)
    }

    pub fn page(&self, page_id: &PageId) -> Option<&Page> {
        self.pages.get(page_id)
    }

    /// Pages in page order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.page_order.iter().filter_map(|id| self.pages.get(id))
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    // ---- Regions ----

    /// Create a pending region on `page_id`, or on the active page
    pub fn stage_region(
        &mut self,
        bounds: Bounds,
        page_id: Option<&PageId>,
    ) -> Result<Region, CaptureError> {
        let target = page_id.unwrap_or(&self.active_page_id).clone();
        let Some(page) = self.pages.get_mut(&target) else {
            return Err(CaptureError::PageNotFound(target));
        };

        let region = Region::new(target, bounds);
        page.region_ids.push(region.id.clone());
        page.updated_at = Utc::now();

        debug!(
            "Staged region {} on page {} at ({:.0}, {:.0}) {:.0}x{:.0}",
            region.id, page.index, bounds.x, bounds.y, bounds.width, bounds.height
        );

        self.regions.insert(region.id.clone(), region.clone());
        Ok(region)
    }

    /// Replace a region's tokens with the result of a finished recognition pass
    ///
    /// The sum is recomputed from the whole new list and the region becomes
    /// complete. This is the only way into `Complete`.
    pub fn update_region_tokens(&mut self, region_id: &RegionId, tokens: Vec<Token>) {
        let Some(region) = self.regions.get_mut(region_id) else {
            return;
        };
        region.sum = sum_tokens(&tokens);
        region.tokens = tokens;
        region.status = RegionStatus::Complete;
        region.updated_at = Utc::now();

        debug!(
            "Region {} complete: {} tokens, sum {:.2}",
            region_id,
            region.tokens.len(),
            region.sum
        );
    }

    /// Set a region's status, returning whether anything changed
    ///
    /// `Complete` is refused here; it can only be reached through
    /// [`update_region_tokens`](Self::update_region_tokens).
    pub fn set_region_status(&mut self, region_id: &RegionId, status: RegionStatus) -> bool {
        if status == RegionStatus::Complete {
            warn!("Refusing to mark region {} complete without tokens", region_id);
            return false;
        }
        let Some(region) = self.regions.get_mut(region_id) else {
            return false;
        };
        if region.status == status {
            return false;
        }
        region.status = status;
        region.updated_at = Utc::now();
        true
    }

    /// Override a token's value and sign, then re-aggregate the region
    pub fn correct_token(
        &mut self,
        region_id: &RegionId,
        token_id: &TokenId,
        correction: TokenCorrection,
    ) -> bool {
        let Some(region) = self.regions.get_mut(region_id) else {
            return false;
        };
        let Some(token) = region.tokens.iter_mut().find(|t| &t.id == token_id) else {
            return false;
        };

        token.normalized_value = correction.value.map(f64::abs);
        token.is_negative = correction.is_negative;
        token.corrected_by_user = true;

        region.sum = sum_tokens(&region.tokens);
        region.updated_at = Utc::now();
        true
    }

    /// Delete a region, detaching it from its page and the selection
    pub fn remove_region(&mut self, region_id: &RegionId) -> Option<Region> {
        let region = self.regions.remove(region_id)?;

        if let Some(page) = self.pages.get_mut(&region.page_id) {
            page.region_ids.retain(|id| id != region_id);
            page.updated_at = Utc::now();
        }

        self.selection.region_ids.retain(|id| id != region_id);
        self.selection
            .token_ids
            .retain(|id| !region.tokens.iter().any(|t| &t.id == id));

        debug!("Removed region {}", region_id);
        Some(region)
    }

    /// Remove the most recently captured region of the active page
    pub fn undo_last_region(&mut self) -> Option<Region> {
        let last = self.active_page()?.region_ids.last()?.clone();
        self.remove_region(&last)
    }

    pub fn region(&self, region_id: &RegionId) -> Option<&Region> {
        self.regions.get(region_id)
    }

    /// All regions, in no particular order
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Regions of a page in capture order
    pub fn page_regions(&self, page_id: &PageId) -> Vec<&Region> {
        self.pages
            .get(page_id)
            .map(|page| {
                page.region_ids
                    .iter()
                    .filter_map(|id| self.regions.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of regions currently waiting for recognition
    pub fn pending_region_ids(&self) -> Vec<RegionId> {
        self.regions
            .values()
            .filter(|region| region.status == RegionStatus::Pending)
            .map(|region| region.id.clone())
            .collect()
    }

    // ---- Selection ----

    /// Add or remove a region from the selection; unknown regions are ignored
    pub fn toggle_region_selection(&mut self, region_id: &RegionId) {
        if let Some(pos) = self.selection.region_ids.iter().position(|id| id == region_id) {
            self.selection.region_ids.remove(pos);
        } else if self.regions.contains_key(region_id) {
            self.selection.region_ids.push(region_id.clone());
        }
    }

    pub fn reset_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ---- Totals ----

    /// Sum of the region sums listed under a page (0 for unknown pages)
    pub fn page_total(&self, page_id: &PageId) -> f64 {
        self.page_regions(page_id).iter().map(|region| region.sum).sum()
    }

    /// Sum of every page total, in page order
    pub fn grand_total(&self) -> f64 {
        self.page_order.iter().map(|id| self.page_total(id)).sum()
    }

    /// Sum of the selected regions
    pub fn selection_total(&self) -> f64 {
        self.selection
            .region_ids
            .iter()
            .filter_map(|id| self.regions.get(id))
            .map(|region| region.sum)
            .sum()
    }
}
