//! Page window over the filtered archive listing.

use serde::Serialize;

/// Default number of archived records per page.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Maximum number of archived records per page.
pub const MAX_PER_PAGE: u32 = 200;

/// Clamp a requested page size to valid bounds.
pub fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}

/// Current page window plus the server-reported total.
///
/// Fields are private so `page >= 1` and `1 <= per_page <= MAX_PER_PAGE`
/// hold for every value. `total` is only ever written from a listing
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    page: u32,
    per_page: u32,
    total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl Pagination {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: clamp_per_page(per_page),
            total: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages for the current total (at least one).
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Zero-based offset of the first record on the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Same window, back on page 1.
    pub fn first_page(self) -> Self {
        Self { page: 1, ..self }
    }

    /// Move to `page` (values below 1 become 1).
    pub fn with_page(self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }

    /// Change the page size. The page resets to 1 because the old page
    /// number no longer addresses the same records.
    pub fn with_per_page(self, per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: clamp_per_page(per_page),
            ..self
        }
    }

    /// Record the total reported by the server.
    pub fn with_total(self, total: u64) -> Self {
        Self { total, ..self }
    }

    /// Returns the last valid page if the current one lies beyond it.
    pub fn out_of_range_fallback(&self) -> Option<u32> {
        let last = self.total_pages();
        (self.page > last).then_some(last)
    }
}
