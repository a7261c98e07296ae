use serde::{Deserialize, Serialize};

use crate::models::Reading;

/// Server-side pagination position, 1-based.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// Page this response covers
    pub current_page: u32,
    /// Highest page with content
    pub last_page: u32,
    /// Total readings across all pages
    pub total_items: u64,
}

impl PageCursor {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Readings of the requested page, newest first
    pub entries: Vec<Reading>,
    /// Pagination position
    pub cursor: PageCursor,
}
