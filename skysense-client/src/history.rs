use std::sync::Arc;

use skysense_api::models::{Id, Reading};
use skysense_api::restful::PageCursor;

use crate::api::TelemetrySource;
use crate::error::{Error, Result};
use crate::guard::SessionGuard;
use crate::storage::LocalStorage;

/// Screen-owned cursor over one station's historical readings.
///
/// Pages are 1-based and replace the loaded entries wholesale. Page numbers
/// floor at one on the way down; going past the end is not pre-validated
/// because the server answers those requests with empty pages.
pub struct HistoryPager<S: LocalStorage> {
    source: Arc<dyn TelemetrySource>,
    guard: Arc<SessionGuard<S>>,
    device_id: Option<Id>,
    cursor: Option<PageCursor>,
    entries: Vec<Reading>,
}

impl<S: LocalStorage> HistoryPager<S> {
    pub fn new(source: Arc<dyn TelemetrySource>, guard: Arc<SessionGuard<S>>) -> Self {
        Self {
            source,
            guard,
            device_id: None,
            cursor: None,
            entries: Vec::new(),
        }
    }

    /// Retargets the pager: loaded entries are dropped and the cursor
    /// resets so the next load starts from page one. Setting the same
    /// device again keeps the current position.
    pub fn set_device(&mut self, device_id: Id) {
        if self.device_id == Some(device_id) {
            return;
        }

        self.device_id = Some(device_id);
        self.cursor = None;
        self.entries.clear();
    }

    pub fn device(&self) -> Option<Id> {
        self.device_id
    }

    /// Newest-first entries of the page loaded last.
    pub fn entries(&self) -> &[Reading] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<PageCursor> {
        self.cursor
    }

    /// Fetches `page` (floored at one) for the targeted device. Without a
    /// target this is a logged no-op, matching a screen that opened before
    /// any station was selected.
    pub async fn load_page(&mut self, page: u32) -> Result<()> {
        let Some(device_id) = self.device_id else {
            tracing::warn!("history page requested with no device selected");
            return Ok(());
        };

        let token = self
            .guard
            .store()
            .token()
            .await?
            .ok_or_else(|| Error::auth("no session token"))?;

        let page = page.max(1);
        let response = match self.source.device_history(&token, device_id, page).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_auth() {
                    self.guard.on_auth_failure().await;
                }
                return Err(err);
            }
        };

        self.entries = response.entries;
        self.cursor = Some(response.cursor);

        Ok(())
    }

    /// One page forward; past the end the server hands back empty pages.
    pub async fn next_page(&mut self) -> Result<()> {
        let page = self.cursor.map_or(1, |cursor| cursor.current_page + 1);
        self.load_page(page).await
    }

    /// One page back, floored at page one.
    pub async fn prev_page(&mut self) -> Result<()> {
        let page = self
            .cursor
            .map_or(1, |cursor| cursor.current_page.saturating_sub(1));
        self.load_page(page).await
    }
}
