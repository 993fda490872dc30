//! Assembly of fetched pages into the visible result set.

use crate::client::{ColumnMeta, ResultRow, SelectResponse};
use crate::query::PageWindow;

/// Contiguous rows, column metadata and end-of-data state for one session.
#[derive(Debug, Clone)]
pub struct ResultAccumulator {
    rows: Vec<ResultRow>,
    meta: Vec<ColumnMeta>,
    has_more: bool,
    loaded_row_count: u64,
}

impl Default for ResultAccumulator {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            meta: Vec::new(),
            has_more: true,
            loaded_row_count: 0,
        }
    }
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a successful page fetched for `page_offset` into the result set.
    ///
    /// Returns the end-of-data row index once the data is known to be
    /// exhausted, `None` while more rows may follow.
    pub fn apply(
        &mut self,
        page_offset: u64,
        window: &PageWindow,
        response: &SelectResponse,
    ) -> Option<u64> {
        if self.meta.is_empty() && !response.meta.is_empty() {
            self.meta = response.meta.clone();
        }

        // Only the page that continues the contiguous prefix is spliced in.
        if page_offset == self.rows.len() as u64 {
            self.rows.extend(response.data.iter().cloned());
        }

        let returned = response.data.len() as u64;
        self.loaded_row_count = self
            .loaded_row_count
            .max(page_offset.saturating_add(returned));

        if window.limit == 0 || returned < window.limit {
            self.has_more = false;
        }

        self.last_row(page_offset, response.data.len())
    }

    /// End-of-data row index for a page of `len` rows at `page_offset`, if
    /// the data is exhausted.
    pub fn last_row(&self, page_offset: u64, len: usize) -> Option<u64> {
        if self.has_more {
            None
        } else {
            Some(page_offset.saturating_add(len as u64))
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn meta(&self) -> &[ColumnMeta] {
        &self.meta
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn loaded_row_count(&self) -> u64 {
        self.loaded_row_count
    }
}
