//! Incremental result paging.
//!
//! A [`QueryResults`] session turns one base query into a sequence of pages
//! fetched on demand. Pages are cached by offset, concurrent requests for the
//! same offset share a single fetch, and rows that arrive in order are
//! assembled into one contiguous result set.
//!
//! ```no_run
//! # use jsql_console::query::{JsqlQuery, QueryExecutor};
//! # use jsql_console::results::QueryResults;
//! # async fn demo(executor: QueryExecutor) -> jsql_console::Result<()> {
//! let results = QueryResults::new();
//! results.reset(JsqlQuery::parse(r#"{"from": "users"}"#)?)?;
//!
//! let exec = executor.clone();
//! let first = results
//!     .load_page(move |jsql| async move { exec.execute_jsql(jsql, None).await }, 0)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! All session state sits behind one mutex that is never held across an
//! `.await`. The "is this offset already being fetched" check and the
//! registration of a new fetch happen in the same critical section.

mod accumulator;
mod cache;

pub use accumulator::ResultAccumulator;
pub use cache::PageCache;

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::client::{ClientError, ColumnMeta, ResultRow, SelectResponse};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::PagingError;
use crate::query::{with_paging, JsqlQuery, PageWindow};

/// One page handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPage {
    pub rows: Vec<ResultRow>,
    /// Row index at end of data, once the data is known to be exhausted.
    pub last_row: Option<u64>,
}

type PageFuture = BoxFuture<'static, Result<ResultsPage, PagingError>>;
type PageFetch = Shared<PageFuture>;

enum Step {
    Ready(Option<ResultsPage>),
    Wait(PageFetch),
}

struct SessionState {
    base_query: Option<JsqlQuery>,
    page_size: u64,
    base_offset: u64,
    accumulator: ResultAccumulator,
    cache: PageCache<WeakShared<PageFuture>>,
    request_version: u64,
    active_requests: u64,
    next_fetch_id: u64,
}

impl SessionState {
    fn new(page_size: u64) -> Self {
        Self {
            base_query: None,
            page_size,
            base_offset: 0,
            accumulator: ResultAccumulator::new(),
            cache: PageCache::new(),
            request_version: 0,
            active_requests: 0,
            next_fetch_id: 0,
        }
    }

    fn clear_session(&mut self) {
        self.accumulator = ResultAccumulator::new();
        self.cache.clear();
        self.active_requests = 0;
        self.request_version += 1;
    }
}

/// Releases a fetch's hold on the session when dropped: retires its
/// in-flight entry and decrements the active-fetch counter.
///
/// Owned by the shared fetch future, so it goes when the fetch finishes or
/// when the last caller waiting on it is dropped. Does nothing once the
/// session it was taken from has been reset or cleared.
struct FetchGuard {
    state: Arc<Mutex<SessionState>>,
    version: u64,
    page_offset: u64,
    fetch_id: u64,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.request_version != self.version {
            return;
        }
        state.cache.finish(self.page_offset, self.fetch_id);
        state.active_requests = state.active_requests.saturating_sub(1);
    }
}

/// Paging session for one query's results.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct QueryResults {
    state: Arc<Mutex<SessionState>>,
    default_page_size: u64,
}

impl Default for QueryResults {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("QueryResults")
            .field("has_session", &state.base_query.is_some())
            .field("page_size", &state.page_size)
            .field("base_offset", &state.base_offset)
            .field("rows", &state.accumulator.rows().len())
            .field("has_more", &state.accumulator.has_more())
            .field("inflight", &state.cache.inflight_len())
            .field("request_version", &state.request_version)
            .finish()
    }
}

impl QueryResults {
    /// Create an empty session using the default page size of 100 rows.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty session with a custom default page size.
    pub fn with_page_size(default_page_size: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new(default_page_size))),
            default_page_size,
        }
    }

    /// Start a new session for `query`.
    ///
    /// Fails without touching any state if the query's `limit` or `offset`
    /// is not a non-negative integer.
    pub fn reset(&self, query: JsqlQuery) -> Result<(), PagingError> {
        let paged = with_paging(&query, self.default_page_size, 0)?;

        let mut state = self.state.lock();
        state.base_query = Some(query);
        state.page_size = paged.window.limit;
        state.base_offset = paged.window.base_offset;
        state.clear_session();

        info!(
            page_size = state.page_size,
            base_offset = state.base_offset,
            request_version = state.request_version,
            "Results session reset"
        );
        Ok(())
    }

    /// End the current session. Later page loads fail until the next reset.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.base_query = None;
        state.page_size = self.default_page_size;
        state.base_offset = 0;
        state.clear_session();
        debug!(request_version = state.request_version, "Results session cleared");
    }

    /// Load the page starting `page_offset` rows into the session.
    ///
    /// Returns `Ok(None)` without calling `execute` once the data is known to
    /// be exhausted. Cached pages are returned directly; a page already being
    /// fetched is awaited rather than fetched again. Otherwise `execute` is
    /// called with the base query rewritten for this page's window.
    pub async fn load_page<F, Fut>(
        &self,
        execute: F,
        page_offset: u64,
    ) -> Result<Option<ResultsPage>, PagingError>
    where
        F: FnOnce(JsqlQuery) -> Fut + Send + 'static,
        Fut: Future<Output = Result<SelectResponse, ClientError>> + Send + 'static,
    {
        let fetch = match self.begin(execute, page_offset)? {
            Step::Ready(page) => return Ok(page),
            Step::Wait(fetch) => fetch,
        };

        let result = fetch.await;
        if let Err(ref e) = result {
            error!(page_offset, error = %e, "Failed to load query results page");
        }
        result.map(Some)
    }

    /// Locked half of [`load_page`](Self::load_page): answer from the
    /// session, join a live fetch, or register a new one.
    fn begin<F, Fut>(&self, execute: F, page_offset: u64) -> Result<Step, PagingError>
    where
        F: FnOnce(JsqlQuery) -> Fut + Send + 'static,
        Fut: Future<Output = Result<SelectResponse, ClientError>> + Send + 'static,
    {
        let mut state = self.state.lock();
        let Some(base_query) = state.base_query.as_ref() else {
            return Err(PagingError::NoActiveSession);
        };

        if !state.accumulator.has_more() {
            return Ok(Step::Ready(None));
        }

        if let Some(rows) = state.cache.get(page_offset) {
            debug!(page_offset, "Results page served from cache");
            let rows = rows.to_vec();
            let last_row = state.accumulator.last_row(page_offset, rows.len());
            return Ok(Step::Ready(Some(ResultsPage { rows, last_row })));
        }

        if let Some(fetch) = state
            .cache
            .get_inflight(page_offset)
            .and_then(|handle| handle.upgrade())
        {
            debug!(page_offset, "Joining in-flight results page fetch");
            return Ok(Step::Wait(fetch));
        }

        let paged = with_paging(base_query, state.page_size, page_offset)?;
        let version = state.request_version;
        let fetch_id = state.next_fetch_id;
        state.next_fetch_id += 1;

        let guard = FetchGuard {
            state: Arc::clone(&self.state),
            version,
            page_offset,
            fetch_id,
        };
        let session = Arc::clone(&self.state);
        let window = paged.window;
        let query = paged.query;
        let fetch = async move {
            let _guard = guard;
            let response = execute(query).await.map_err(PagingError::from)?;
            Ok::<_, PagingError>(complete_fetch(
                &session,
                version,
                fetch_id,
                page_offset,
                &window,
                response,
            ))
        }
        .boxed()
        .shared();

        if let Some(handle) = fetch.downgrade() {
            state.cache.start(page_offset, fetch_id, handle);
        }
        state.active_requests += 1;
        Ok(Step::Wait(fetch))
    }

    /// Contiguous rows loaded so far.
    pub fn rows(&self) -> Vec<ResultRow> {
        self.state.lock().accumulator.rows().to_vec()
    }

    /// Column metadata captured for this session.
    pub fn meta(&self) -> Vec<ColumnMeta> {
        self.state.lock().accumulator.meta().to_vec()
    }

    /// Current results as a select response, `None` while nothing has loaded.
    pub fn results(&self) -> Option<SelectResponse> {
        let state = self.state.lock();
        let acc = &state.accumulator;
        if acc.meta().is_empty() && acc.rows().is_empty() {
            return None;
        }
        Some(SelectResponse {
            meta: acc.meta().to_vec(),
            data: acc.rows().to_vec(),
        })
    }

    /// Rows per page for the current session.
    pub fn page_size(&self) -> u64 {
        self.state.lock().page_size
    }

    /// Offset embedded in the current base query.
    pub fn base_offset(&self) -> u64 {
        self.state.lock().base_offset
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().accumulator.has_more()
    }

    /// Whether at least one fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state.lock().active_requests > 0
    }

    pub fn active_requests(&self) -> u64 {
        self.state.lock().active_requests
    }

    pub fn loaded_row_count(&self) -> u64 {
        self.state.lock().accumulator.loaded_row_count()
    }

    /// Incremented on every reset and clear.
    pub fn request_version(&self) -> u64 {
        self.state.lock().request_version
    }

    pub fn has_session(&self) -> bool {
        self.state.lock().base_query.is_some()
    }

    /// Base query of the current session.
    pub fn base_query(&self) -> Option<JsqlQuery> {
        self.state.lock().base_query.clone()
    }

    /// Number of pages cached in the current session.
    pub fn cached_pages(&self) -> usize {
        self.state.lock().cache.len()
    }
}

/// Apply a successful response to the session it was requested in.
///
/// A response that arrives after the session was reset or cleared is handed
/// back to its callers but not recorded.
fn complete_fetch(
    state: &Mutex<SessionState>,
    version: u64,
    fetch_id: u64,
    page_offset: u64,
    window: &PageWindow,
    response: SelectResponse,
) -> ResultsPage {
    let mut state = state.lock();
    if state.request_version != version {
        debug!(
            page_offset,
            fetched_version = version,
            current_version = state.request_version,
            "Discarding results page from a superseded session"
        );
        let returned = response.data.len() as u64;
        let last_row = (window.limit == 0 || returned < window.limit)
            .then(|| page_offset.saturating_add(returned));
        return ResultsPage {
            rows: response.data,
            last_row,
        };
    }

    let last_row = state.accumulator.apply(page_offset, window, &response);
    state
        .cache
        .complete(page_offset, fetch_id, response.data.clone());

    debug!(
        page_offset,
        rows = response.data.len(),
        loaded_row_count = state.accumulator.loaded_row_count(),
        has_more = state.accumulator.has_more(),
        "Results page loaded"
    );

    ResultsPage {
        rows: response.data,
        last_row,
    }
}
