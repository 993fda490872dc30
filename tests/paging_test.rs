//! Integration tests for the result paging engine.
//!
//! These drive `QueryResults` through its public API with in-process
//! executors, covering:
//!
//! - Deduplication of concurrent fetches on a multi-threaded runtime
//! - Embedded limit/offset handling across pages
//! - Cleanup when a caller gives up on a fetch
//! - A shared fetch outliving the caller that started it
//! - Session resets racing with outstanding fetches

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jsql_console::client::{ColumnMeta, ResultRow, SelectResponse};
use jsql_console::{ClientError, JsqlQuery, PagingError, QueryResults};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

fn jsql(value: Value) -> JsqlQuery {
    JsqlQuery::try_from(value).unwrap()
}

fn meta() -> Vec<ColumnMeta> {
    vec![ColumnMeta {
        name: "id".to_string(),
        data_type: "INTEGER".to_string(),
        nullable: false,
        qualified_name: "t.id".to_string(),
    }]
}

fn rows(start: u64, count: u64) -> Vec<ResultRow> {
    (start..start + count)
        .map(|i| {
            let mut row = Map::new();
            row.insert("id".to_string(), Value::from(i));
            row
        })
        .collect()
}

fn window_of(query: &JsqlQuery) -> (u64, u64) {
    let limit = query.get("limit").and_then(Value::as_u64).unwrap_or(0);
    let offset = query.get("offset").and_then(Value::as_u64).unwrap_or(0);
    (limit, offset)
}

/// Serve a virtual table of `total` rows, slowly.
async fn slow_table(
    total: u64,
    delay: Duration,
    query: JsqlQuery,
) -> Result<SelectResponse, ClientError> {
    tokio::time::sleep(delay).await;
    let (limit, offset) = window_of(&query);
    let start = offset.min(total);
    let end = (offset + limit).min(total);
    Ok(SelectResponse {
        meta: meta(),
        data: rows(start, end - start),
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_fetch() {
    let results = QueryResults::new();
    results.reset(JsqlQuery::default()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let results = results.clone();
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            results
                .load_page(
                    move |query| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        slow_table(1000, Duration::from_millis(50), query)
                    },
                    0,
                )
                .await
        }));
    }

    for handle in handles {
        let page = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(page.rows.len(), 100);
        assert_eq!(page.last_row, None);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.rows().len(), 100);
    assert!(!results.is_loading());
    assert_eq!(results.active_requests(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_offsets_fetch_in_parallel() {
    let results = QueryResults::new();
    results.reset(JsqlQuery::default()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let load = |offset: u64| {
        let results = results.clone();
        let calls = Arc::clone(&calls);
        async move {
            results
                .load_page(
                    move |query| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        slow_table(1000, Duration::from_millis(20), query)
                    },
                    offset,
                )
                .await
        }
    };

    let (a, b, c) = tokio::join!(load(0), load(100), load(200));
    assert!(a.unwrap().is_some());
    assert!(b.unwrap().is_some());
    assert!(c.unwrap().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(results.loaded_row_count(), 300);
    assert_eq!(results.cached_pages(), 3);
}

#[tokio::test]
async fn embedded_window_is_honoured_across_pages() {
    let results = QueryResults::new();
    results
        .reset(jsql(json!({"from": "t", "limit": 10, "offset": 20})))
        .unwrap();
    assert_eq!(results.page_size(), 10);
    assert_eq!(results.base_offset(), 20);

    let sent = Arc::new(Mutex::new(Vec::new()));
    for page_offset in [0u64, 10, 20] {
        let sent = Arc::clone(&sent);
        let page = results
            .load_page(
                move |query| {
                    sent.lock().push(window_of(&query));
                    slow_table(45, Duration::ZERO, query)
                },
                page_offset,
            )
            .await
            .unwrap();
        assert!(page.is_some());
    }

    assert_eq!(*sent.lock(), vec![(10, 20), (10, 30), (10, 40)]);
    // Absolute rows 20..45 exist: two full pages then a short one.
    assert_eq!(results.rows().len(), 25);
    assert!(!results.has_more());
    assert_eq!(results.loaded_row_count(), 25);
}

#[tokio::test]
async fn short_page_reports_last_row_and_stops_fetching() {
    let results = QueryResults::new();
    results.reset(JsqlQuery::default()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let (session, counter) = (&results, &calls);

    let fetch = move |offset: u64| {
        let calls = Arc::clone(counter);
        session.load_page(
            move |query| {
                calls.fetch_add(1, Ordering::SeqCst);
                slow_table(140, Duration::ZERO, query)
            },
            offset,
        )
    };

    assert_eq!(fetch(0).await.unwrap().unwrap().last_row, None);
    let second = fetch(100).await.unwrap().unwrap();
    assert_eq!(second.rows.len(), 40);
    assert_eq!(second.last_row, Some(140));

    assert!(fetch(140).await.unwrap().is_none());
    assert!(fetch(0).await.unwrap().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn abandoned_fetch_releases_its_slot() {
    let results = QueryResults::new();
    results.reset(JsqlQuery::default()).unwrap();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        results.load_page(
            |_query| futures::future::pending::<Result<SelectResponse, ClientError>>(),
            0,
        ),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(!results.is_loading());

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in = Arc::clone(&calls);
    let page = results
        .load_page(
            move |query| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                slow_table(10, Duration::ZERO, query)
            },
            0,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.rows.len(), 10);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Executor over a 1000-row table that counts its calls.
fn counted(calls: &Arc<AtomicUsize>) -> impl FnOnce(JsqlQuery) -> Fut + Send + 'static {
    let calls = Arc::clone(calls);
    move |query| -> Fut {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(slow_table(1000, Duration::ZERO, query))
    }
}

type Fut = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<SelectResponse, ClientError>> + Send>,
>;

#[tokio::test]
async fn shared_fetch_outlives_the_caller_that_started_it() {
    let results = QueryResults::new();
    results.reset(JsqlQuery::default()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let (release, gate) = tokio::sync::oneshot::channel::<()>();

    let gated = {
        let calls = Arc::clone(&calls);
        move |query: JsqlQuery| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let _ = gate.await;
                slow_table(1000, Duration::ZERO, query).await
            }
        }
    };
    let mut first = Box::pin(results.load_page(gated, 0));
    assert!(futures::poll!(first.as_mut()).is_pending());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let spawn_load = || {
        let results = results.clone();
        let execute = counted(&calls);
        tokio::spawn(async move { results.load_page(execute, 0).await })
    };

    let joiner = spawn_load();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    // The starting caller goes away while another is still waiting.
    drop(first);
    assert!(results.is_loading());
    assert_eq!(results.active_requests(), 1);

    let late = spawn_load();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    release.send(()).unwrap();

    let joined = joiner.await.unwrap().unwrap().unwrap();
    let again = late.await.unwrap().unwrap().unwrap();
    assert_eq!(joined.rows.len(), 100);
    assert_eq!(joined, again);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!results.is_loading());
    assert_eq!(results.cached_pages(), 1);
}

#[tokio::test]
async fn failure_is_shared_then_retryable() {
    let results = QueryResults::new();
    results.reset(JsqlQuery::default()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let failing = |calls: Arc<AtomicUsize>| {
        move |_query: JsqlQuery| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err::<SelectResponse, _>(ClientError::ApiError("HTTP 500: boom".to_string()))
        }
    };

    let (a, b) = tokio::join!(
        results.load_page(failing(Arc::clone(&calls)), 0),
        results.load_page(failing(Arc::clone(&calls)), 0),
    );
    assert!(matches!(a, Err(PagingError::Execute(_))));
    assert!(matches!(b, Err(PagingError::Execute(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(results.cached_pages(), 0);
    assert!(!results.is_loading());

    let page = results
        .load_page(|query| slow_table(5, Duration::ZERO, query), 0)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.rows.len(), 5);
    assert_eq!(page.last_row, Some(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reset_during_fetch_keeps_new_session_clean() {
    let results = QueryResults::new();
    results.reset(jsql(json!({"from": "old"}))).unwrap();

    let pending = {
        let results = results.clone();
        tokio::spawn(async move {
            results
                .load_page(
                    |query| slow_table(1000, Duration::from_millis(100), query),
                    0,
                )
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    results.reset(jsql(json!({"from": "new"}))).unwrap();
    let version = results.request_version();

    let stale = pending.await.unwrap().unwrap().unwrap();
    assert_eq!(stale.rows.len(), 100);

    assert_eq!(results.request_version(), version);
    assert!(results.rows().is_empty());
    assert!(results.meta().is_empty());
    assert_eq!(results.loaded_row_count(), 0);
    assert_eq!(results.cached_pages(), 0);
    assert!(results.has_more());
    assert_eq!(
        results.base_query().and_then(|q| q.get("from").cloned()),
        Some(json!("new"))
    );
}

#[tokio::test]
async fn invalid_offset_is_rejected_without_mutation() {
    let results = QueryResults::new();
    results.reset(jsql(json!({"from": "t"}))).unwrap();
    let version = results.request_version();

    let err = results.reset(jsql(json!({"offset": 1.5}))).unwrap_err();
    assert_eq!(err.field(), Some("offset"));
    assert_eq!(results.request_version(), version);
    assert_eq!(
        results.base_query().and_then(|q| q.get("from").cloned()),
        Some(json!("t"))
    );
}
