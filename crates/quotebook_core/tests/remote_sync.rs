//! Remote sync integration tests.
//!
//! Serves a mocked feed with axum and exercises the HTTP adapter, the
//! shared reconciler and the scheduler against it.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use quotebook_core::{
    reconcile_shared, start_sync, HttpRemoteSource, MemoryKeyValueStore, Quote, QuoteService,
    RemoteSource, ServiceError, ServiceOptions, SyncError, SyncEvent, SyncResult,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn feed() -> serde_json::Value {
    json!((1..=8)
        .map(|id| json!({ "userId": 1, "id": id, "title": format!("post {id}"), "body": "..." }))
        .collect::<Vec<_>>())
}

/// Bind to port 0 and return the base URL.
async fn start_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn feed_server() -> String {
    start_server(Router::new().route("/posts", get(|| async { Json(feed()) }))).await
}

fn empty_service() -> QuoteService<MemoryKeyValueStore, MemoryKeyValueStore> {
    QuoteService::open(
        MemoryKeyValueStore::new(),
        MemoryKeyValueStore::new(),
        ServiceOptions {
            seed_starter_quotes: false,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn http_source_maps_first_five_titles() {
    let base = feed_server().await;
    let source = HttpRemoteSource::new(format!("{base}/posts")).unwrap();

    let quotes = source.fetch_remote().await.unwrap();
    assert_eq!(quotes.len(), 5);
    assert_eq!(quotes[0], Quote::new("post 1", "Server").unwrap());
    assert_eq!(quotes[4].text, "post 5");
}

#[tokio::test]
async fn http_source_reports_error_status() {
    let base = start_server(Router::new().route(
        "/posts",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    ))
    .await;
    let source = HttpRemoteSource::new(format!("{base}/posts")).unwrap();

    let err = source.fetch_remote().await.unwrap_err();
    assert!(matches!(err, SyncError::Status(503)));
}

#[tokio::test]
async fn http_source_reports_malformed_payload() {
    let base = start_server(Router::new().route("/posts", get(|| async { "not json" }))).await;
    let source = HttpRemoteSource::new(format!("{base}/posts")).unwrap();

    let err = source.fetch_remote().await.unwrap_err();
    assert!(matches!(err, SyncError::Payload(_)));
}

#[tokio::test]
async fn http_source_times_out() {
    let base = start_server(Router::new().route(
        "/posts",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(feed())
        }),
    ))
    .await;
    let source = HttpRemoteSource::with_options(
        format!("{base}/posts"),
        "Server",
        5,
        Duration::from_millis(100),
    )
    .unwrap();

    let err = source.fetch_remote().await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout(_)));
}

#[tokio::test]
async fn http_source_reports_connection_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpRemoteSource::new(format!("http://{addr}/posts")).unwrap();
    let err = source.fetch_remote().await.unwrap_err();
    assert!(matches!(err, SyncError::Http(_)));
}

#[tokio::test]
async fn reconcile_shared_merges_http_feed_once() {
    let base = feed_server().await;
    let source = HttpRemoteSource::new(format!("{base}/posts")).unwrap();
    let service = empty_service().into_shared();

    service.lock().await.add_quote("local", "Life").unwrap();
    assert_eq!(reconcile_shared(&service, &source).await.unwrap(), 5);
    assert_eq!(reconcile_shared(&service, &source).await.unwrap(), 0);

    let guard = service.lock().await;
    assert_eq!(guard.quotes().len(), 6);
    assert_eq!(guard.categories(), vec!["Life", "Server"]);
}

struct CountingSource {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl RemoteSource for CountingSource {
    fn source_id(&self) -> &str {
        "counting"
    }

    async fn fetch_remote(&self) -> SyncResult<Vec<Quote>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SyncError::Status(500));
        }
        Ok(vec![Quote::new(format!("remote {call}"), "Server").unwrap()])
    }
}

#[tokio::test]
async fn reconcile_shared_surfaces_sync_error() {
    let service = empty_service().into_shared();
    let source = CountingSource {
        calls: AtomicUsize::new(0),
        fail: true,
    };

    let err = reconcile_shared(&service, &source).await.unwrap_err();
    assert!(matches!(err, ServiceError::Sync(SyncError::Status(500))));
    assert!(service.lock().await.quotes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scheduler_runs_immediately_then_on_interval() {
    let service = empty_service().into_shared();
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        fail: false,
    });

    let handle = start_sync(
        Arc::clone(&service),
        Arc::clone(&source),
        Duration::from_secs(30),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.cycles(), 1);
    assert_eq!(service.lock().await.quotes().len(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.cycles(), 3);

    handle.stop().await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.lock().await.quotes().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn scheduler_keeps_running_after_failed_cycles() {
    let service = empty_service().into_shared();
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        fail: true,
    });

    let mut handle = start_sync(
        Arc::clone(&service),
        Arc::clone(&source),
        Duration::from_secs(10),
    )
    .unwrap();
    tokio::time::sleep(Duration::from_secs(25)).await;

    assert_eq!(handle.cycles(), 3);
    assert!(!handle.is_finished());
    for _ in 0..3 {
        let event = handle.events().try_recv().unwrap();
        assert!(matches!(
            event,
            SyncEvent::Failed(ServiceError::Sync(SyncError::Status(500)))
        ));
    }
    handle.stop().await;
    assert!(service.lock().await.quotes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn scheduler_reports_each_cycle_outcome() {
    let service = empty_service().into_shared();
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
        fail: false,
    });

    let mut handle = start_sync(
        Arc::clone(&service),
        Arc::clone(&source),
        Duration::from_secs(5),
    )
    .unwrap();

    let first = handle.events().recv().await.unwrap();
    assert!(matches!(first, SyncEvent::Synced { added: 1 }));
    let second = handle.events().recv().await.unwrap();
    assert!(matches!(second, SyncEvent::Synced { added: 1 }));

    handle.stop().await;
    assert_eq!(service.lock().await.quotes().len(), 2);
}
