//! Router-level tests for `/search` against an in-memory product store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use prodsearch_server::db::{DbError, ProductStore, SEARCH_PRODUCTS_SQL};
use prodsearch_server::{router, AppState};

#[derive(Clone, Copy, Default)]
enum Failure {
    #[default]
    None,
    Query,
    Scan,
    Hang,
}

/// Product table stand-in. Matches `%x%` patterns by substring.
#[derive(Default)]
struct FakeCatalog {
    names: RwLock<Vec<String>>,
    statements: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
    failure: Failure,
}

impl FakeCatalog {
    fn with_names(names: &[&str]) -> Self {
        Self {
            names: RwLock::new(names.iter().map(|n| n.to_string()).collect()),
            ..Default::default()
        }
    }

    fn failing(failure: Failure) -> Self {
        Self {
            failure,
            ..Self::with_names(&["Widget"])
        }
    }

    fn insert(&self, name: &str) {
        self.names.write().unwrap().push(name.to_string());
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductStore for FakeCatalog {
    async fn fetch_names(&self, sql: &'static str, pattern: &str) -> Result<Vec<String>, DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), pattern.to_string()));

        match self.failure {
            Failure::None => {}
            Failure::Query => {
                return Err(DbError::Query(sqlx::Error::Protocol(
                    "connection reset".into(),
                )))
            }
            Failure::Scan => {
                return Err(DbError::Scan(sqlx::Error::ColumnNotFound("name".into())))
            }
            Failure::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }

        let needle = pattern.trim_start_matches('%').trim_end_matches('%');
        Ok(self
            .names
            .read()
            .unwrap()
            .iter()
            .filter(|name| name.contains(needle))
            .cloned()
            .collect())
    }
}

fn app(store: Arc<FakeCatalog>) -> Router {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    router(AppState::new(store))
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, String, Option<String>) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap(), content_type)
}

#[tokio::test]
async fn lists_matching_products() {
    let store = Arc::new(FakeCatalog::with_names(&["Blue Widget", "Red Widget", "Gadget"]));
    let (status, body, content_type) = send(app(store), "GET", "/search?query=Widget").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(
        body,
        "Found product: Blue Widget\nFound product: Red Widget\n"
    );
}

#[tokio::test]
async fn no_matches_is_empty_ok() {
    let store = Arc::new(FakeCatalog::with_names(&["Gadget"]));
    let (status, body, _) = send(app(store), "GET", "/search?query=zzz").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn markup_in_names_is_escaped() {
    let store = Arc::new(FakeCatalog::with_names(&[
        "<script>alert(1)</script>",
        "Salt & Pepper <Deluxe>",
    ]));

    let (_, body, _) = send(app(store.clone()), "GET", "/search?query=script").await;
    assert_eq!(
        body,
        "Found product: &lt;script&gt;alert(1)&lt;/script&gt;\n"
    );

    let (_, body, _) = send(app(store), "GET", "/search?query=Pepper").await;
    assert_eq!(body, "Found product: Salt &amp; Pepper &lt;Deluxe&gt;\n");
    assert!(!body.contains('<'));
    assert!(!body.contains('>'));
}

#[tokio::test]
async fn injection_attempts_never_change_statement_text() {
    let store = Arc::new(FakeCatalog::with_names(&["Widget"]));
    let hostile = [
        "%27%20OR%20%271%27%3D%271",        // ' OR '1'='1
        "%25",                              // %
        "x%27%3B%20DROP%20TABLE%20products%3B%20--", // x'; DROP TABLE products; --
        "--",
    ];

    for q in hostile {
        let (status, _, _) = send(app(store.clone()), "GET", &format!("/search?query={q}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let statements = store.statements.lock().unwrap();
    assert_eq!(statements.len(), hostile.len());
    assert!(statements.iter().all(|(sql, _)| sql == SEARCH_PRODUCTS_SQL));
    assert_eq!(statements[0].1, "%' OR '1'='1%");
    assert_eq!(statements[1].1, "%%%");
    assert_eq!(statements[2].1, "%x'; DROP TABLE products; --%");
    assert_eq!(statements[3].1, "%--%");
}

#[tokio::test]
async fn missing_query_is_400_without_db_call() {
    let store = Arc::new(FakeCatalog::with_names(&["Widget"]));

    for uri in ["/search", "/search?query=", "/search?q=Widget"] {
        let (status, body, _) = send(app(store.clone()), "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(body, "Query parameter is missing");
    }

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn repeated_query_parameter_searches_first_value() {
    let store = Arc::new(FakeCatalog::with_names(&["Blue Widget", "Gadget"]));
    let (status, body, _) = send(app(store.clone()), "GET", "/search?query=Widget&query=Gadget").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Found product: Blue Widget\n");
    assert_eq!(store.calls(), 1);
    assert_eq!(store.statements.lock().unwrap()[0].1, "%Widget%");
}

#[tokio::test]
async fn whitespace_query_is_searched() {
    let store = Arc::new(FakeCatalog::with_names(&["Blue Widget", "Gadget"]));

    let (status, body, _) = send(app(store.clone()), "GET", "/search?query=%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Found product: Blue Widget\n");

    let (status, _, _) = send(app(store.clone()), "GET", "/search?query=%20%20").await;
    assert_eq!(status, StatusCode::OK);

    let statements = store.statements.lock().unwrap();
    assert_eq!(statements[0].1, "% %");
    assert_eq!(statements[1].1, "%  %");
}

#[tokio::test]
async fn overlong_query_is_400_without_db_call() {
    let store = Arc::new(FakeCatalog::with_names(&["Widget"]));
    let uri = format!("/search?query={}", "a".repeat(300));

    let (status, _, _) = send(app(store.clone()), "GET", &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn non_get_methods_rejected_without_db_call() {
    let store = Arc::new(FakeCatalog::with_names(&["Widget"]));

    for method in ["POST", "PUT", "DELETE", "PATCH"] {
        let (status, body, _) = send(app(store.clone()), method, "/search?query=Widget").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method: {method}");
        assert_eq!(body, "Method is not supported.");
    }

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn query_failure_is_500() {
    let store = Arc::new(FakeCatalog::failing(Failure::Query));
    let (status, body, _) = send(app(store), "GET", "/search?query=Widget").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Query failed");
}

#[tokio::test]
async fn scan_failure_is_500_with_no_partial_listing() {
    let store = Arc::new(FakeCatalog::failing(Failure::Scan));
    let (status, body, _) = send(app(store), "GET", "/search?query=Widget").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("Found product"));
}

#[tokio::test]
async fn server_keeps_serving_after_failure() {
    let failing = app(Arc::new(FakeCatalog::failing(Failure::Scan)));
    let (status, _, _) = send(failing.clone(), "GET", "/search?query=Widget").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _, _) = send(failing, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn slow_query_hits_deadline() {
    let store = Arc::new(FakeCatalog::failing(Failure::Hang));
    let app = router(AppState::new(store).with_query_timeout(Duration::from_secs(2)));

    let (status, body, _) = send(app, "GET", "/search?query=Widget").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, "Query timed out");
}

#[tokio::test]
async fn inserted_name_is_found_by_substring() {
    let store = Arc::new(FakeCatalog::default());
    store.insert("Tom & Jerry <Collector's Edition>");

    let (status, body, _) = send(app(store), "GET", "/search?query=Jerry").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "Found product: Tom &amp; Jerry &lt;Collector&#39;s Edition&gt;\n"
    );
}

#[tokio::test]
async fn concurrent_searches_get_their_own_results() {
    let names: Vec<String> = (0..100).map(|i| format!("item-{i:03}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let app = app(Arc::new(FakeCatalog::with_names(&refs)));

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let uri = format!("/search?query=item-{i:03}");
                (i, send(app, "GET", &uri).await)
            })
        })
        .collect();

    for handle in handles {
        let (i, (status, body, _)) = handle.await.expect("task panicked");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("Found product: item-{i:03}\n"));
    }
}

#[tokio::test]
async fn health_reports_version() {
    let store = Arc::new(FakeCatalog::default());
    let (status, body, _) = send(app(store), "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
