//! End-to-end tests for `HttpSource` against a local hyper server.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use datagrid_lib::error::FetchError;
use datagrid_lib::query::FilterState;
use datagrid_lib::query::FilterValue;
use datagrid_lib::query::Query;
use datagrid_lib::source::HttpSource;
use datagrid_lib::source::RecordSource;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;

/// A local server that answers every request with a fixed response.
struct TestServer {
    base: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    async fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    async fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let recorded = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let recorded = recorded.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let recorded = recorded.clone();
                        async move {
                            recorded.lock().unwrap().push(req.uri().to_string());
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .header("Content-Type", "application/json")
                                    .body(Full::new(Bytes::from(body)))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        Self {
            base: format!("http://{}", addr),
            seen,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_fetches_bare_array() {
    let server = TestServer::start(200, r#"[{"id":1,"name":"Ann"},{"id":2,"name":"Bob"}]"#).await;
    let source = HttpSource::new(&server.url("/users")).unwrap();

    let records = source.fetch_records(&Query::default()).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("name"), Some(&json!("Bob")));
    assert_eq!(server.requests(), ["/users"]);
}

#[tokio::test]
async fn test_fetches_data_envelope() {
    let server = TestServer::start(200, r#"{"data":[{"id":"a1"}],"total":1}"#).await;
    let source = HttpSource::new(&server.url("/items")).unwrap();

    let records = source.fetch_records(&Query::default()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id_string().as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_object_without_data_is_empty() {
    let server = TestServer::start(200, r#"{"total":0}"#).await;
    let source = HttpSource::new(&server.url("/items")).unwrap();

    let records = source.fetch_records(&Query::default()).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_sends_search_and_active_filters() {
    let server = TestServer::start(200, "[]").await;
    let source = HttpSource::new(&server.url("/users?limit=50")).unwrap();

    let mut filters = FilterState::new();
    filters.set("city", FilterValue::from("New York"));
    filters.set("role", FilterValue::from(""));
    filters.set("active", FilterValue::from(true));
    source
        .fetch_records(&Query::new("ann lee", filters))
        .await
        .unwrap();

    assert_eq!(
        server.requests(),
        ["/users?limit=50&q=ann+lee&active=true&city=New+York"]
    );
}

#[tokio::test]
async fn test_error_status() {
    let server = TestServer::start(503, "maintenance").await;
    let source = HttpSource::new(&server.url("/users")).unwrap();

    let err = source.fetch_records(&Query::default()).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::Http { status: 503, ref message } if message == "maintenance"
    ));
}

#[tokio::test]
async fn test_invalid_json() {
    let server = TestServer::start(200, "<html>").await;
    let source = HttpSource::new(&server.url("/users")).unwrap();

    let err = source.fetch_records(&Query::default()).await.unwrap_err();

    match err {
        FetchError::Parse { body, .. } => assert_eq!(body.as_deref(), Some("<html>")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unexpected_shape() {
    let server = TestServer::start(200, r#"{"data":"nope"}"#).await;
    let source = HttpSource::new(&server.url("/users")).unwrap();

    let err = source.fetch_records(&Query::default()).await.unwrap_err();
    assert!(matches!(err, FetchError::Shape(_)));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = TestServer::start_with_delay(200, "[]", Duration::from_secs(5)).await;
    let source = HttpSource::builder()
        .endpoint(server.url("/slow"))
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = source.fetch_records(&Query::default()).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout(d) if d == Duration::from_millis(100)));
}
