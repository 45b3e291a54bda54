//! Retry behaviour of the fetcher against a mock portal.
//!
//! The fetcher is blocking, so every call runs on a blocking thread while
//! the mock server keeps serving on the async runtime.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use fagui_harvester::config::HarvestConfig;
use fagui_harvester::error::HarvesterError;
use fagui_harvester::http::Fetcher;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(max_attempts: u32) -> HarvestConfig {
    HarvestConfig::default()
        .with_min_interval(Duration::ZERO)
        .with_retry_base_delay(Duration::from_millis(5))
        .with_max_attempts(max_attempts)
}

async fn fetch(config: HarvestConfig, url: String) -> Result<String, HarvesterError> {
    tokio::task::spawn_blocking(move || Fetcher::new(&config)?.fetch_text(&url))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recovers_after_two_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/law"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/law"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>第一条 甲</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetch(fast_config(3), format!("{}/law", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<p>第一条 甲</p>");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gives_up_when_errors_outlast_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/law"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(4)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/law"))
        .respond_with(ResponseTemplate::new(200).set_body_string("late"))
        .mount(&mock_server)
        .await;

    let err = fetch(fast_config(3), format!("{}/law", mock_server.uri()))
        .await
        .unwrap_err();
    match err {
        HarvesterError::RetriesExhausted { attempts, message, .. } => {
            assert_eq!(attempts, 3);
            assert!(message.contains("500"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_found_fails_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = fetch(fast_config(3), format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvesterError::HttpStatus { status: 404, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_throttling_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let body = fetch(fast_config(2), mock_server.uri()).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_body_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
        .mount(&mock_server)
        .await;

    let config = fast_config(1).with_max_response_size(1024);
    let err = fetch(config, mock_server.uri()).await.unwrap_err();
    assert!(matches!(err, HarvesterError::ResponseTooLarge { max: 1024, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_are_spaced_by_min_interval() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = fast_config(1).with_min_interval(Duration::from_millis(100));
    let url = mock_server.uri();
    let elapsed = tokio::task::spawn_blocking(move || {
        let fetcher = Fetcher::new(&config).unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            fetcher.fetch_text(&url).unwrap();
        }
        start.elapsed()
    })
    .await
    .unwrap();

    assert!(elapsed >= Duration::from_millis(200));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(800)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let config = fast_config(2).with_timeout(Duration::from_millis(200));
    let body = fetch(config, mock_server.uri()).await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeouts_exhaust_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&mock_server)
        .await;

    let config = fast_config(2).with_timeout(Duration::from_millis(200));
    let err = fetch(config, mock_server.uri()).await.unwrap_err();
    assert!(matches!(err, HarvesterError::RetriesExhausted { attempts: 2, .. }));
}

#[test]
fn test_refused_connection_exhausts_attempts() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/law", listener.local_addr().unwrap());
    drop(listener);

    let err = Fetcher::new(&fast_config(2))
        .unwrap()
        .fetch_text(&url)
        .unwrap_err();
    assert!(matches!(err, HarvesterError::RetriesExhausted { attempts: 2, .. }));
}

#[test]
fn test_oversized_body_without_length_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/law", listener.local_addr().unwrap());

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 1024];
        let _ = stream.read(&mut request).unwrap();

        let body = "x".repeat(2048);
        let response = format!(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n{:x}\r\n{body}\r\n0\r\n\r\n",
            body.len()
        );
        // The client may hang up once it has read past the cap
        let _ = stream.write_all(response.as_bytes());
    });

    let config = fast_config(1).with_max_response_size(1024);
    let err = Fetcher::new(&config).unwrap().fetch_text(&url).unwrap_err();
    assert!(matches!(
        err,
        HarvesterError::ResponseTooLarge { size: 1025, max: 1024, .. }
    ));

    server.join().unwrap();
}
