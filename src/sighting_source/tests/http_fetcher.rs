use std::time::Duration;

use sighting_source::{FetchError, FetcherConfig, HttpFetcher, PageFetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serves exactly one canned HTTP response and hands back the raw request.
async fn serve_once(response: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).to_string());
        sock.write_all(response.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
    });

    (format!("http://{addr}/whalecount.html"), rx)
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::new(FetcherConfig {
        timeout,
        ..FetcherConfig::default()
    })
    .expect("client")
}

#[tokio::test]
async fn fetch_returns_body_and_sends_browser_headers() {
    let body = "<html><body><h3>Recent Counts</h3></body></html>";
    let response: &'static str = Box::leak(
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .into_boxed_str(),
    );
    let (url, request) = serve_once(response).await;

    let doc = fetcher(Duration::from_secs(5)).fetch(&url).await.expect("fetch");
    assert_eq!(doc.url, url);
    assert_eq!(doc.html, body);

    let raw = request.await.unwrap().to_lowercase();
    assert!(raw.starts_with("get /whalecount.html"));
    assert!(raw.contains("user-agent: mozilla/5.0"));
    assert!(raw.contains("referer: https://www.google.com/"));
    assert!(raw.contains("accept: text/html"));
}

#[tokio::test]
async fn http_error_status_is_a_fetch_error() {
    let (url, _req) = serve_once(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    )
    .await;

    let err = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }), "got {err:?}");
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept and hold the socket open without answering.
        let (_sock, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let err = fetcher(Duration::from_millis(200))
        .fetch(&format!("http://{addr}/"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let err = fetcher(Duration::from_secs(2))
        .fetch(&format!("http://{addr}/"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
}
