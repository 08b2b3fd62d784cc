use httpmock::{Method::GET, Method::POST, MockServer};
use minter_model::{Collection, ReferenceDocument, RetryPolicy};
use minter_near::AuthToken;
use minter_paras::{ParasClient, ParasError};
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(10, Duration::from_millis(1), Duration::from_millis(2))
}

fn reference() -> ReferenceDocument {
    let collection = Collection {
        collection_id: "example-avatar-by-projectptestnet".to_string(),
        collection: "Example Avatar".to_string(),
    };
    ReferenceDocument::new("Paras Example Avatar", &collection, "projectp.testnet", vec![], "L00000fQfQfQ")
}

fn write_image(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("paras-avatar_0001_large.png");
    std::fs::write(&path, b"PNG fake image bytes").unwrap();
    path
}

#[tokio::test]
async fn test_find_collection_returns_first_result() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/collections")
                .query_param("creator_id", "projectp.testnet")
                .query_param("collection_id", "example-avatar-by-projectptestnet");
            then.status(200).json_body(json!({
                "status": 1,
                "data": {"results": [
                    {"collection_id": "example-avatar-by-projectptestnet", "collection": "Example Avatar", "description": "x"}
                ]}
            }));
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    let found = client
        .find_collection("projectp.testnet", "example-avatar-by-projectptestnet")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.collection, "Example Avatar");
    assert_eq!(lookup.hits_async().await, 1);
}

#[tokio::test]
async fn test_find_collection_empty_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collections");
            then.status(200).json_body(json!({"status": 1, "data": {"results": []}}));
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    assert!(client.find_collection("a", "b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_upload_sends_both_files_with_authorization() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(&dir);
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/uploads")
                .header("Authorization", "dG9rZW4=")
                .body_contains("reference.json")
                .body_contains("paras-avatar_0001_large.png")
                .body_contains("Paras Example Avatar");
            then.status(200)
                .json_body(json!({"status": 1, "data": ["ipfs://bafymedia", "ipfs://bafyref"]}));
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    let uploaded = client
        .upload_metadata(&image, &AuthToken::from_encoded("dG9rZW4="), &reference())
        .await
        .unwrap();

    assert_eq!(uploaded.media_hash(), "bafymedia");
    assert_eq!(uploaded.reference_hash(), "bafyref");
    assert_eq!(upload.hits_async().await, 1);
}

#[tokio::test]
async fn test_upload_gives_up_after_ten_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(&dir);
    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(POST).path("/uploads");
            then.status(503).body("busy");
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    let err = client
        .upload_metadata(&image, &AuthToken::from_encoded("t"), &reference())
        .await
        .unwrap_err();

    assert!(matches!(err, ParasError::UploadFailed { attempts: 10, .. }));
    assert_eq!(failing.hits_async().await, 10);
}

/// Serves one request per connection: the scripted statuses in order, then
/// 200 with `body` for every later request
async fn scripted_server(statuses: Vec<u16>, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let served = Arc::clone(&hits);
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            read_request(&mut stream).await;
            let n = served.fetch_add(1, Ordering::SeqCst);
            let (status, text) = match statuses.get(n) {
                Some(status) => (*status, "unavailable"),
                None => (200, body),
            };
            let response = format!(
                "HTTP/1.1 {status} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{text}",
                text.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });
    (format!("http://{addr}"), hits)
}

async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return;
        }
    }
}

#[tokio::test]
async fn test_upload_recovers_after_transient_failures() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(&dir);
    let (base_url, hits) = scripted_server(
        vec![502, 503, 504],
        r#"{"status": 1, "data": ["ipfs://media", "ipfs://ref"]}"#,
    )
    .await;

    let client = ParasClient::new(base_url, fast_retry()).unwrap();
    let uploaded = client
        .upload_metadata(&image, &AuthToken::from_encoded("t"), &reference())
        .await
        .unwrap();

    assert_eq!(uploaded.media_hash(), "media");
    assert_eq!(uploaded.reference_hash(), "ref");
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_upload_parts_carry_content_types() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(&dir);
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/uploads")
                .body_contains("Content-Type: application/json")
                .body_contains("Content-Type: image/png");
            then.status(200)
                .json_body(json!({"status": 1, "data": ["ipfs://media", "ipfs://ref"]}));
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    client
        .upload_metadata(&image, &AuthToken::from_encoded("t"), &reference())
        .await
        .unwrap();

    assert_eq!(upload.hits_async().await, 1);
}

#[tokio::test]
async fn test_unauthorized_upload_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_image(&dir);
    let server = MockServer::start_async().await;
    let rejected = server
        .mock_async(|when, then| {
            when.method(POST).path("/uploads");
            then.status(401).json_body(json!({"status": 0, "message": "invalid token"}));
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    let err = client
        .upload_metadata(&image, &AuthToken::from_encoded("t"), &reference())
        .await
        .unwrap_err();

    assert!(matches!(err, ParasError::UploadFailed { attempts: 1, .. }));
    assert_eq!(rejected.hits_async().await, 1);
}

#[tokio::test]
async fn test_missing_image_fails_before_request() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start_async().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/uploads");
            then.status(200);
        })
        .await;

    let client = ParasClient::new(server.base_url(), fast_retry()).unwrap();
    let err = client
        .upload_metadata(&dir.path().join("nope.png"), &AuthToken::from_encoded("t"), &reference())
        .await
        .unwrap_err();

    assert!(matches!(err, ParasError::Io { .. }));
    assert_eq!(upload.hits_async().await, 0);
}
