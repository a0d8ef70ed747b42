//! End-to-end tests for `Generator` over the real HTTP provider.
//!
//! A raw TCP server stands in for the chat-completion endpoint and counts
//! the connections it receives.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use inkwell_api::OpenAiCompatProvider;
use inkwell_core::{GenerationEvent, Generator};
use inkwell_types::{ApiError, GenerateError, GenerationOptions, StaticSecret, WireFormat};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn http_response(status_line: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len(),
    )
}

/// Consume one HTTP request (headers plus Content-Length bytes of body).
async fn drain_request(socket: &mut tokio::net::TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while let Ok(n) = socket.read(&mut buf).await {
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).to_ascii_lowercase();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
}

/// Start a test TCP server answering connection `n` with `responses[n]`.
async fn start_test_server(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = Arc::clone(&counter);

    tokio::spawn(async move {
        let responses = Arc::new(responses);
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let idx = counter_clone.fetch_add(1, Ordering::SeqCst);
            let responses = Arc::clone(&responses);

            tokio::spawn(async move {
                drain_request(&mut socket).await;
                if let Some(response) = responses.get(idx) {
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.flush().await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}/v1/chat/completions"), counter)
}

fn make_generator(endpoint: &str, secret: StaticSecret) -> Generator {
    let provider = OpenAiCompatProvider::new(endpoint, WireFormat::default()).unwrap();
    Generator::new(Arc::new(provider), Arc::new(secret))
}

fn streaming() -> GenerationOptions {
    GenerationOptions {
        stream: Some(true),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_missing_credential_issues_no_request() {
    let (endpoint, counter) = start_test_server(vec![http_response(
        "200 OK",
        "application/json",
        r#"{"choices":[{"message":{"content":"unused"}}]}"#,
    )])
    .await;

    let err = make_generator(&endpoint, StaticSecret::none())
        .generate("any prompt", GenerationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::MissingCredential), "{err:?}");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_buffered_generation() {
    let (endpoint, counter) = start_test_server(vec![http_response(
        "200 OK",
        "application/json",
        r#"{"choices":[{"message":{"content":"Hello"}}]}"#,
    )])
    .await;

    let text = make_generator(&endpoint, StaticSecret::new("test-key"))
        .generate("Greet the reader", GenerationOptions::default())
        .await
        .unwrap();

    assert_eq!(text, "Hello");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_streaming_generation() {
    let sse = "\
data: {\"choices\":[{\"delta\":{\"content\":\"Dear\"}}]}\n\
\n\
data: {\"choices\":[{\"delta\":{\"content\":\" reader\"}}]}\n\
\n\
data: not-json\n\
\n\
data: {\"choices\":[{\"delta\":{\"content\":\",\"}}]}\n\
\n\
data: [DONE]\n\
\n\
data: {\"choices\":[{\"delta\":{\"content\":\" ignored\"}}]}\n\
\n";
    let (endpoint, _) =
        start_test_server(vec![http_response("200 OK", "text/event-stream", sse)]).await;

    let mut seen = Vec::new();
    let text = make_generator(&endpoint, StaticSecret::new("test-key"))
        .generate_with_progress("Open a letter", streaming(), |t| seen.push(t.to_string()))
        .await
        .unwrap();

    assert_eq!(text, "Dear reader,");
    assert_eq!(seen, vec!["Dear", "Dear reader", "Dear reader,"]);
}

#[tokio::test]
async fn test_http_error_surfaces_status_and_body() {
    let (endpoint, _) = start_test_server(vec![http_response(
        "401 Unauthorized",
        "application/json",
        r#"{"error":{"message":"invalid key"}}"#,
    )])
    .await;

    let err = make_generator(&endpoint, StaticSecret::new("wrong"))
        .generate("p", streaming())
        .await
        .unwrap_err();
    match err {
        GenerateError::Api(ApiError::Transport { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid key"));
        }
        other => panic!("Expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn test_event_channel_over_http() {
    let sse = "\
data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\
\n\
data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\
\n\
data: [DONE]\n\
\n";
    let (endpoint, _) =
        start_test_server(vec![http_response("200 OK", "text/event-stream", sse)]).await;

    let mut rx = make_generator(&endpoint, StaticSecret::new("test-key"))
        .generate_events("p", streaming());
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], GenerationEvent::Text(t) if t == "a"));
    assert!(matches!(&events[1], GenerationEvent::Text(t) if t == "ab"));
    assert!(matches!(&events[2], GenerationEvent::Complete(t) if t == "ab"));
}
