//! Drives `OpenAiCompatibleBackend` against a one-shot local HTTP server.

use std::sync::Arc;
use std::time::Duration;

use genelinker_common::sandbox::SandboxClient;
use genelinker_common::FallbackReason;
use genelinker_config::Credential;
use genelinker_llm::{LlmBackend, LlmError, LlmRequest, Message, OpenAiCompatibleBackend, ResearchAssistant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serve one request with `status` and `body` after `delay`. Returns the base
/// URL and a receiver for the raw request text.
async fn serve_once(status: u16, body: &'static str, delay: Duration) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let _ = tx.send(request);
        tokio::time::sleep(delay).await;
        let response = format!(
            "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    (format!("http://{addr}/v1"), rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn backend(base_url: String, timeout: Duration) -> OpenAiCompatibleBackend {
    OpenAiCompatibleBackend::new(
        base_url,
        "gpt-4",
        Credential::new("test-credential-123"),
        SandboxClient::with_timeout(timeout).unwrap(),
    )
}

fn request() -> LlmRequest {
    LlmRequest {
        messages: vec![Message::system("sys"), Message::user("What is MDM2?")],
        model: None,
        max_tokens: Some(800),
        temperature: Some(0.3),
    }
}

#[tokio::test]
async fn test_successful_completion() {
    let (url, rx) = serve_once(
        200,
        r#"{"model":"gpt-4","choices":[{"message":{"role":"assistant","content":"MDM2 degrades p53."}}],"usage":{"prompt_tokens":12,"completion_tokens":5}}"#,
        Duration::ZERO,
    )
    .await;
    let resp = backend(url, Duration::from_secs(5)).complete(request()).await.unwrap();
    assert_eq!(resp.content, "MDM2 degrades p53.");
    assert_eq!(resp.completion_tokens, 5);

    let raw = rx.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer test-credential-123"));
    assert!(raw.contains(r#""max_tokens":800"#));
}

#[tokio::test]
async fn test_error_status_is_api_error() {
    let (url, _rx) = serve_once(401, r#"{"error":{"message":"invalid key"}}"#, Duration::ZERO).await;
    let err = backend(url, Duration::from_secs(5)).complete(request()).await.unwrap_err();
    match &err {
        LlmError::ApiError { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message, "invalid key");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.fallback_reason(), FallbackReason::HttpStatus(401));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (url, _rx) = serve_once(200, "<html>gateway</html>", Duration::ZERO).await;
    let err = backend(url, Duration::from_secs(5)).complete(request()).await.unwrap_err();
    assert_eq!(err.fallback_reason(), FallbackReason::MalformedResponse);
}

#[tokio::test]
async fn test_slow_provider_times_out_into_fallback() {
    let (url, _rx) = serve_once(200, r#"{"choices":[]}"#, Duration::from_secs(3)).await;
    let backend: Arc<dyn LlmBackend> = Arc::new(backend(url, Duration::from_millis(200)));
    let assistant = ResearchAssistant::new(backend);
    let outcome = assistant.ask("xyzzy").await.unwrap();
    assert_eq!(outcome.reason(), Some(&FallbackReason::Timeout));
    assert!(outcome.value().contains("complex molecular mechanisms"));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_fallback() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let backend: Arc<dyn LlmBackend> = Arc::new(backend(format!("http://127.0.0.1:{port}/v1"), Duration::from_secs(2)));
    let outcome = ResearchAssistant::new(backend).ask("protein folding").await.unwrap();
    assert_eq!(outcome.reason(), Some(&FallbackReason::Network));
    assert_eq!(outcome.confidence(), 0.84);
}
