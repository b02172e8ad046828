use calcterm::chat::client::{DeltaSink, OllamaClient};
use calcterm::chat::message::ChatMessage;
use calcterm::config::ChatConfig;
use calcterm::CalcError;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Read one HTTP request (headers plus a Content-Length body) and return it as text.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let body_len = text[..end]
                .lines()
                .find_map(|l| {
                    let lower = l.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap())
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve a single connection: status line and content type, then each body part
/// as a separate write. The body is delimited by closing the connection.
async fn serve_once(
    status: &'static str,
    parts: Vec<&'static str>,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/x-ndjson\r\nConnection: close\r\n\r\n",
            status
        );
        // The client may hang up early on error statuses, so write failures are ignored.
        let _ = stream.write_all(head.as_bytes()).await;
        for part in parts {
            let _ = stream.write_all(part.as_bytes()).await;
            let _ = stream.flush().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let _ = stream.shutdown().await;
        request
    });

    (url, handle)
}

fn client(url: &str) -> OllamaClient {
    OllamaClient::new(ChatConfig::default().with_base_url(url)).unwrap()
}

#[tokio::test]
async fn streamed_reply_matches_single_reply() {
    let (url, server) = serve_once(
        "200 OK",
        vec![
            "{\"message\":{\"role\":\"assistant\",\"content\":\"The deriv\"},\"done\":false}\n{\"mess",
            "age\":{\"role\":\"assistant\",\"content\":\"ative of x² is 2x.\"},\"done\":false}\n",
            "not json at all\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        ],
    )
    .await;

    let mut deltas = Vec::new();
    let mut collect = |d: &str| deltas.push(d.to_string());
    let sink: DeltaSink<'_> = &mut collect;
    let streamed = client(&url)
        .send_chat("llama3.2", &[ChatMessage::user("d/dx x^2?")], Some(sink))
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/chat"));
    assert!(request.contains("\"stream\":true"));

    assert_eq!(streamed, "The derivative of x² is 2x.");
    assert_eq!(deltas.len(), 2);

    let (url, server) = serve_once(
        "200 OK",
        vec!["{\"message\":{\"role\":\"assistant\",\"content\":\"The derivative of x² is 2x.\"},\"done\":true}"],
    )
    .await;
    let single = client(&url)
        .send_chat("llama3.2", &[ChatMessage::user("d/dx x^2?")], None)
        .await
        .unwrap();
    let request = server.await.unwrap();
    assert!(request.contains("\"stream\":false"));
    assert_eq!(single, streamed);
}

#[tokio::test]
async fn server_error_status_is_reported() {
    let (url, server) = serve_once("500 Internal Server Error", vec!["{\"error\":\"boom\"}"]).await;
    let err = client(&url)
        .send_chat("llama3.2", &[ChatMessage::user("hi")], None)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, CalcError::HttpStatus { status: 500 }));
    assert!(!err.is_connectivity());
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client(&url);
    assert!(!client.check_connection().await);

    let err = client.list_models().await.unwrap_err();
    assert!(err.is_connectivity());
    assert!(err.to_string().contains(&url));
}

#[tokio::test]
async fn lists_installed_models() {
    let (url, server) = serve_once(
        "200 OK",
        vec![r#"{"models":[{"name":"llama3.2:latest","size":2019393189,"details":{"family":"llama","parameter_size":"3.2B"}},{"name":"llava:7b"}]}"#],
    )
    .await;

    let models = client(&url).list_models().await.unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("GET /api/tags"));
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "llama3.2:latest");
    assert_eq!(models[0].details.parameter_size, "3.2B");
    assert_eq!(models[1].size, 0);
}

#[tokio::test]
async fn error_object_in_successful_stream_is_an_error() {
    let (url, server) = serve_once(
        "200 OK",
        vec![
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Let me \"},\"done\":false}\n",
            "{\"error\":\"model runner crashed\"}\n",
        ],
    )
    .await;

    let mut collect = |_: &str| {};
    let sink: DeltaSink<'_> = &mut collect;
    let err = client(&url)
        .send_chat("llama3.2", &[ChatMessage::user("hi")], Some(sink))
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(&err, CalcError::Stream(message) if message == "model runner crashed"));
    assert!(!err.is_connectivity());
    assert!(err.to_string().contains("model runner crashed"));
}

#[tokio::test]
async fn error_object_without_streaming_is_an_error() {
    let (url, server) = serve_once("200 OK", vec!["{\"error\":\"boom\"}\n"]).await;
    let err = client(&url)
        .send_chat("llama3.2", &[ChatMessage::user("hi")], None)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, CalcError::Stream(message) if message == "boom"));
}
