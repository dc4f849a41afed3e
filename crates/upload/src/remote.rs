//! Remote upload server client

use std::time::Duration;

use crate::{UploadBackend, UploadBlob, UploadError};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// How long one upload may take from connect to reply
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote upload client that connects to a WebSocket server
///
/// Protocol: a JSON [`UploadHeader`] text frame, then the blob as one binary
/// frame. The server answers with a JSON [`UploadReply`] text frame.
pub struct RemoteUpload {
    server_url: String,
    timeout: Duration,
}

impl RemoteUpload {
    pub fn new(server_url: String) -> Self {
        Self {
            server_url,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Bound the whole exchange, connect included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

impl UploadBackend for RemoteUpload {
    async fn upload(&mut self, blob: UploadBlob) -> Result<String, UploadError> {
        match tokio::time::timeout(self.timeout, self.upload_inner(blob)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Upload to {} timed out after {:?}", self.server_url, self.timeout);
                Err(UploadError::Connection(format!(
                    "no reply within {:?}",
                    self.timeout
                )))
            }
        }
    }
}

impl RemoteUpload {
    async fn upload_inner(&self, blob: UploadBlob) -> Result<String, UploadError> {
        let (ws_stream, _) = connect_async(&self.server_url)
            .await
            .map_err(|e| UploadError::Connection(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        let header = UploadHeader {
            file_name: &blob.file_name,
            content_type: &blob.content_type,
            size: blob.len(),
        };
        let header_json = serde_json::to_string(&header)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        write
            .send(Message::Text(header_json.into()))
            .await
            .map_err(|e| UploadError::Connection(e.to_string()))?;

        let size = blob.len();
        write
            .send(Message::Binary(blob.bytes.into()))
            .await
            .map_err(|e| UploadError::Connection(e.to_string()))?;
        debug!("Sent {} byte blob to {}", size, self.server_url);

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let url = parse_reply(&text)?;
                    info!("Upload stored at {}", url);
                    return Ok(url);
                }
                Ok(Message::Close(_)) => break,
                Err(e) => return Err(UploadError::Connection(e.to_string())),
                _ => {}
            }
        }

        Err(UploadError::InvalidResponse("Connection closed without a reply".into()))
    }
}

#[derive(Serialize)]
struct UploadHeader<'a> {
    file_name: &'a str,
    content_type: &'a str,
    size: usize,
}

#[derive(Deserialize)]
struct UploadReply {
    url: Option<String>,
    error: Option<String>,
}

fn parse_reply(text: &str) -> Result<String, UploadError> {
    let reply: UploadReply =
        serde_json::from_str(text).map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
    match reply {
        UploadReply { error: Some(error), .. } => Err(UploadError::Rejected(error)),
        UploadReply { url: Some(url), .. } if !url.is_empty() => Ok(url),
        _ => Err(UploadError::InvalidResponse("Reply has no url".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_url() {
        let url = parse_reply(r#"{"url": "https://cdn.example/masks/1.jpg"}"#).unwrap();
        assert_eq!(url, "https://cdn.example/masks/1.jpg");
    }

    #[test]
    fn test_parse_reply_error() {
        let result = parse_reply(r#"{"error": "payload too large"}"#);
        assert!(matches!(result, Err(UploadError::Rejected(msg)) if msg == "payload too large"));
    }

    #[test]
    fn test_parse_reply_garbage() {
        assert!(matches!(
            parse_reply("not json"),
            Err(UploadError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"url": ""}"#),
            Err(UploadError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let mut backend = RemoteUpload::new("ws://127.0.0.1:9/upload".into());
        let result = backend
            .upload(UploadBlob::new("mask.jpg", "image/jpeg", vec![0; 16]))
            .await;
        assert!(matches!(result, Err(UploadError::Connection(_))));
    }

    /// Accepts one upload, reads it, then never answers
    async fn silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });
        format!("ws://{}/upload", addr)
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let url = silent_server().await;
        let mut backend = RemoteUpload::new(url).with_timeout(Duration::from_millis(300));

        let started = std::time::Instant::now();
        let result = backend
            .upload(UploadBlob::new("mask.jpg", "image/jpeg", vec![0; 16]))
            .await;

        assert!(matches!(result, Err(UploadError::Connection(msg)) if msg.contains("no reply")));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_reply_from_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            // Header, then the blob
            ws.next().await;
            ws.next().await;
            let reply = r#"{"url": "https://cdn.example/masks/7.jpg"}"#;
            ws.send(Message::Text(reply.into())).await.unwrap();
        });

        let mut backend = RemoteUpload::new(format!("ws://{}/upload", addr))
            .with_timeout(Duration::from_secs(5));
        let url = backend
            .upload(UploadBlob::new("mask.jpg", "image/jpeg", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example/masks/7.jpg");
    }
}
