use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use tracing::debug;

use crate::error::StoreError;
use crate::store::keys::{content_type_for, encode_key};
use crate::store::{ObjectBody, ObjectStore, RemoteConfig};

/// HTTP client for the bucket service.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Endpoint for a key-addressed route, with the key always percent-encoded.
    fn key_url(&self, route: &str, key: &str) -> String {
        format!("{}/bucket/{}/{}", self.base_url, route, encode_key(key))
    }
}

/// Turn a non-success response into `StoreError::Status`, keeping the body.
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

impl ObjectStore for HttpStore {
    async fn config(&self) -> Result<RemoteConfig, StoreError> {
        let response = self.client.get(self.url("/config")).send().await?;
        let response = check(response).await?;
        Ok(response.json::<RemoteConfig>().await?)
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let response = self.client.get(self.url("/bucket/list")).send().await?;
        let response = check(response).await?;
        // The listing endpoint has served a non-JSON content type in the past,
        // so decode from text rather than trusting the header.
        let text = response.text().await?;
        let keys: Vec<String> =
            serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!(count = keys.len(), "listed bucket");
        Ok(keys)
    }

    async fn download(&self, key: &str) -> Result<ObjectBody, StoreError> {
        let response = self
            .client
            .get(self.key_url("download", key))
            .send()
            .await?;
        let response = check(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        debug!(key, bytes = bytes.len(), ?content_type, "downloaded object");
        Ok(ObjectBody {
            bytes,
            content_type,
        })
    }

    async fn upload(&self, key: &str, file_name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type_for(file_name))?;
        let form = Form::new().part("file", part).text("key", key.to_string());
        let response = self
            .client
            .post(self.url("/bucket/upload"))
            .multipart(form)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update(&self, key: &str, body: String) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.key_url("update", key))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.key_url("delete", key))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the request head.
    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&head).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn key_urls_are_always_encoded() {
        let store = HttpStore::new("http://localhost:8080/").unwrap();
        assert_eq!(store.base_url(), "http://localhost:8080");
        assert_eq!(
            store.key_url("download", "docs/read me.md"),
            "http://localhost:8080/bucket/download/docs%2Fread%20me.md"
        );
        assert_eq!(
            store.key_url("delete", "a&b"),
            "http://localhost:8080/bucket/delete/a%26b"
        );
    }

    #[tokio::test]
    async fn list_decodes_json_array() {
        let (base, server) = serve_once("200 OK", "application/text", r#"["a.txt","docs/x.md"]"#).await;
        let store = HttpStore::new(&base).unwrap();
        let keys = store.list().await.unwrap();
        assert_eq!(keys, vec!["a.txt".to_string(), "docs/x.md".to_string()]);
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /bucket/list "));
    }

    #[tokio::test]
    async fn download_sends_encoded_key_and_keeps_content_type() {
        let (base, server) = serve_once("200 OK", "text/csv", "a,b\n1,2\n").await;
        let store = HttpStore::new(&base).unwrap();
        let body = store.download("docs/q 1.csv").await.unwrap();
        assert_eq!(body.bytes, b"a,b\n1,2\n");
        assert_eq!(body.content_type.as_deref(), Some("text/csv"));
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /bucket/download/docs%2Fq%201.csv "));
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let (base, _server) =
            serve_once("500 Internal Server Error", "text/plain", "Error deleting file").await;
        let store = HttpStore::new(&base).unwrap();
        let err = store.delete("x").await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Status {
                status: 500,
                body: "Error deleting file".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_listing_is_decode_error() {
        let (base, _server) = serve_once("200 OK", "application/json", "not json").await;
        let store = HttpStore::new(&base).unwrap();
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let store = HttpStore::new(&format!("http://{addr}")).unwrap();
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
