//! reqwest-backed [`ClassifierApi`] implementation

use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    HistoryId, HistoryList, HistoryRecord, ModelCatalog, ModelNameRequest, ModelUpload,
    NewHistoryRecord, PredictResponse, SettingsRequest, StatusResponse,
};
use super::ClassifierApi;
use crate::batch::SelectedFile;
use crate::error::ClientError;

/// Longest slice of an error body kept in [`ClientError::Http`]
const BODY_EXCERPT: usize = 200;

/// HTTP client for one backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lacaktani/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        // A trailing slash keeps any path prefix when joining endpoints
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base = Url::parse(&normalized)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn history_url(&self, id: &HistoryId) -> Result<Url, ClientError> {
        let mut url = self.endpoint("api/history")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id.as_str());
        Ok(url)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        decode(response).await
    }
}

/// Parse a JSON body; a non-2xx status only matters when the body is not JSON
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    match serde_json::from_slice::<T>(&body) {
        Ok(value) => Ok(value),
        Err(err) if status.is_success() => Err(ClientError::Decode(err)),
        Err(_) => Err(ClientError::Http {
            status: status.as_u16(),
            body: excerpt(&body),
        }),
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

impl ClassifierApi for HttpClient {
    async fn predict(&self, file: &SelectedFile) -> Result<PredictResponse, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        let url = self.endpoint("predict")?;
        debug!("POST {} ({}, {} bytes)", url, file.name, file.bytes.len());
        let response = self.http.post(url).multipart(form).send().await?;
        decode(response).await
    }

    async fn set_confidence(&self, confidence: f32) -> Result<StatusResponse, ClientError> {
        self.post_json("api/settings", &SettingsRequest { confidence })
            .await
    }

    async fn list_models(&self) -> Result<ModelCatalog, ClientError> {
        self.get_json("api/list_models").await
    }

    async fn change_model(&self, model_name: &str) -> Result<StatusResponse, ClientError> {
        self.post_json("api/change_model", &ModelNameRequest { model_name })
            .await
    }

    async fn delete_model(&self, model_name: &str) -> Result<StatusResponse, ClientError> {
        self.post_json("api/delete_model", &ModelNameRequest { model_name })
            .await
    }

    async fn upload_model(&self, upload: &ModelUpload) -> Result<StatusResponse, ClientError> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("model_file", part);

        let url = self.endpoint("api/upload_model")?;
        debug!("POST {} ({})", url, upload.file_name);
        let response = self.http.post(url).multipart(form).send().await?;
        decode(response).await
    }

    async fn history(&self) -> Result<Vec<HistoryRecord>, ClientError> {
        let list: HistoryList = self.get_json("api/history").await?;
        Ok(list.history)
    }

    async fn save_history(&self, record: &NewHistoryRecord) -> Result<StatusResponse, ClientError> {
        self.post_json("api/history", record).await
    }

    async fn delete_history(&self, id: &HistoryId) -> Result<StatusResponse, ClientError> {
        let url = self.history_url(id)?;
        debug!("DELETE {}", url);
        let response = self.http.delete(url).send().await?;
        decode(response).await
    }

    async fn export_history(&self) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint("api/export_history")?;
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stats;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, answer with `status` + `body`, return the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}", addr), handle)
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
            if let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
                if head.contains("transfer-encoding: chunked") {
                    if buf.ends_with(b"0\r\n\r\n") {
                        break;
                    }
                    continue;
                }
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn jpeg(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = HttpClient::new("http://example.test/lacak").unwrap();
        assert_eq!(
            client.endpoint("api/history").unwrap().as_str(),
            "http://example.test/lacak/api/history"
        );
        let client = HttpClient::new("http://example.test/").unwrap();
        assert_eq!(
            client.endpoint("predict").unwrap().as_str(),
            "http://example.test/predict"
        );
    }

    #[test]
    fn test_history_url_escapes_id() {
        let client = HttpClient::new("http://example.test").unwrap();
        let url = client.history_url(&HistoryId::new("a/b c")).unwrap();
        assert_eq!(url.as_str(), "http://example.test/api/history/a%2Fb%20c");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(HttpClient::new("not a url").is_err());
        assert!(HttpClient::new("mailto:someone@example.test").is_err());
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let cut = excerpt(long.as_bytes());
        assert!(cut.ends_with("..."));
        assert_eq!(cut.len(), BODY_EXCERPT + 3);
    }

    #[tokio::test]
    async fn test_predict_sends_multipart_file() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"image_data":"QUJD","stats":{"matang":3,"mentah":1,"berbunga":0},"top_detection":{"label":"Matang","confidence":0.9}}"#,
        )
        .await;
        let client = HttpClient::new(&base).unwrap();

        let response = client.predict(&jpeg("daun.jpg")).await.unwrap();
        let prediction = response.into_prediction().unwrap();
        assert_eq!(prediction.stats, Stats::new(3, 1, 0));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /predict HTTP/1.1"));
        let lower = request.to_lowercase();
        assert!(lower.contains("name=\"file\""));
        assert!(lower.contains("filename=\"daun.jpg\""));
        assert!(lower.contains("content-type: image/jpeg"));
    }

    #[tokio::test]
    async fn test_http_error_without_json_body() {
        let (base, server) = serve_once("500 INTERNAL SERVER ERROR", "Traceback: boom").await;
        let client = HttpClient::new(&base).unwrap();

        let err = client.list_models().await.unwrap_err();
        match err {
            ClientError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Traceback: boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_with_json_body_is_parsed() {
        let (base, server) = serve_once(
            "400 BAD REQUEST",
            r#"{"status":"error","message":"Model sedang digunakan"}"#,
        )
        .await;
        let client = HttpClient::new(&base).unwrap();

        let res = client.delete_model("best.pt").await.unwrap();
        assert!(!res.is_success());
        assert_eq!(res.message.as_deref(), Some("Model sedang digunakan"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/delete_model HTTP/1.1"));
        assert!(request.contains(r#"{"model_name":"best.pt"}"#));
    }

    #[tokio::test]
    async fn test_garbage_success_body_is_decode_error() {
        let (base, server) = serve_once("200 OK", "<html>oops</html>").await;
        let client = HttpClient::new(&base).unwrap();

        let err = client.history().await.unwrap_err();
        assert!(err.is_malformed());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_history_uses_id_path() {
        let (base, server) = serve_once("200 OK", r#"{"status":"success"}"#).await;
        let client = HttpClient::new(&base).unwrap();

        let res = client.delete_history(&HistoryId::new("42")).await.unwrap();
        assert!(res.is_success());

        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /api/history/42 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_settings_body() {
        let (base, server) = serve_once("200 OK", r#"{"status":"success"}"#).await;
        let client = HttpClient::new(&base).unwrap();

        client.set_confidence(0.5).await.unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/settings HTTP/1.1"));
        assert!(request.contains(r#"{"confidence":0.5}"#));
    }
}
