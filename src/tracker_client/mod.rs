// HTTP client for the remote progress tracker

use serde::{Deserialize, Serialize};

use crate::domain::{mapping::merge_remote_track, models::Track};

/// Remote side of a track: read the watermark, push a new one.
#[async_trait::async_trait]
pub trait TrackerService: Send + Sync {
    /// Return `track` refreshed with what the tracker currently reports.
    async fn fetch(&self, track: &Track) -> anyhow::Result<Track>;
    async fn update(&self, track: &Track) -> anyhow::Result<()>;
}

const BODY_SNIPPET_CHARS: usize = 2000;

/// At most `max_chars` leading characters of `body`, cut on a char boundary.
fn body_snippet(body: &str, max_chars: usize) -> &str {
    body.char_indices()
        .nth(max_chars)
        .map_or(body, |(end, _)| &body[..end])
}

#[derive(Clone, Debug)]
pub struct TrackerClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl TrackerClient {
    /// Create a new client with the given base URL (e.g. "https://tracker.example.com").
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, "creating TrackerClient");
        Ok(TrackerClient {
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Return a client with the provided API key set (Bearer)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// GET /status (no auth required)
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_status(&self) -> anyhow::Result<StatusResponse> {
        let url = self.url("/status");
        tracing::debug!(%url, "GET status");
        let resp = self.client.get(&url).send().await?;
        let body = resp.error_for_status()?.text().await?;
        let parsed: StatusResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }

    /// GET /api/tracks/{remote_id}
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_track(&self, remote_id: i64) -> anyhow::Result<RemoteTrack> {
        let url = self.url(&format!("/api/tracks/{}", remote_id));
        tracing::debug!(%url, "GET track");
        let resp = self.authorize(self.client.get(&url)).send().await?;
        let body = resp.error_for_status()?.text().await?;
        match serde_json::from_str::<RemoteTrack>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                let snippet = body_snippet(&body, BODY_SNIPPET_CHARS);
                tracing::error!(error = %e, body_snippet = %snippet, "failed to parse RemoteTrack");
                Err(e.into())
            }
        }
    }

    /// PUT /api/tracks/{remote_id}
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn put_track(
        &self,
        remote_id: i64,
        last_chapter_read: f64,
    ) -> anyhow::Result<RemoteTrack> {
        let url = self.url(&format!("/api/tracks/{}", remote_id));
        tracing::debug!(%url, last_chapter_read, "PUT track");
        let req = self
            .authorize(self.client.put(&url))
            .json(&TrackUpdateRequest { last_chapter_read });
        let resp = req.send().await?;
        let body = resp.error_for_status()?.text().await?;
        let parsed: RemoteTrack = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl TrackerService for TrackerClient {
    async fn fetch(&self, track: &Track) -> anyhow::Result<Track> {
        let remote = self.get_track(track.remote_id).await?;
        Ok(merge_remote_track(track, &remote))
    }

    async fn update(&self, track: &Track) -> anyhow::Result<()> {
        let remote = self
            .put_track(track.remote_id, track.last_chapter_read)
            .await?;
        if remote.last_chapter_read < track.last_chapter_read {
            tracing::warn!(
                remote_id = track.remote_id,
                sent = track.last_chapter_read,
                stored = remote.last_chapter_read,
                "tracker stored a lower watermark than sent"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub app: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTrack {
    pub id: i64,
    #[serde(default)]
    pub last_chapter_read: f64,
    pub total_chapters: Option<i32>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackUpdateRequest {
    pub last_chapter_read: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_paths() {
        let c = TrackerClient::new("https://tracker.example.com/").unwrap();
        assert_eq!(
            c.url("/api/tracks/12"),
            "https://tracker.example.com/api/tracks/12"
        );
        assert_eq!(c.url("status"), "https://tracker.example.com/status");
    }

    #[test]
    fn snippet_stops_on_char_boundary() {
        let body = format!("{}é tail", "x".repeat(1999));
        let snippet = body_snippet(&body, BODY_SNIPPET_CHARS);
        assert_eq!(snippet.chars().count(), 2000);
        assert!(snippet.ends_with('é'));
        assert_eq!(body_snippet("short", BODY_SNIPPET_CHARS), "short");
        assert_eq!(body_snippet("", BODY_SNIPPET_CHARS), "");
    }

    #[tokio::test]
    async fn unparseable_non_ascii_body_is_an_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            let body = format!("{}é tail", "x".repeat(1999));
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = TrackerClient::new(format!("http://{}", addr)).unwrap();
        let result = client.get_track(1).await;
        assert!(result.is_err());
        server.await.unwrap();
    }

    #[test]
    fn status_deserialize() {
        let json = r#"{ "app": "tracker", "version": "1.4.0" }"#;
        let s: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(s.app.as_deref(), Some("tracker"));
        assert_eq!(s.version.as_deref(), Some("1.4.0"));
    }

    #[test]
    fn remote_track_deserialize() {
        let json = r#"{
            "id": 4242,
            "lastChapterRead": 12.5,
            "totalChapters": 120,
            "title": "Some Series",
            "status": "reading"
        }"#;
        let t: RemoteTrack = serde_json::from_str(json).unwrap();
        assert_eq!(t.id, 4242);
        assert_eq!(t.last_chapter_read, 12.5);
        assert_eq!(t.total_chapters, Some(120));
    }

    #[test]
    fn remote_track_defaults_missing_progress() {
        let t: RemoteTrack = serde_json::from_str(r#"{ "id": 1 }"#).unwrap();
        assert_eq!(t.last_chapter_read, 0.0);
        assert_eq!(t.total_chapters, None);
        assert_eq!(t.title, None);
    }

    #[test]
    fn update_request_serializes_camel_case() {
        let body = serde_json::to_value(TrackUpdateRequest {
            last_chapter_read: 3.0,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "lastChapterRead": 3.0 }));
    }
}
