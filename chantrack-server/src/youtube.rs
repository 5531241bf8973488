//! YouTube Data API client
//!
//! Two read-only lookups used by the channel resolver:
//! - `channels?forUsername=` for legacy `/user/` and `/c/` URLs
//! - `videos?id=` for watch-page URLs
//!
//! API Documentation: https://developers.google.com/youtube/v3/docs

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("chantrack/", env!("CARGO_PKG_VERSION"));

/// Metadata API errors
///
/// An empty result is not an error; lookups return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Lookups that map a username or a video to its channel
#[async_trait]
pub trait ChannelMetadataApi: Send + Sync {
    /// Channel id for a legacy username / custom name, `None` if unknown
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, MetadataError>;

    /// Channel id of the video's uploader, `None` if the video is unknown
    async fn channel_id_for_video(&self, video_id: &str) -> Result<Option<String>, MetadataError>;
}

/// `channels.list` response (only what we read)
#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
}

/// `videos.list` response with `part=snippet`
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    #[serde(rename = "channelId")]
    channel_id: String,
}

/// YouTube Data API v3 client
pub struct YouTubeDataClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeDataClient {
    /// Create a client against `base_url` (normally `https://www.googleapis.com/youtube/v3`)
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, MetadataError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MetadataError> {
        let url = format!("{}/{}", self.base_url, resource);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            // without_url(): the request URL carries the API key
            .map_err(|e| MetadataError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api(status.as_u16(), error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MetadataError::Parse(e.without_url().to_string()))
    }
}

#[async_trait]
impl ChannelMetadataApi for YouTubeDataClient {
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, MetadataError> {
        debug!(username, "Querying YouTube channels by username");

        let response: ChannelListResponse = self
            .get_json("channels", &[("part", "id"), ("forUsername", username)])
            .await?;

        Ok(first_channel_id(response))
    }

    async fn channel_id_for_video(&self, video_id: &str) -> Result<Option<String>, MetadataError> {
        debug!(video_id, "Querying YouTube video snippet");

        let response: VideoListResponse = self
            .get_json("videos", &[("part", "snippet"), ("id", video_id)])
            .await?;

        Ok(first_video_channel_id(response))
    }
}

fn first_channel_id(response: ChannelListResponse) -> Option<String> {
    response.items.into_iter().next().map(|item| item.id)
}

fn first_video_channel_id(response: VideoListResponse) -> Option<String> {
    response
        .items
        .into_iter()
        .next()
        .map(|item| item.snippet.channel_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> YouTubeDataClient {
        YouTubeDataClient::new("test_key".to_string(), server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = YouTubeDataClient::new(
            "test_key".to_string(),
            "https://www.googleapis.com/youtube/v3/".to_string(),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://www.googleapis.com/youtube/v3");
    }

    #[test]
    fn test_first_channel_id_takes_first_item() {
        let response: ChannelListResponse = serde_json::from_str(
            r#"{
                "kind": "youtube#channelListResponse",
                "items": [
                    {"kind": "youtube#channel", "id": "UCfirst"},
                    {"kind": "youtube#channel", "id": "UCsecond"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(first_channel_id(response), Some("UCfirst".to_string()));
    }

    #[test]
    fn test_missing_items_means_not_found() {
        // The API omits `items` entirely when forUsername matches nothing
        let response: ChannelListResponse = serde_json::from_str(
            r#"{"kind": "youtube#channelListResponse", "pageInfo": {"totalResults": 0}}"#,
        )
        .unwrap();

        assert_eq!(first_channel_id(response), None);
    }

    #[test]
    fn test_video_snippet_channel_id() {
        let response: VideoListResponse = serde_json::from_str(
            r#"{
                "items": [{
                    "id": "dQw4w9WgXcQ",
                    "snippet": {"channelId": "UCuAXFkgsw1L7xaCfnd5JJOw", "title": "x"}
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(
            first_video_channel_id(response),
            Some("UCuAXFkgsw1L7xaCfnd5JJOw".to_string())
        );
    }

    #[test]
    fn test_empty_video_items() {
        let response: VideoListResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(first_video_channel_id(response), None);
    }

    #[tokio::test]
    async fn test_username_lookup_without_items_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("forUsername", "nobody"))
            .and(query_param("key", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#channelListResponse",
                "pageInfo": {"totalResults": 0, "resultsPerPage": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).channel_id_for_username("nobody").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_username_lookup_returns_channel_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("part", "id"))
            .and(query_param("forUsername", "GoogleDevelopers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"kind": "youtube#channel", "id": "UC_x5XG1OV2P6uZZ5FSM9Ttw"}]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .channel_id_for_username("GoogleDevelopers")
            .await
            .unwrap();

        assert_eq!(result, Some("UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string()));
    }

    #[tokio::test]
    async fn test_video_lookup_reads_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("part", "snippet"))
            .and(query_param("id", "dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "dQw4w9WgXcQ", "snippet": {"channelId": "UCv", "title": "x"}}]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .channel_id_for_video("dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(result, Some("UCv".to_string()));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let result = client_for(&server).channel_id_for_video("missing").await;

        match result {
            Err(MetadataError::Api(status, body)) => {
                assert_eq!(status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quota_exceeded_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "quotaExceeded"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).channel_id_for_username("someone").await;

        assert!(matches!(result, Err(MetadataError::Api(403, _))));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).channel_id_for_video("abc").await;

        assert!(matches!(result, Err(MetadataError::Parse(_))));
    }
}
