/// YouTube Data API v3 client for shorts playlists, video statistics and
/// channel search
use super::handles::shorts_playlist_id;
use crate::config::YouTubeConfig;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shorts_core::{extract_hashtags, GroupEntry, GroupRecord, Short};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
    error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: PlaylistSnippet,
    content_details: PlaylistContentDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    published_at: DateTime<Utc>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoItem {
    statistics: VideoStatistics,
    snippet: VideoSnippet,
    content_details: Option<VideoContentDetails>,
}

/// Counts arrive as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VideoSnippet {
    description: String,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    channel_id: Option<String>,
}

/// Statistics and description hashtags of one video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoDetails {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub duration: Option<String>,
    pub hashtags: Vec<String>,
}

impl From<VideoItem> for VideoDetails {
    fn from(item: VideoItem) -> Self {
        let count = |value: Option<String>| -> u64 { value.and_then(|v| v.parse().ok()).unwrap_or(0) };

        Self {
            views: count(item.statistics.view_count),
            likes: count(item.statistics.like_count),
            comments: count(item.statistics.comment_count),
            duration: item.content_details.map(|d| d.duration),
            hashtags: extract_hashtags(&item.snippet.description),
        }
    }
}

/// Items published on or after `min_date`, and whether any item was older
fn select_recent(items: Vec<PlaylistItem>, min_date: DateTime<Utc>) -> (Vec<PlaylistItem>, bool) {
    let total = items.len();
    let recent: Vec<PlaylistItem> = items
        .into_iter()
        .filter(|item| item.snippet.published_at >= min_date)
        .collect();
    let found_old = recent.len() < total;
    (recent, found_old)
}

fn build_short(item: &PlaylistItem, details: VideoDetails) -> Short {
    let video_id = &item.content_details.video_id;

    Short {
        video_id: video_id.clone(),
        title: item.snippet.title.clone(),
        channel: item.snippet.channel_title.clone(),
        upload_time: item.snippet.published_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        views: details.views,
        likes: details.likes,
        comments: details.comments,
        hashtags: details.hashtags,
        url: format!("https://www.youtube.com/shorts/{}", video_id),
        ..Short::default()
    }
}

/// YouTube Data API client
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    api_base: String,
    page_size: u32,
    request_delay: Duration,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("kpop-shorts/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, 50),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        // Error bodies carry an `error` object, so they are decoded too
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| anyhow!("Unexpected {} response from {}: {}", status, endpoint, e))
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Statistics, duration and description hashtags of one video
    pub async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        let response: VideosResponse = self
            .get_json("videos", &[("id", video_id), ("part", "statistics,contentDetails,snippet")])
            .await?;

        if let Some(error) = response.error {
            return Err(anyhow!("API error {}: {}", error.code, error.message));
        }

        Ok(response.items.into_iter().next().map(VideoDetails::from))
    }

    /// Every short of a playlist published on or after `min_date`.
    ///
    /// The playlist is ordered newest first, so paging stops after the first
    /// page holding an older item. API errors end the listing with what was
    /// collected so far.
    pub async fn playlist_shorts(&self, playlist_id: &str, min_date: DateTime<Utc>) -> Vec<Short> {
        let mut shorts = Vec::new();
        let mut page_token: Option<String> = None;
        let page_size = self.page_size.to_string();

        loop {
            let mut params = vec![
                ("playlistId", playlist_id),
                ("part", "snippet,contentDetails"),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: PlaylistItemsResponse = match self.get_json("playlistItems", &params).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Error processing shorts playlist {}: {}", playlist_id, e);
                    break;
                }
            };

            if let Some(error) = page.error {
                warn!("Error fetching playlist {}: {} ({})", playlist_id, error.message, error.code);
                break;
            }

            let (recent, found_old) = select_recent(page.items, min_date);

            for item in &recent {
                let video_id = &item.content_details.video_id;
                match self.video_details(video_id).await {
                    Ok(Some(details)) => shorts.push(build_short(item, details)),
                    Ok(None) => debug!("No details for video {}", video_id),
                    Err(e) => warn!("Error getting video details for {}: {}", video_id, e),
                }
                self.pause().await;
            }

            if found_old {
                info!("  Found videos older than {}, stopping pagination", min_date.format("%Y-%m-%d"));
                break;
            }

            match page.next_page_token {
                Some(token) => {
                    debug!("  Fetching next page of results with token: {}", token);
                    page_token = Some(token);
                }
                None => break,
            }
        }

        shorts
    }

    /// Fetch a group's shorts. Groups without a usable channel id, or
    /// without any short since `min_date`, yield `None`.
    pub async fn fetch_group(&self, group: &GroupRecord, min_date: DateTime<Utc>) -> Option<GroupEntry> {
        let Some(channel_id) = group.channel_id.as_deref() else {
            info!("No YouTube channel ID for {}, skipping", group.english);
            return None;
        };

        let Some(playlist_id) = shorts_playlist_id(channel_id) else {
            warn!("Channel ID {} of {} is not a UC id, skipping", channel_id, group.english);
            return None;
        };

        info!("🔍 Fetching shorts for {} from playlist {}", group.english, playlist_id);
        let shorts = self.playlist_shorts(&playlist_id, min_date).await;

        if shorts.is_empty() {
            info!("  No shorts found for {}", group.english);
            return None;
        }

        info!("  Found {} shorts for {}", shorts.len(), group.english);
        Some(GroupEntry::new(
            &group.korean,
            channel_id,
            group.youtube.as_deref().unwrap_or_default(),
            shorts,
        ))
    }

    /// Channel id of the first channel search result for `handle`.
    ///
    /// Pauses after every search, failed or not.
    pub async fn channel_id_for_handle(&self, handle: &str) -> Result<Option<String>> {
        let query = handle.trim().trim_start_matches('@');
        if query.is_empty() {
            return Ok(None);
        }

        let result = self.search_channel(query).await;
        if let Ok(None) = result {
            debug!("No results found for handle: {}", handle);
        }

        self.pause().await;
        result
    }

    async fn search_channel(&self, query: &str) -> Result<Option<String>> {
        let response: SearchResponse = self
            .get_json("search", &[("q", query), ("type", "channel"), ("part", "id,snippet")])
            .await?;

        if let Some(error) = response.error {
            return Err(anyhow!("API error {}: {}", error.code, error.message));
        }

        Ok(response.items.into_iter().find_map(|item| item.id.channel_id))
    }
}
