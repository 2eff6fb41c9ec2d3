use crate::config::YOUTUBE_API_KEY;
use crate::models::{ChannelSnapshot, CommentFetch, VideoRecord};
use crate::utils::{count_value, string_value};
use anyhow::Result;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::Value;

/// playlistItems page size; also the videos.list hard limit on ids per call.
pub const PAGE_SIZE: usize = 50;
/// Top-level comments kept per video.
pub const COMMENT_SAMPLE: usize = 10;

#[derive(Debug, Clone)]
pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// The slice of the YouTube Data API v3 this service consumes. Components
/// take the trait so tests can substitute an in-memory fake.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelSnapshot>;
    async fn fetch_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage>;
    async fn fetch_video_details(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>>;
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<String>>;
}

/// Collect every video id of a playlist by following nextPageToken until it
/// is absent. No page cap: unbounded channels are enumerated completely.
/// Any request error aborts the whole collection.
pub async fn collect_video_ids(api: &dyn YouTubeApi, playlist_id: &str) -> Result<Vec<String>> {
    let mut video_ids = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = api
            .fetch_playlist_page(playlist_id, page_token.as_deref())
            .await?;
        video_ids.extend(page.video_ids);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(video_ids)
}

/// Fetch full metadata for a list of video ids in contiguous chunks of at
/// most PAGE_SIZE, concatenated in submission order. Videos the API omits
/// are simply missing from the output; no placeholders.
pub async fn fetch_details(api: &dyn YouTubeApi, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
    let mut records = Vec::new();
    for chunk in video_ids.chunks(PAGE_SIZE) {
        records.extend(api.fetch_video_details(chunk).await?);
    }
    Ok(records)
}

/// Fetch up to COMMENT_SAMPLE top-level comments for one video. Failure is
/// contained per video: it is logged and reported as `Failed`, never
/// propagated, so one broken video cannot abort a harvest.
pub async fn sample_comments(api: &dyn YouTubeApi, video_id: &str) -> CommentFetch {
    match api.fetch_comments(video_id).await {
        Ok(mut comments) => {
            comments.truncate(COMMENT_SAMPLE);
            CommentFetch::Fetched(comments)
        }
        Err(e) => {
            error!("Could not get comments for video {video_id}: {e:?}");
            CommentFetch::Failed(e.to_string())
        }
    }
}

/// Live client against the Data API. One reqwest client, key from the
/// environment; every call is attempted exactly once.
pub struct YouTubeDataApi {
    client: Client,
    api_key: String,
}

impl YouTubeDataApi {
    pub fn from_env() -> Self {
        YouTubeDataApi {
            client: Client::new(),
            api_key: YOUTUBE_API_KEY.clone(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "YouTube API returned status {}",
                response.status()
            ));
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl YouTubeApi for YouTubeDataApi {
    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelSnapshot> {
        // https://developers.google.com/youtube/v3/docs/channels
        let url = format!(
            "https://www.googleapis.com/youtube/v3/channels?part=snippet,statistics,contentDetails&id={}&key={}",
            channel_id, self.api_key
        );
        let response = self.get_json(&url).await?;

        let item = response["items"]
            .as_array()
            .and_then(|items| items.first())
            .ok_or_else(|| anyhow::anyhow!("Channel {channel_id} not found"))?;

        Ok(ChannelSnapshot {
            channel_id: channel_id.to_string(),
            channel_name: item["snippet"]["title"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            subscribers: count_value(&item["statistics"]["subscriberCount"]).unwrap_or(0),
            video_count: count_value(&item["statistics"]["videoCount"]).unwrap_or(0),
            uploads_playlist_id: item["contentDetails"]["relatedPlaylists"]["uploads"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("No uploads playlist for channel {channel_id}"))?
                .to_string(),
        })
    }

    async fn fetch_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage> {
        // https://developers.google.com/youtube/v3/docs/playlistItems
        let mut url = format!(
            "https://www.googleapis.com/youtube/v3/playlistItems?part=contentDetails&playlistId={}&maxResults={}&key={}",
            playlist_id, PAGE_SIZE, self.api_key
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", token));
        }

        let response = self.get_json(&url).await?;

        let mut video_ids = Vec::new();
        if let Some(items) = response["items"].as_array() {
            for item in items {
                if let Some(video_id) = item["contentDetails"]["videoId"].as_str() {
                    video_ids.push(video_id.to_string());
                }
            }
        }

        Ok(PlaylistPage {
            video_ids,
            next_page_token: response["nextPageToken"].as_str().map(String::from),
        })
    }

    async fn fetch_video_details(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
        // https://developers.google.com/youtube/v3/docs/videos
        let url = format!(
            "https://www.googleapis.com/youtube/v3/videos?part=snippet,statistics,contentDetails&id={}&key={}",
            video_ids.join(","),
            self.api_key
        );
        let response = self.get_json(&url).await?;

        let mut records = Vec::new();
        if let Some(items) = response["items"].as_array() {
            for item in items {
                if let Some(record) = parse_video_record(item) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<String>> {
        // https://developers.google.com/youtube/v3/docs/commentThreads
        // First page only; comment pagination is out of scope.
        let url = format!(
            "https://www.googleapis.com/youtube/v3/commentThreads?part=snippet&videoId={}&key={}",
            video_id, self.api_key
        );
        let response = self.get_json(&url).await?;

        let mut comments = Vec::new();
        if let Some(items) = response["items"].as_array() {
            for item in items {
                if let Some(text) =
                    item["snippet"]["topLevelComment"]["snippet"]["textOriginal"].as_str()
                {
                    comments.push(text.to_string());
                }
            }
        }
        Ok(comments)
    }
}

/// Map one videos.list item to a VideoRecord. Each field is read on its
/// own; a missing field becomes None instead of dropping the record — live
/// videos frequently lack tags or caption info.
fn parse_video_record(item: &Value) -> Option<VideoRecord> {
    let video_id = item["id"].as_str()?.to_string();

    Some(VideoRecord {
        video_id,
        channel_title: string_value(&item["snippet"]["channelTitle"]),
        title: string_value(&item["snippet"]["title"]),
        description: string_value(&item["snippet"]["description"]),
        tags: item["snippet"]["tags"].as_array().map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect()
        }),
        published_at: string_value(&item["snippet"]["publishedAt"]),
        view_count: count_value(&item["statistics"]["viewCount"]),
        like_count: count_value(&item["statistics"]["likeCount"]),
        duration: string_value(&item["contentDetails"]["duration"]),
        definition: string_value(&item["contentDetails"]["definition"]),
        caption: string_value(&item["contentDetails"]["caption"]),
    })
}
