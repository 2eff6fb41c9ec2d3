use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

/// Channel-level stats as returned by one channels.list call.
/// Superseded, never merged, by a later harvest of the same channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub channel_name: String,
    pub subscribers: i64,
    pub video_count: i64,
    pub uploads_playlist_id: String,
}

/// One video's metadata from a videos.list item. Every field the API may
/// omit is an Option; a missing field is stored as null, the record itself
/// is never dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub channel_title: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published_at: Option<String>,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    pub duration: Option<String>, // ISO-8601, e.g. PT1H2M3S
    pub definition: Option<String>,
    pub caption: Option<String>,
}

/// Outcome of one comment-thread request. A video with zero comments is
/// `Fetched(vec![])`; a video whose request failed is `Failed` — the two
/// cases stay distinguishable instead of both collapsing to "empty".
#[derive(Debug, Clone)]
pub enum CommentFetch {
    Fetched(Vec<String>),
    Failed(String),
}

/// Flattened per-video entry embedded in a ChannelDocument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub video_id: String,
    pub title: Option<String>,
    pub likes: Option<i64>,
    pub views: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub published_at: Option<String>,
    pub comments: Vec<String>,
}

/// The unit of document-store persistence: one document per harvest.
/// A second harvest of the same channel appends a second document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDocument {
    pub channel_id: String,
    pub channel_name: String,
    pub subscribers: i64,
    pub video_count: i64,
    pub videos: Vec<VideoEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HarvestRequest {
    pub channel_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HarvestResponse {
    pub success: bool,
    pub message: String,
    pub channel_name: Option<String>,
    pub video_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelListResponse {
    pub channels: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MigrateRequest {
    pub channel_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MigrateResponse {
    pub success: bool,
    pub message: String,
}

/// Tabular query result: named columns plus rows of JSON cells, so the
/// caller can render any catalog entry the same way.
#[derive(Debug, Serialize, Deserialize)]
pub struct TableResponse {
    pub success: bool,
    pub message: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TableResponse {
    pub fn from_result(result: crate::services::catalog::TableResult) -> Self {
        let message = if result.rows.is_empty() {
            "No data available for the query.".to_string()
        } else {
            format!("{} rows returned.", result.rows.len())
        };
        TableResponse {
            success: true,
            message,
            columns: result.columns,
            rows: result.rows,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).unwrap();
        Response::build()
            .status(Status::BadRequest)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
