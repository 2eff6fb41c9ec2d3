use crate::models::{ChannelDocument, ChannelSnapshot, CommentFetch, VideoEntry, VideoRecord};
use crate::services::document_store::DocumentStore;
use crate::services::youtube::{self, YouTubeApi};
use crate::utils::parse_iso8601_duration_to_seconds;
use anyhow::Result;
use log::info;
use std::collections::HashMap;

/// End-to-end harvest of one channel: snapshot, full upload enumeration,
/// batched details, per-video comment samples, then one document insert.
/// Channel-level and pagination errors abort the harvest; comment failures
/// are contained per video inside the sampler.
pub async fn harvest(
    api: &dyn YouTubeApi,
    documents: &dyn DocumentStore,
    channel_id: &str,
) -> Result<ChannelDocument> {
    let snapshot = api.fetch_channel(channel_id).await?;
    info!(
        "Harvesting channel {} ({}), {} videos reported.",
        snapshot.channel_name, snapshot.channel_id, snapshot.video_count
    );

    let video_ids = youtube::collect_video_ids(api, &snapshot.uploads_playlist_id).await?;
    info!("Collected {} video ids from uploads playlist.", video_ids.len());

    let details = youtube::fetch_details(api, &video_ids).await?;

    let mut comments: HashMap<String, Vec<String>> = HashMap::new();
    for video_id in &video_ids {
        match youtube::sample_comments(api, video_id).await {
            CommentFetch::Fetched(list) => {
                comments.insert(video_id.clone(), list);
            }
            // Already logged by the sampler; no map entry, so the video
            // joins to an empty comment list below.
            CommentFetch::Failed(_) => {}
        }
    }

    let document = assemble_document(&snapshot, &details, &comments);
    documents.insert(&document).await?;

    Ok(document)
}

/// Join video details with their comment samples by video id. Output order
/// follows the detail fetcher's order; a video without a comment bundle
/// gets an empty list, never a missing entry.
pub fn assemble_document(
    snapshot: &ChannelSnapshot,
    details: &[VideoRecord],
    comments: &HashMap<String, Vec<String>>,
) -> ChannelDocument {
    let videos = details
        .iter()
        .map(|record| VideoEntry {
            video_id: record.video_id.clone(),
            title: record.title.clone(),
            likes: record.like_count,
            views: record.view_count,
            duration_seconds: record
                .duration
                .as_deref()
                .map(parse_iso8601_duration_to_seconds),
            published_at: record.published_at.clone(),
            comments: comments.get(&record.video_id).cloned().unwrap_or_default(),
        })
        .collect();

    ChannelDocument {
        channel_id: snapshot.channel_id.clone(),
        channel_name: snapshot.channel_name.clone(),
        subscribers: snapshot.subscribers,
        video_count: snapshot.video_count,
        videos,
    }
}
