use anyhow::Result;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Rows plus display headers for one analytical statement.
#[derive(Debug)]
pub struct TableResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// The fixed set of analytical statements over the warehouse. Each entry is
/// parameter-free; presentation renders the rows under the given headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogQuery {
    VideosAndChannels,
    ChannelsWithMostVideos,
    TopViewedVideos,
    CommentsPerVideo,
    TopLikedVideos,
    LikesPerVideo,
    TotalViewsPerChannel,
    ChannelsPublishedIn2022,
    AverageDurationPerChannel,
    TopCommentedVideos,
}

impl CatalogQuery {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "videos_and_channels" => Some(Self::VideosAndChannels),
            "channels_with_most_videos" => Some(Self::ChannelsWithMostVideos),
            "top_viewed_videos" => Some(Self::TopViewedVideos),
            "comments_per_video" => Some(Self::CommentsPerVideo),
            "top_liked_videos" => Some(Self::TopLikedVideos),
            "likes_per_video" => Some(Self::LikesPerVideo),
            "total_views_per_channel" => Some(Self::TotalViewsPerChannel),
            "channels_published_in_2022" => Some(Self::ChannelsPublishedIn2022),
            "average_duration_per_channel" => Some(Self::AverageDurationPerChannel),
            "top_commented_videos" => Some(Self::TopCommentedVideos),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &[
            "videos_and_channels",
            "channels_with_most_videos",
            "top_viewed_videos",
            "comments_per_video",
            "top_liked_videos",
            "likes_per_video",
            "total_views_per_channel",
            "channels_published_in_2022",
            "average_duration_per_channel",
            "top_commented_videos",
        ]
    }

    fn statement(&self) -> &'static str {
        match self {
            Self::VideosAndChannels => {
                "SELECT videos.title, channels.channel_name \
                 FROM videos JOIN channels ON videos.channel_id = channels.channel_id"
            }
            Self::ChannelsWithMostVideos => {
                "SELECT channel_name, COUNT(*) AS video_count \
                 FROM videos JOIN channels ON videos.channel_id = channels.channel_id \
                 GROUP BY channel_name \
                 ORDER BY video_count DESC"
            }
            Self::TopViewedVideos => {
                "SELECT videos.title, channels.channel_name \
                 FROM videos JOIN channels ON videos.channel_id = channels.channel_id \
                 ORDER BY videos.views DESC \
                 LIMIT 10"
            }
            Self::CommentsPerVideo => {
                "SELECT videos.title, COUNT(*) AS comment_count \
                 FROM videos JOIN comments ON videos.video_id = comments.video_id \
                 GROUP BY videos.video_id, videos.title"
            }
            Self::TopLikedVideos => {
                "SELECT videos.title, channels.channel_name \
                 FROM videos JOIN channels ON videos.channel_id = channels.channel_id \
                 ORDER BY videos.likes DESC \
                 LIMIT 10"
            }
            Self::LikesPerVideo => "SELECT videos.title, videos.likes FROM videos",
            Self::TotalViewsPerChannel => {
                "SELECT channels.channel_name, SUM(videos.views) AS total_views \
                 FROM channels JOIN videos ON channels.channel_id = videos.channel_id \
                 GROUP BY channels.channel_id, channels.channel_name"
            }
            Self::ChannelsPublishedIn2022 => {
                "SELECT DISTINCT channel_name \
                 FROM channels JOIN videos ON channels.channel_id = videos.channel_id \
                 WHERE strftime('%Y', videos.published_at) = '2022'"
            }
            Self::AverageDurationPerChannel => {
                "SELECT channels.channel_name, AVG(videos.duration_seconds) AS average_duration \
                 FROM channels JOIN videos ON channels.channel_id = videos.channel_id \
                 GROUP BY channels.channel_id, channels.channel_name"
            }
            Self::TopCommentedVideos => {
                "SELECT videos.title, channels.channel_name \
                 FROM videos JOIN channels ON videos.channel_id = channels.channel_id \
                 LEFT JOIN comments ON videos.video_id = comments.video_id \
                 GROUP BY videos.video_id, videos.title, channels.channel_name \
                 ORDER BY COUNT(comments.video_id) DESC \
                 LIMIT 10"
            }
        }
    }

    fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::VideosAndChannels => &["Video Title", "Channel Name"],
            Self::ChannelsWithMostVideos => &["Channel Name", "Video Count"],
            Self::TopViewedVideos => &["Video Title", "Channel Name"],
            Self::CommentsPerVideo => &["Video Title", "Comment Count"],
            Self::TopLikedVideos => &["Video Title", "Channel Name"],
            Self::LikesPerVideo => &["Video Title", "Likes"],
            Self::TotalViewsPerChannel => &["Channel Name", "Total Views"],
            Self::ChannelsPublishedIn2022 => &["Channel Name"],
            Self::AverageDurationPerChannel => &["Channel Name", "Average Duration"],
            Self::TopCommentedVideos => &["Video Title", "Channel Name"],
        }
    }
}

pub async fn run_catalog_query(pool: &SqlitePool, query: CatalogQuery) -> Result<TableResult> {
    let rows = sqlx::query(query.statement()).fetch_all(pool).await?;
    Ok(to_table(query.columns(), &rows))
}

/// Ad-hoc lookup: channels whose name contains the query substring.
pub async fn search_channels(pool: &SqlitePool, query: &str) -> Result<TableResult> {
    let rows = sqlx::query("SELECT channel_id, channel_name, subscribers, video_count FROM channels WHERE channel_name LIKE ?")
        .bind(format!("%{query}%"))
        .fetch_all(pool)
        .await?;
    Ok(to_table(
        &["Channel ID", "Channel Name", "Subscribers", "Video Count"],
        &rows,
    ))
}

/// Ad-hoc lookup: videos whose title contains the query substring.
pub async fn search_videos(pool: &SqlitePool, query: &str) -> Result<TableResult> {
    let rows = sqlx::query(
        "SELECT video_id, channel_id, title, likes FROM videos WHERE title LIKE ?",
    )
    .bind(format!("%{query}%"))
    .fetch_all(pool)
    .await?;
    Ok(to_table(&["Video ID", "Channel ID", "Video Title", "Likes"], &rows))
}

/// The channels⋈videos projection of the Join action.
pub async fn join_channels_videos(pool: &SqlitePool) -> Result<TableResult> {
    let rows = sqlx::query(
        "SELECT channels.channel_name, videos.title, videos.likes \
         FROM channels JOIN videos ON channels.channel_id = videos.channel_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(to_table(&["Channel Name", "Video Title", "Likes"], &rows))
}

fn to_table(columns: &[&str], rows: &[SqliteRow]) -> TableResult {
    TableResult {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| (0..columns.len()).map(|i| cell_value(row, i)).collect())
            .collect(),
    }
}

/// Decode one result cell without knowing the statement's column types:
/// integer first, then real (aggregates), then text; anything else is null.
fn cell_value(row: &SqliteRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Value::from(v);
    }
    match row.try_get::<Option<String>, _>(idx) {
        Ok(Some(s)) => Value::from(s),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::warehouse::tests::{document, entry, memory_pool};
    use crate::services::warehouse::migrate_channel;
    use serde_json::json;

    async fn seed_channel(pool: &SqlitePool, id: &str, name: &str, videos: usize) {
        sqlx::query("INSERT INTO channels (channel_id, channel_name, subscribers, video_count) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(100)
            .bind(videos as i64)
            .execute(pool)
            .await
            .unwrap();
        for i in 0..videos {
            sqlx::query("INSERT INTO videos (video_id, channel_id, title, likes, views, duration_seconds, published_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
                .bind(format!("{id}-v{i}"))
                .bind(id)
                .bind(format!("{name} video {i}"))
                .bind(i as i64)
                .bind((i as i64) * 100)
                .bind(60 + i as i64)
                .bind("2022-03-01T12:00:00Z")
                .execute(pool)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn round_trip_harvested_document_to_join_query() {
        let pool = memory_pool().await;
        let doc = document(
            "UC1",
            "C",
            vec![entry("v1", "First upload", 5), entry("v2", "Second upload", 9)],
        );
        migrate_channel(&pool, &doc).await.unwrap();

        let result = run_catalog_query(&pool, CatalogQuery::VideosAndChannels)
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["Video Title", "Channel Name"]);
        assert_eq!(
            result.rows,
            vec![
                vec![json!("First upload"), json!("C")],
                vec![json!("Second upload"), json!("C")],
            ]
        );
    }

    #[tokio::test]
    async fn channels_with_most_videos_orders_by_exact_counts() {
        let pool = memory_pool().await;
        seed_channel(&pool, "UCA", "A", 5).await;
        seed_channel(&pool, "UCB", "B", 2).await;
        seed_channel(&pool, "UCC", "C", 5).await;

        let result = run_catalog_query(&pool, CatalogQuery::ChannelsWithMostVideos)
            .await
            .unwrap();

        assert_eq!(result.rows.len(), 3);
        // Two channels tie at 5 (either order), B trails with 2.
        assert_eq!(result.rows[0][1], json!(5));
        assert_eq!(result.rows[1][1], json!(5));
        assert_eq!(result.rows[2], vec![json!("B"), json!(2)]);
    }

    #[tokio::test]
    async fn comment_counts_come_from_the_sampled_comments_table() {
        let pool = memory_pool().await;
        let mut v1 = entry("v1", "Chatty", 1);
        v1.comments = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut v2 = entry("v2", "Quiet", 2);
        v2.comments = vec!["only one".to_string()];
        let doc = document("UC1", "C", vec![v1, v2]);
        migrate_channel(&pool, &doc).await.unwrap();

        let result = run_catalog_query(&pool, CatalogQuery::CommentsPerVideo)
            .await
            .unwrap();
        assert_eq!(result.rows.len(), 2);
        assert!(result.rows.contains(&vec![json!("Chatty"), json!(3)]));
        assert!(result.rows.contains(&vec![json!("Quiet"), json!(1)]));

        let top = run_catalog_query(&pool, CatalogQuery::TopCommentedVideos)
            .await
            .unwrap();
        assert_eq!(top.rows[0][0], json!("Chatty"));
    }

    #[tokio::test]
    async fn empty_warehouse_returns_headers_and_no_rows() {
        let pool = memory_pool().await;

        let result = run_catalog_query(&pool, CatalogQuery::TopLikedVideos)
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["Video Title", "Channel Name"]);
        assert!(result.rows.is_empty());
    }

    #[tokio::test]
    async fn published_in_2022_uses_the_stored_timestamp() {
        let pool = memory_pool().await;
        seed_channel(&pool, "UCA", "A", 1).await;
        // Channel whose only video is outside 2022.
        sqlx::query("INSERT INTO channels (channel_id, channel_name, subscribers, video_count) VALUES ('UCB', 'B', 1, 1)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO videos (video_id, channel_id, title, likes, views, duration_seconds, published_at) VALUES ('old', 'UCB', 'Old', 0, 0, 10, '2019-01-01T00:00:00Z')")
            .execute(&pool)
            .await
            .unwrap();

        let result = run_catalog_query(&pool, CatalogQuery::ChannelsPublishedIn2022)
            .await
            .unwrap();

        assert_eq!(result.rows, vec![vec![json!("A")]]);
    }

    #[tokio::test]
    async fn average_duration_is_a_real_number() {
        let pool = memory_pool().await;
        seed_channel(&pool, "UCA", "A", 2).await; // durations 60 and 61

        let result = run_catalog_query(&pool, CatalogQuery::AverageDurationPerChannel)
            .await
            .unwrap();

        assert_eq!(result.rows, vec![vec![json!("A"), json!(60.5)]]);
    }

    #[tokio::test]
    async fn substring_searches_match_partial_names() {
        let pool = memory_pool().await;
        seed_channel(&pool, "UCA", "Rustacean Station", 2).await;

        let channels = search_channels(&pool, "acean").await.unwrap();
        assert_eq!(channels.rows.len(), 1);
        assert_eq!(channels.rows[0][1], json!("Rustacean Station"));

        let videos = search_videos(&pool, "video 1").await.unwrap();
        assert_eq!(videos.rows.len(), 1);

        let none = search_videos(&pool, "zebra").await.unwrap();
        assert!(none.rows.is_empty());
    }

    #[tokio::test]
    async fn join_projects_channel_video_pairs() {
        let pool = memory_pool().await;
        let doc = document("UC1", "C", vec![entry("v1", "Only", 4)]);
        migrate_channel(&pool, &doc).await.unwrap();

        let result = join_channels_videos(&pool).await.unwrap();

        assert_eq!(result.columns, vec!["Channel Name", "Video Title", "Likes"]);
        assert_eq!(result.rows, vec![vec![json!("C"), json!("Only"), json!(4)]]);
    }

    #[test]
    fn every_catalog_name_resolves() {
        for name in CatalogQuery::names() {
            assert!(CatalogQuery::from_name(name).is_some(), "{name}");
        }
        assert!(CatalogQuery::from_name("nope").is_none());
    }
}
