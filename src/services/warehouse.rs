use crate::models::ChannelDocument;
use crate::services::document_store::DocumentStore;
use anyhow::Result;
use log::info;
use sqlx::sqlite::SqlitePool;

/// Outcome of a migration attempt. A lookup miss is a reportable state,
/// not an error.
#[derive(Debug, PartialEq, Eq)]
pub enum MigrateOutcome {
    Migrated { videos: usize },
    NotFound,
}

pub async fn init_warehouse(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS channels (
            channel_id TEXT PRIMARY KEY,
            channel_name TEXT NOT NULL,
            subscribers INTEGER NOT NULL,
            video_count INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS videos (
            video_id TEXT PRIMARY KEY,
            channel_id TEXT NOT NULL REFERENCES channels(channel_id),
            title TEXT,
            likes INTEGER,
            views INTEGER,
            duration_seconds INTEGER,
            published_at TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS comments (
            video_id TEXT NOT NULL REFERENCES videos(video_id),
            comment_text TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up one document by exact channel name and project it into the
/// warehouse. The lookup runs first: a miss returns NotFound and leaves
/// the tables untouched.
pub async fn migrate_by_name(
    documents: &dyn DocumentStore,
    pool: &SqlitePool,
    channel_name: &str,
) -> Result<MigrateOutcome> {
    let Some(document) = documents.find_by_name(channel_name).await? else {
        return Ok(MigrateOutcome::NotFound);
    };

    let videos = migrate_channel(pool, &document).await?;
    Ok(MigrateOutcome::Migrated { videos })
}

/// Rebuild the warehouse from one channel document. Truncation and all
/// inserts run in a single transaction: the warehouse either reflects the
/// migrated channel completely or keeps its prior contents.
pub async fn migrate_channel(pool: &SqlitePool, document: &ChannelDocument) -> Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM comments").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM videos").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM channels").execute(&mut *tx).await?;

    // Channel row first so every video row references an existing channel.
    sqlx::query("INSERT INTO channels (channel_id, channel_name, subscribers, video_count) VALUES (?, ?, ?, ?)")
        .bind(&document.channel_id)
        .bind(&document.channel_name)
        .bind(document.subscribers)
        .bind(document.video_count)
        .execute(&mut *tx)
        .await?;

    for video in &document.videos {
        sqlx::query(
            "INSERT INTO videos (video_id, channel_id, title, likes, views, duration_seconds, published_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&video.video_id)
        .bind(&document.channel_id)
        .bind(&video.title)
        .bind(video.likes)
        .bind(video.views)
        .bind(video.duration_seconds)
        .bind(&video.published_at)
        .execute(&mut *tx)
        .await?;

        for comment in &video.comments {
            sqlx::query("INSERT INTO comments (video_id, comment_text) VALUES (?, ?)")
                .bind(&video.video_id)
                .bind(comment)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    info!(
        "Migrated channel {} with {} videos into the warehouse.",
        document.channel_name,
        document.videos.len()
    );
    Ok(document.videos.len())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::VideoEntry;
    use async_trait::async_trait;
    use sqlx::Row;

    pub(crate) async fn memory_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        init_warehouse(&pool).await.unwrap();
        pool
    }

    pub(crate) fn entry(video_id: &str, title: &str, likes: i64) -> VideoEntry {
        VideoEntry {
            video_id: video_id.to_string(),
            title: Some(title.to_string()),
            likes: Some(likes),
            views: Some(likes * 10),
            duration_seconds: Some(120),
            published_at: Some("2022-06-01T00:00:00Z".to_string()),
            comments: vec![],
        }
    }

    pub(crate) fn document(channel_id: &str, name: &str, videos: Vec<VideoEntry>) -> ChannelDocument {
        ChannelDocument {
            channel_id: channel_id.to_string(),
            channel_name: name.to_string(),
            subscribers: 500,
            video_count: videos.len() as i64,
            videos,
        }
    }

    struct SingleDocStore(ChannelDocument);

    #[async_trait]
    impl DocumentStore for SingleDocStore {
        async fn insert(&self, _document: &ChannelDocument) -> Result<()> {
            Ok(())
        }

        async fn find_by_name(&self, channel_name: &str) -> Result<Option<ChannelDocument>> {
            Ok((self.0.channel_name == channel_name).then(|| self.0.clone()))
        }

        async fn distinct_channel_names(&self) -> Result<Vec<String>> {
            Ok(vec![self.0.channel_name.clone()])
        }
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
            .get("n")
    }

    #[tokio::test]
    async fn migration_inserts_channel_videos_and_comments() {
        let pool = memory_pool().await;
        let mut v1 = entry("v1", "First", 3);
        v1.comments = vec!["a".to_string(), "b".to_string()];
        let doc = document("UC1", "C", vec![v1, entry("v2", "Second", 7)]);

        let migrated = migrate_channel(&pool, &doc).await.unwrap();

        assert_eq!(migrated, 2);
        assert_eq!(count(&pool, "channels").await, 1);
        assert_eq!(count(&pool, "videos").await, 2);
        assert_eq!(count(&pool, "comments").await, 2);
    }

    #[tokio::test]
    async fn second_migration_replaces_first() {
        let pool = memory_pool().await;
        let first = document("UC1", "First", vec![entry("v1", "One", 1)]);
        let second = document(
            "UC2",
            "Second",
            vec![entry("v2", "Two", 2), entry("v3", "Three", 3)],
        );

        migrate_channel(&pool, &first).await.unwrap();
        migrate_channel(&pool, &second).await.unwrap();

        assert_eq!(count(&pool, "channels").await, 1);
        assert_eq!(count(&pool, "videos").await, 2);
        let name: String = sqlx::query("SELECT channel_name FROM channels")
            .fetch_one(&pool)
            .await
            .unwrap()
            .get("channel_name");
        assert_eq!(name, "Second");
    }

    #[tokio::test]
    async fn lookup_miss_leaves_warehouse_untouched() {
        let pool = memory_pool().await;
        let existing = document("UC1", "Kept", vec![entry("v1", "One", 1)]);
        migrate_channel(&pool, &existing).await.unwrap();

        let store = SingleDocStore(document("UC2", "Other", vec![]));
        let outcome = migrate_by_name(&store, &pool, "Missing").await.unwrap();

        assert_eq!(outcome, MigrateOutcome::NotFound);
        // Prior contents survive a failed lookup.
        assert_eq!(count(&pool, "channels").await, 1);
        assert_eq!(count(&pool, "videos").await, 1);
    }

    #[tokio::test]
    async fn migrate_by_name_projects_the_matching_document() {
        let pool = memory_pool().await;
        let store = SingleDocStore(document("UC1", "C", vec![entry("v1", "One", 1)]));

        let outcome = migrate_by_name(&store, &pool, "C").await.unwrap();

        assert_eq!(outcome, MigrateOutcome::Migrated { videos: 1 });
        assert_eq!(count(&pool, "videos").await, 1);
    }
}
