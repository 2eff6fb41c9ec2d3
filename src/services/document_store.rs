use crate::models::ChannelDocument;
use anyhow::Result;
use async_trait::async_trait;
use elasticsearch::{indices::IndicesCreateParts, Elasticsearch, IndexParts, SearchParts};
use log::{error, info};
use serde_json::{json, Value};

const DOCUMENT_INDEX: &str = "channel_documents";

/// Persistence contract for harvested channel documents. The store does not
/// enforce channel uniqueness; every insert appends a new document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, document: &ChannelDocument) -> Result<()>;
    /// First document whose channel_name matches exactly, if any.
    async fn find_by_name(&self, channel_name: &str) -> Result<Option<ChannelDocument>>;
    async fn distinct_channel_names(&self) -> Result<Vec<String>>;
}

pub struct EsDocumentStore {
    es_client: Elasticsearch,
}

impl EsDocumentStore {
    pub fn new(es_client: Elasticsearch) -> Self {
        EsDocumentStore { es_client }
    }
}

#[async_trait]
impl DocumentStore for EsDocumentStore {
    async fn insert(&self, document: &ChannelDocument) -> Result<()> {
        // No document id on purpose: a re-harvest appends rather than
        // overwrites, and migration selects by name.
        let response = self
            .es_client
            .index(IndexParts::Index(DOCUMENT_INDEX))
            .body(json!(document))
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to index channel document: {}",
                response.text().await.unwrap_or_default()
            ));
        }

        info!(
            "Stored channel document for {} ({} videos).",
            document.channel_name,
            document.videos.len()
        );
        Ok(())
    }

    async fn find_by_name(&self, channel_name: &str) -> Result<Option<ChannelDocument>> {
        let search_body = json!({
            "size": 1,
            "query": {
                "term": {
                    "channel_name": channel_name
                }
            }
        });

        let response = self
            .es_client
            .search(SearchParts::Index(&[DOCUMENT_INDEX]))
            .body(search_body)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(anyhow::anyhow!(
                "Elasticsearch search failed with status: {}",
                response.status_code()
            ));
        }

        let json_response: Value = response.json().await?;
        if let Some(hits) = json_response["hits"]["hits"].as_array() {
            if let Some(hit) = hits.first() {
                if let Some(source) = hit.get("_source") {
                    return Ok(Some(serde_json::from_value(source.clone())?));
                }
            }
        }
        Ok(None)
    }

    async fn distinct_channel_names(&self) -> Result<Vec<String>> {
        let search_body = json!({
            "size": 0,
            "aggs": {
                "channel_names": {
                    "terms": {
                        "field": "channel_name",
                        "size": 1000
                    }
                }
            }
        });

        let response = self
            .es_client
            .search(SearchParts::Index(&[DOCUMENT_INDEX]))
            .body(search_body)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(anyhow::anyhow!(
                "Elasticsearch aggregation failed with status: {}",
                response.status_code()
            ));
        }

        let json_response: Value = response.json().await?;
        let mut names = Vec::new();
        if let Some(buckets) =
            json_response["aggregations"]["channel_names"]["buckets"].as_array()
        {
            for bucket in buckets {
                if let Some(name) = bucket["key"].as_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

/// Create the document index with a keyword mapping on channel_name so that
/// exact-name lookup and the distinct-names aggregation work.
pub async fn create_document_index(es_client: &Elasticsearch) {
    let create_index_body = json!({
        "mappings": {
            "properties": {
                "channel_id": { "type": "keyword" },
                "channel_name": { "type": "keyword" },
                "subscribers": { "type": "long" },
                "video_count": { "type": "long" }
            }
        }
    });

    match es_client
        .indices()
        .create(IndicesCreateParts::Index(DOCUMENT_INDEX))
        .body(create_index_body)
        .send()
        .await
    {
        Ok(response) => {
            if response.status_code().is_success() {
                info!("Elasticsearch index '{DOCUMENT_INDEX}' created or already exists.");
            } else {
                let response_text = response.text().await.unwrap_or_default();
                if response_text.contains("resource_already_exists_exception") {
                    info!("Elasticsearch index '{DOCUMENT_INDEX}' already exists.");
                } else {
                    error!("Failed to create Elasticsearch index: {response_text}");
                }
            }
        }
        Err(e) => {
            error!("Failed to connect to Elasticsearch to create index: {e:?}");
        }
    }
}
