use crate::services::document_store::{create_document_index, EsDocumentStore};
use crate::services::warehouse;
use crate::services::youtube::YouTubeDataApi;
use crate::AppState;
use anyhow::Result;
use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch,
};
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use sqlx::sqlite::SqlitePool;
use std::env;

lazy_static! {
    pub static ref YOUTUBE_API_KEY: String =
        env::var("YOUTUBE_API_KEY").expect("YOUTUBE_API_KEY environment variable must be set");
    pub static ref ELASTICSEARCH_URL: String =
        env::var("ELASTICSEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());
    pub static ref WAREHOUSE_DATABASE_URL: String = env::var("WAREHOUSE_DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://yt_warehouse.db?mode=rwc".to_string());
}

pub fn init_logger() {
    Builder::new().filter_level(LevelFilter::Info).init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_elasticsearch_client() -> Result<Elasticsearch> {
    let es_url = &*ELASTICSEARCH_URL;
    info!("Connecting to Elasticsearch at: {es_url}");

    let transport =
        TransportBuilder::new(SingleNodeConnectionPool::new(es_url.parse()?)).build()?;

    Ok(Elasticsearch::new(transport))
}

pub async fn create_warehouse_pool() -> Result<SqlitePool> {
    let db_url = &*WAREHOUSE_DATABASE_URL;
    info!("Connecting to warehouse at: {db_url}");

    let pool = SqlitePool::connect(db_url).await?;
    warehouse::init_warehouse(&pool).await?;

    Ok(pool)
}

pub async fn create_app_state() -> Result<AppState> {
    let es_client = create_elasticsearch_client()?;
    create_document_index(&es_client).await;

    let warehouse = create_warehouse_pool().await?;

    Ok(AppState {
        youtube: YouTubeDataApi::from_env(),
        documents: EsDocumentStore::new(es_client),
        warehouse,
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&["http://localhost:8080"]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&[
            "Authorization",
            "Accept",
            "Content-Type",
        ]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
