#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;
mod utils;

use services::document_store::EsDocumentStore;
use services::youtube::YouTubeDataApi;
use sqlx::sqlite::SqlitePool;

/// Store clients held for the process lifetime and handed to each handler;
/// components only ever see them as explicit arguments.
pub struct AppState {
    pub youtube: YouTubeDataApi,
    pub documents: EsDocumentStore,
    pub warehouse: SqlitePool,
}

#[launch]
async fn rocket() -> _ {
    config::load_environment();
    config::init_logger();

    let state = config::create_app_state()
        .await
        .expect("Failed to initialise application state");
    let cors = config::create_cors().expect("Failed to create CORS options");

    rocket::build()
        .manage(state)
        .mount("/harvest", routes![api::harvest_channel])
        .mount("/migrate", routes![api::list_channel_names, api::migrate_channel])
        .mount(
            "/search",
            routes![api::run_catalog, api::search_channels, api::search_videos],
        )
        .mount("/join", routes![api::join_tables])
        .attach(cors)
}
