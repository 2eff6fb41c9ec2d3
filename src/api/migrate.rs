use crate::models::{ChannelListResponse, MigrateRequest, MigrateResponse};
use crate::services::document_store::DocumentStore;
use crate::services::warehouse::{self, MigrateOutcome};
use crate::AppState;
use log::error;
use rocket::serde::json::Json;
use rocket::{get, post, State};

/// Distinct channel names currently in the document store: the selection
/// list for a migration.
#[get("/channels")]
pub async fn list_channel_names(state: &State<AppState>) -> Json<ChannelListResponse> {
    match state.documents.distinct_channel_names().await {
        Ok(channels) => Json(ChannelListResponse { channels }),
        Err(e) => {
            error!("Failed to list stored channel names: {e:?}");
            Json(ChannelListResponse { channels: vec![] })
        }
    }
}

#[post("/", data = "<request>")]
pub async fn migrate_channel(
    state: &State<AppState>,
    request: Json<MigrateRequest>,
) -> Json<MigrateResponse> {
    match warehouse::migrate_by_name(&state.documents, &state.warehouse, &request.channel_name)
        .await
    {
        Ok(MigrateOutcome::Migrated { videos }) => Json(MigrateResponse {
            success: true,
            message: format!(
                "Migrated '{}' with {} videos to the warehouse.",
                request.channel_name, videos
            ),
        }),
        Ok(MigrateOutcome::NotFound) => Json(MigrateResponse {
            success: false,
            message: format!("No stored document for channel '{}'.", request.channel_name),
        }),
        Err(e) => {
            error!("Migration failed for '{}': {e:?}", request.channel_name);
            Json(MigrateResponse {
                success: false,
                message: format!("Migration failed: {e}"),
            })
        }
    }
}
