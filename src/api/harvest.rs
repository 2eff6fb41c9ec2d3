use crate::models::{HarvestRequest, HarvestResponse};
use crate::services::harvester;
use crate::AppState;
use log::error;
use rocket::serde::json::Json;
use rocket::{post, State};

#[post("/", data = "<request>")]
pub async fn harvest_channel(
    state: &State<AppState>,
    request: Json<HarvestRequest>,
) -> Json<HarvestResponse> {
    match harvester::harvest(&state.youtube, &state.documents, &request.channel_id).await {
        Ok(document) => Json(HarvestResponse {
            success: true,
            message: format!(
                "Harvested '{}' and stored {} videos in the document store.",
                document.channel_name,
                document.videos.len()
            ),
            video_count: document.videos.len(),
            channel_name: Some(document.channel_name),
        }),
        Err(e) => {
            error!("Harvest failed for channel {}: {e:?}", request.channel_id);
            Json(HarvestResponse {
                success: false,
                message: format!("Harvest failed: {e}"),
                channel_name: None,
                video_count: 0,
            })
        }
    }
}
