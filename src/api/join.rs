use crate::models::{ErrorResponse, TableResponse};
use crate::services::catalog;
use crate::AppState;
use log::error;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/")]
pub async fn join_tables(
    state: &State<AppState>,
) -> Result<Json<TableResponse>, ErrorResponse> {
    match catalog::join_channels_videos(&state.warehouse).await {
        Ok(result) => Ok(Json(TableResponse::from_result(result))),
        Err(e) => {
            error!("Join query failed: {e:?}");
            Err(ErrorResponse {
                error: "query_failed".to_string(),
                message: e.to_string(),
            })
        }
    }
}
