use crate::models::{ErrorResponse, TableResponse};
use crate::services::catalog::{self, CatalogQuery};
use crate::AppState;
use log::error;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/catalog?<name>")]
pub async fn run_catalog(
    state: &State<AppState>,
    name: String,
) -> Result<Json<TableResponse>, ErrorResponse> {
    let Some(query) = CatalogQuery::from_name(&name) else {
        return Err(ErrorResponse {
            error: "unknown_query".to_string(),
            message: format!(
                "Unknown catalog query '{}'. Available: {}",
                name,
                CatalogQuery::names().join(", ")
            ),
        });
    };

    match catalog::run_catalog_query(&state.warehouse, query).await {
        Ok(result) => Ok(Json(TableResponse::from_result(result))),
        Err(e) => {
            error!("Catalog query '{name}' failed: {e:?}");
            Err(ErrorResponse {
                error: "query_failed".to_string(),
                message: e.to_string(),
            })
        }
    }
}

#[get("/channels?<query>")]
pub async fn search_channels(
    state: &State<AppState>,
    query: String,
) -> Result<Json<TableResponse>, ErrorResponse> {
    match catalog::search_channels(&state.warehouse, &query).await {
        Ok(result) => Ok(Json(TableResponse::from_result(result))),
        Err(e) => {
            error!("Channel search failed: {e:?}");
            Err(ErrorResponse {
                error: "query_failed".to_string(),
                message: e.to_string(),
            })
        }
    }
}

#[get("/videos?<query>")]
pub async fn search_videos(
    state: &State<AppState>,
    query: String,
) -> Result<Json<TableResponse>, ErrorResponse> {
    match catalog::search_videos(&state.warehouse, &query).await {
        Ok(result) => Ok(Json(TableResponse::from_result(result))),
        Err(e) => {
            error!("Video search failed: {e:?}");
            Err(ErrorResponse {
                error: "query_failed".to_string(),
                message: e.to_string(),
            })
        }
    }
}
