use axum::{Json, response::IntoResponse};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is reachable")
    ),
    tag = "ping"
)]
pub async fn ping() -> impl IntoResponse {
    Json(json!({}))
}
