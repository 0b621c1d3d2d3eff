use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::zones::CreateServiceAreaRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::ServiceArea,
    services::zone_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_service_areas).post(create_service_area))
}

#[utoipa::path(
    get,
    path = "/api/admin/serviceareas",
    responses(
        (status = 200, description = "List service areas", body = Vec<ServiceArea>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_service_areas(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<ServiceArea>>> {
    let resp = zone_service::list_service_areas(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/serviceareas",
    request_body = CreateServiceAreaRequest,
    responses(
        (status = 201, description = "Create service area", body = ServiceArea),
        (status = 400, description = "Polygon string is not valid GeoJSON"),
        (status = 409, description = "Name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_service_area(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateServiceAreaRequest>,
) -> AppResult<(StatusCode, Json<ServiceArea>)> {
    let resp = zone_service::create_service_area(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
