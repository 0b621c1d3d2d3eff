use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{DashboardStats, DateRangeQuery, SalesPoint, UsersPoint},
    error::AppResult,
    middleware::auth::AuthUser,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales-over-time", get(sales_over_time))
        .route("/users-over-time", get(users_over_time))
}

pub fn stats_router() -> Router<AppState> {
    Router::new().route("/admin/stats", get(stats))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DashboardStats>> {
    let resp = report_service::dashboard_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/sales-over-time",
    params(
        ("startDate" = Option<String>, Query, description = "ISO date, defaults to 30 days before endDate"),
        ("endDate" = Option<String>, Query, description = "ISO date, defaults to today"),
    ),
    responses(
        (status = 200, description = "Daily sales totals", body = Vec<SalesPoint>),
        (status = 400, description = "Invalid date parameters"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn sales_over_time(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<SalesPoint>>> {
    let resp = report_service::sales_over_time(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/users-over-time",
    params(
        ("startDate" = Option<String>, Query, description = "ISO date, defaults to 30 days before endDate"),
        ("endDate" = Option<String>, Query, description = "ISO date, defaults to today"),
    ),
    responses(
        (status = 200, description = "Daily signup counts, zero-filled", body = Vec<UsersPoint>),
        (status = 400, description = "Invalid date parameters"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn users_over_time(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<UsersPoint>>> {
    let resp = report_service::users_over_time(&state, &user, query).await?;
    Ok(Json(resp))
}
