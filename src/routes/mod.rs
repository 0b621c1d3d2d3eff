use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod reports;
pub mod service_areas;
pub mod upload;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::public_router())
        .nest("/products", products::public_router())
        .nest("/admin/categories", categories::admin_router())
        .nest("/admin/products", products::admin_router())
        .nest("/admin/orders", orders::router())
        .nest("/admin/users", users::router())
        .nest("/admin/serviceareas", service_areas::router())
        .nest("/admin/reports", reports::router())
        .merge(upload::router())
        .merge(reports::stats_router())
}
