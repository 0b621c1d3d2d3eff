use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::zones::CreateServiceAreaRequest,
    entity::service_areas::{ActiveModel, Column, Entity as ServiceAreas, Model as ZoneModel},
    error::{AppError, AppResult},
    geo::ZonePolygon,
    middleware::auth::{AuthUser, ensure_admin},
    models::ServiceArea,
    state::AppState,
};

/// Service areas are served as a bare array (legacy shape).
pub async fn list_service_areas(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<Vec<ServiceArea>> {
    ensure_admin(user)?;
    let zones = ServiceAreas::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(zone_from_entity)
        .collect();
    Ok(zones)
}

pub async fn create_service_area(
    state: &AppState,
    user: &AuthUser,
    payload: CreateServiceAreaRequest,
) -> AppResult<ServiceArea> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("name", "Name is required"));
    }

    if let Err(err) = ZonePolygon::parse(&payload.geo_json_polygon) {
        return Err(AppError::BadRequest(format!(
            "geoJsonPolygon is not a valid GeoJSON polygon: {err}"
        )));
    }

    let taken = ServiceAreas::find()
        .filter(Column::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if taken {
        return Err(AppError::Conflict(format!(
            "Service area with name '{name}' already exists."
        )));
    }

    let zone = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        geo_json_polygon: Set(payload.geo_json_polygon),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "service_area_create",
        Some("service_areas"),
        Some(serde_json::json!({ "service_area_id": zone.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(zone_from_entity(zone))
}

fn zone_from_entity(model: ZoneModel) -> ServiceArea {
    ServiceArea {
        id: model.id,
        name: model.name,
        geo_json_polygon: model.geo_json_polygon,
    }
}
