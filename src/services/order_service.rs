use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        AdminOrderRow, OrderDetail, OrderItemRow, UpdateOrderStatusRequest,
        UpdateOrderStatusResponse,
    },
    entity::{
        delivery_locations::{Column as LocCol, Entity as DeliveryLocations, Model as LocationModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        service_areas::Entity as ServiceAreas,
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    geo,
    middleware::auth::{AuthUser, ensure_admin},
    models::{DeliveryInfo, OrderStatus},
    response::Paginated,
    routes::params::{DateFilter, OrderListQuery, SortOrder},
    state::AppState,
};

const UNKNOWN_CUSTOMER: &str = "(N/A)";

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<Paginated<AdminOrderRow>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize_with(20);

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }
    if let Some(DateFilter::Today) = query.date_filter {
        let today = Utc::now().date_naive();
        let start = Utc.from_utc_datetime(&today.and_hms_opt(0, 0, 0).unwrap_or_default());
        let end = Utc.from_utc_datetime(&today.and_hms_opt(23, 59, 59).unwrap_or_default());
        condition = condition
            .add(OrderCol::CreatedAt.gte(start))
            .add(OrderCol::CreatedAt.lte(end));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let finder = sort_order.apply(Orders::find().filter(condition), OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let locations = load_locations(state, &models).await?;
    let emails = load_user_emails(state, &models).await?;

    let rows = models
        .into_iter()
        .map(|model| {
            let delivery_info = model
                .delivery_location_id
                .and_then(|id| locations.get(&id))
                .map(delivery_info_from);
            let customer_name = delivery_info
                .as_ref()
                .map(|info| info.name.clone())
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
            AdminOrderRow {
                id: model.id,
                status: model.status,
                total_amount: model.total_amount,
                created_at: model.created_at.with_timezone(&Utc),
                updated_at: model.updated_at.with_timezone(&Utc),
                user_email: emails.get(&model.user_id).cloned(),
                customer_name,
                delivery_info,
            }
        })
        .collect();

    Ok(Paginated::new(rows, page, limit, total))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderDetail> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => {
            return Err(AppError::NotFound(format!("Order with ID {id} not found")));
        }
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|item| OrderItemRow {
            id: item.id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price,
        })
        .collect();

    let user_email = Users::find_by_id(order.user_id)
        .one(&state.orm)
        .await?
        .map(|u| u.email);

    let delivery_location = match order.delivery_location_id {
        Some(location_id) => DeliveryLocations::find_by_id(location_id)
            .one(&state.orm)
            .await?
            .map(|loc| delivery_info_from(&loc)),
        None => None,
    };

    // Coordinates that fail validation are served as null rather than
    // propagated; the row itself must still render.
    let coordinates = match geo::Coordinates::from_optional(order.latitude, order.longitude) {
        Ok(coords) => coords,
        Err(err) => {
            tracing::warn!(order_id = %order.id, error = %err, "order has invalid coordinates");
            None
        }
    };

    let in_service_zone = match &coordinates {
        Some(coords) => {
            let zones = ServiceAreas::find().all(&state.orm).await?;
            Some(geo::point_in_any_zone(
                coords,
                zones
                    .iter()
                    .map(|z| (z.name.clone(), z.geo_json_polygon.as_str())),
            ))
        }
        None => None,
    };

    Ok(OrderDetail {
        id: order.id,
        status: order.status,
        total_amount: order.total_amount,
        created_at: order.created_at.with_timezone(&Utc),
        updated_at: order.updated_at.with_timezone(&Utc),
        latitude: coordinates.map(|c| c.latitude),
        longitude: coordinates.map(|c| c.longitude),
        in_service_zone,
        user_email,
        delivery_location,
        items,
    })
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<UpdateOrderStatusResponse> {
    ensure_admin(user)?;
    let status = OrderStatus::parse(payload.status.trim()).ok_or_else(|| {
        let allowed = OrderStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        AppError::validation("status", format!("Status must be one of: {allowed}"))
    })?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => {
            return Err(AppError::NotFound(format!("Order with ID {id} not found")));
        }
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(UpdateOrderStatusResponse {
        id: order.id,
        status: order.status,
    })
}

async fn load_locations(
    state: &AppState,
    orders: &[OrderModel],
) -> AppResult<HashMap<Uuid, LocationModel>> {
    let ids: Vec<Uuid> = orders.iter().filter_map(|o| o.delivery_location_id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let locations = DeliveryLocations::find()
        .filter(LocCol::Id.is_in(ids))
        .all(&state.orm)
        .await?;
    Ok(locations.into_iter().map(|loc| (loc.id, loc)).collect())
}

async fn load_user_emails(
    state: &AppState,
    orders: &[OrderModel],
) -> AppResult<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = Users::find()
        .filter(UserCol::Id.is_in(ids))
        .all(&state.orm)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u.email)).collect())
}

fn delivery_info_from(location: &LocationModel) -> DeliveryInfo {
    DeliveryInfo {
        name: location.name.clone(),
        phone: location.phone.clone(),
        district: location.district.clone(),
    }
}
