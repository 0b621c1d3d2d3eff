use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    dto::reports::{DashboardStats, DateRangeQuery, RecentOrder, SalesPoint, UsersPoint},
    entity::{
        delivery_locations::{Column as LocCol, Entity as DeliveryLocations},
        orders::{Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        service_areas::Entity as ServiceAreas,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::OrderStatus,
    state::AppState,
};

const RECENT_ORDERS: u64 = 5;
const DEFAULT_RANGE_DAYS: i64 = 30;

pub async fn dashboard_stats(state: &AppState, user: &AuthUser) -> AppResult<DashboardStats> {
    ensure_admin(user)?;

    let total_orders = Orders::find().count(&state.orm).await? as i64;
    let pending_orders = count_status(state, OrderStatus::PendingCall).await?;
    let verified_orders = count_status(state, OrderStatus::Verified).await?;
    let processing_orders = count_status(state, OrderStatus::Processing).await?;
    let shipped_orders = count_status(state, OrderStatus::Shipped).await?;
    let delivered_orders = count_status(state, OrderStatus::Delivered).await?;
    let cancelled_orders = count_status(state, OrderStatus::Cancelled).await?;

    let total_products = Products::find().count(&state.orm).await? as i64;
    let total_users = Users::find().count(&state.orm).await? as i64;
    let total_zones = ServiceAreas::find().count(&state.orm).await? as i64;

    // Revenue excludes cancelled orders and those never confirmed by phone.
    let (total_revenue,): (i64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)::bigint
        FROM orders
        WHERE status NOT IN ('Cancelled', 'Pending Call')
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let week_ago = Utc::now() - Duration::days(7);
    let orders_last7_days = Orders::find()
        .filter(OrderCol::CreatedAt.gte(week_ago))
        .count(&state.orm)
        .await? as i64;

    let recent = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_ORDERS)
        .all(&state.orm)
        .await?;

    let location_ids: Vec<Uuid> = recent.iter().filter_map(|o| o.delivery_location_id).collect();
    let names: HashMap<Uuid, String> = if location_ids.is_empty() {
        HashMap::new()
    } else {
        DeliveryLocations::find()
            .filter(LocCol::Id.is_in(location_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|loc| (loc.id, loc.name))
            .collect()
    };

    let recent_orders = recent
        .into_iter()
        .map(|order| RecentOrder {
            id: order.id,
            customer_name: order
                .delivery_location_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_else(|| "(N/A)".to_string()),
            status: order.status,
            total_amount: order.total_amount,
            created_at: order.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(DashboardStats {
        total_orders,
        pending_orders,
        verified_orders,
        processing_orders,
        shipped_orders,
        delivered_orders,
        cancelled_orders,
        total_products,
        total_users,
        total_zones,
        total_revenue,
        orders_last7_days,
        recent_orders,
    })
}

pub async fn sales_over_time(
    state: &AppState,
    user: &AuthUser,
    query: DateRangeQuery,
) -> AppResult<Vec<SalesPoint>> {
    ensure_admin(user)?;
    let (start, end) = resolve_range(&query)?;

    let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
        r#"
        SELECT date_trunc('day', created_at)::date AS date,
               COALESCE(SUM(total_amount), 0)::bigint AS total_sales
        FROM orders
        WHERE created_at >= $1 AND created_at <= $2 AND status <> 'Cancelled'
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(date, total_sales)| SalesPoint { date, total_sales })
        .collect())
}

pub async fn users_over_time(
    state: &AppState,
    user: &AuthUser,
    query: DateRangeQuery,
) -> AppResult<Vec<UsersPoint>> {
    ensure_admin(user)?;
    let (start, end) = resolve_range(&query)?;

    // Zero-fill days without signups so the series is contiguous.
    let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
        r#"
        WITH days AS (
            SELECT d::date AS date
            FROM generate_series($1::date, $2::date, '1 day'::interval) d
        ),
        signups AS (
            SELECT date_trunc('day', created_at)::date AS date, COUNT(*) AS n
            FROM users
            WHERE created_at >= $1 AND created_at <= $2
            GROUP BY 1
        )
        SELECT days.date, COALESCE(signups.n, 0)::bigint AS new_users
        FROM days
        LEFT JOIN signups ON days.date = signups.date
        ORDER BY days.date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(date, new_users)| UsersPoint { date, new_users })
        .collect())
}

async fn count_status(state: &AppState, status: OrderStatus) -> AppResult<i64> {
    let count = Orders::find()
        .filter(OrderCol::Status.eq(status.as_str()))
        .count(&state.orm)
        .await? as i64;
    Ok(count)
}

/// Resolve the requested date range, defaulting to the last 30 days. The end
/// bound is inclusive of the whole day.
fn resolve_range(query: &DateRangeQuery) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let end_date = match query.end_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };
    let start_date = match query.start_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_date(raw)?,
        None => end_date - Duration::days(DEFAULT_RANGE_DAYS),
    };

    if start_date > end_date {
        return Err(AppError::BadRequest(
            "startDate must not be after endDate".into(),
        ));
    }

    let start = Utc.from_utc_datetime(&start_date.and_hms_opt(0, 0, 0).unwrap_or_default());
    let end = Utc.from_utc_datetime(&end_date.and_hms_opt(23, 59, 59).unwrap_or_default());
    Ok((start, end))
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest("Invalid date format. Please use ISO date string (YYYY-MM-DD).".into())
    })
}
