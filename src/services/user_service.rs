use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::users::{AdminUserRow, UserDetail, UserOrderRow},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::OrderStatus,
    state::AppState,
};

/// Admin user listing with order counts and lifetime spend. Served as a bare
/// array; this endpoint predates the paginated envelope.
pub async fn list_users(state: &AppState, user: &AuthUser) -> AppResult<Vec<AdminUserRow>> {
    ensure_admin(user)?;

    let users = Users::find()
        .order_by_desc(crate::entity::users::Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let counted: Vec<String> = OrderStatus::COUNTED
        .iter()
        .map(|s| s.as_str().to_string())
        .collect();
    let aggregates: Vec<(Uuid, i64, i64)> = sqlx::query_as(
        r#"
        SELECT user_id,
               COUNT(*) AS order_count,
               COALESCE(SUM(total_amount) FILTER (WHERE status = ANY($1)), 0)::bigint AS total_spent
        FROM orders
        GROUP BY user_id
        "#,
    )
    .bind(&counted)
    .fetch_all(&state.pool)
    .await?;

    let by_user: HashMap<Uuid, (i64, i64)> = aggregates
        .into_iter()
        .map(|(user_id, count, spent)| (user_id, (count, spent)))
        .collect();

    Ok(users
        .into_iter()
        .map(|u| {
            let (order_count, total_spent) = by_user.get(&u.id).copied().unwrap_or((0, 0));
            AdminUserRow {
                id: u.id,
                email: u.email,
                created_at: u.created_at.with_timezone(&Utc),
                order_count,
                total_spent,
            }
        })
        .collect())
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<UserDetail> {
    ensure_admin(user)?;

    let record = Users::find_by_id(id).one(&state.orm).await?;
    let record = match record {
        Some(u) => u,
        None => {
            return Err(AppError::NotFound(format!("User with ID {id} not found.")));
        }
    };

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(record.id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|o| UserOrderRow {
            id: o.id,
            status: o.status,
            total_amount: o.total_amount,
            created_at: o.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(UserDetail {
        id: record.id,
        email: record.email,
        created_at: record.created_at.with_timezone(&Utc),
        orders,
    })
}
