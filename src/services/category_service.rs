use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::categories::{CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult, FieldErrors},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::Paginated,
    routes::params::{CategoryListQuery, CategorySortBy, SortOrder},
    state::AppState,
};

/// Name reserved for the synthetic "everything" category.
const SYSTEM_CATEGORY_NAME: &str = "All";

pub async fn list_categories(
    state: &AppState,
    query: CategoryListQuery,
) -> AppResult<Paginated<Category>> {
    let (page, limit, offset) = query.pagination.normalize_with(15);

    let mut condition = Condition::all();
    if let Some(search) = query.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }

    let sort_by = query.sort_by.unwrap_or(CategorySortBy::Name);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    let sort_col = match sort_by {
        CategorySortBy::Id => Column::Id,
        CategorySortBy::Name => Column::Name,
    };

    let finder = sort_order.apply(Categories::find().filter(condition), sort_col);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(Paginated::new(items, page, limit, total))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<Category> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    validate_fields(&name, payload.image_url.as_deref())?;

    if name == SYSTEM_CATEGORY_NAME {
        return Err(AppError::BadRequest(
            "Cannot manually create the 'All' system category.".into(),
        ));
    }

    ensure_name_free(state, &name, None).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(non_empty(payload.description)),
        image_url: Set(non_empty(payload.image_url)),
        is_system: Set(false),
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(category_from_entity(category))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<Category> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => {
            return Err(AppError::NotFound(format!(
                "Category with ID {id} not found."
            )));
        }
    };

    if let Some(name) = payload.name.as_ref().map(|n| n.trim()) {
        validate_fields(name, payload.image_url.as_deref())?;
        if existing.is_system && name != existing.name {
            return Err(AppError::BadRequest(
                "Cannot change the name of a system category.".into(),
            ));
        }
        if name != existing.name {
            ensure_name_free(state, name, Some(id)).await?;
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(non_empty(Some(description)));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(non_empty(Some(image_url)));
    }
    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(category_from_entity(category))
}

pub async fn delete_category(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => {
            return Err(AppError::NotFound(format!(
                "Category with ID {id} not found."
            )));
        }
    };

    if existing.is_system {
        return Err(AppError::BadRequest(
            "Cannot delete a system category.".into(),
        ));
    }

    let product_count = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if product_count > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete category \"{}\" as it has {} associated products.",
            existing.name, product_count
        )));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut condition = Condition::all().add(Column::Name.eq(name));
    if let Some(id) = except {
        condition = condition.add(Column::Id.ne(id));
    }
    let taken = Categories::find()
        .filter(condition)
        .one(&state.orm)
        .await?
        .is_some();
    if taken {
        return Err(AppError::Conflict(
            "A category with this name already exists.".into(),
        ));
    }
    Ok(())
}

fn validate_fields(name: &str, image_url: Option<&str>) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if name.is_empty() {
        errors
            .entry("name".into())
            .or_default()
            .push("Category name is required".into());
    }
    if name.len() > 100 {
        errors
            .entry("name".into())
            .or_default()
            .push("Category name must be at most 100 characters".into());
    }
    if let Some(url) = image_url.map(str::trim).filter(|u| !u.is_empty()) {
        if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with('/') {
            errors
                .entry("imageUrl".into())
                .or_default()
                .push("Invalid URL format".into());
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        image_url: model.image_url,
        is_system_category: model.is_system,
    }
}
