use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{AdjustStockRequest, CreateProductRequest, StockLevel, UpdateProductRequest},
    entity::{
        categories::{Column as CatCol, Entity as Categories, Model as CategoryModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_images::{
            ActiveModel as ImageActive, Column as ImgCol, Entity as ProductImages,
            Model as ImageModel,
        },
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult, FieldErrors},
    middleware::auth::{AuthUser, ensure_admin},
    models::{CategoryRef, Product, ProductImage},
    response::Paginated,
    routes::params::{ProductListQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Hard cap on images per product, matching the upload endpoint's limit.
pub const MAX_IMAGES_PER_PRODUCT: usize = 5;

pub async fn list_products(
    state: &AppState,
    query: ProductListQuery,
) -> AppResult<Paginated<Product>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::Id);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::Id => Column::Id,
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Stock => Column::Stock,
        ProductSortBy::CreatedAt => Column::CreatedAt,
    };

    let finder = sort_order.apply(Products::find().filter(condition), sort_col);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = assemble_products(state, models).await?;
    Ok(Paginated::new(items, page, limit, total))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<Product> {
    let model = Products::find_by_id(id).one(&state.orm).await?;
    let model = match model {
        Some(p) => p,
        None => {
            return Err(AppError::NotFound(format!(
                "Product with ID {id} not found."
            )));
        }
    };
    let mut items = assemble_products(state, vec![model]).await?;
    // assemble_products preserves input order and length
    items
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("product assembly dropped a row")))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    validate_product_fields(
        Some(&name),
        Some(payload.price),
        payload.stock,
        payload.cost_price,
        payload.image_urls.as_deref(),
    )?;

    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())),
        price: Set(payload.price),
        cost_price: Set(payload.cost_price),
        stock: Set(payload.stock.unwrap_or(0)),
        category_id: Set(payload.category_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    if let Some(urls) = payload.image_urls {
        replace_images(&txn, product.id, &urls).await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    get_product(state, product.id).await
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<Product> {
    ensure_admin(user)?;
    if payload.is_empty() {
        return Err(AppError::BadRequest("No fields provided for update".into()));
    }

    validate_product_fields(
        payload.name.as_deref().map(str::trim),
        payload.price,
        payload.stock,
        payload.cost_price.flatten(),
        payload.image_urls.as_deref(),
    )?;

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => {
            return Err(AppError::NotFound(format!(
                "Product with ID {id} not found."
            )));
        }
    };

    if let Some(Some(category_id)) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    let txn = state.orm.begin().await?;
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(description) = payload.description {
        let description = description.trim().to_string();
        active.description = Set(if description.is_empty() {
            None
        } else {
            Some(description)
        });
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(cost_price) = payload.cost_price {
        active.cost_price = Set(cost_price);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&txn).await?;

    if let Some(urls) = payload.image_urls {
        replace_images(&txn, product.id, &urls).await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    get_product(state, product.id).await
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    let exists = Products::find_by_id(id).one(&state.orm).await?.is_some();
    if !exists {
        return Err(AppError::NotFound(format!(
            "Product with ID {id} not found."
        )));
    }

    let referenced = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if referenced > 0 {
        return Err(AppError::Conflict(format!(
            "Cannot delete product {id}. It is associated with existing orders."
        )));
    }

    let txn = state.orm.begin().await?;
    ProductImages::delete_many()
        .filter(ImgCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

pub async fn adjust_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AdjustStockRequest,
) -> AppResult<StockLevel> {
    ensure_admin(user)?;

    if payload.adjustment == 0 {
        let product = Products::find_by_id(id).one(&state.orm).await?;
        return match product {
            Some(p) => Ok(StockLevel {
                id: p.id,
                name: p.name,
                stock: p.stock,
            }),
            None => Err(AppError::NotFound(format!(
                "Product with ID {id} not found."
            ))),
        };
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => {
            return Err(AppError::NotFound(format!(
                "Product with ID {id} not found."
            )));
        }
    };

    let new_stock = product.stock + payload.adjustment;
    if new_stock < 0 {
        return Err(AppError::BadRequest(format!(
            "Stock cannot be negative. Current stock for '{}': {}, Adjustment: {}",
            product.name, product.stock, payload.adjustment
        )));
    }

    let name = product.name.clone();
    let mut active: ActiveModel = product.into();
    active.stock = Set(new_stock);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "stock_adjust",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id, "adjustment": payload.adjustment })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(StockLevel {
        id: updated.id,
        name,
        stock: updated.stock,
    })
}

/// Attach images and category refs to a page of product rows, preserving the
/// input order.
async fn assemble_products(
    state: &AppState,
    models: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let category_ids: Vec<Uuid> = models.iter().filter_map(|m| m.category_id).collect();

    let mut images_by_product: HashMap<Uuid, Vec<ImageModel>> = HashMap::new();
    if !ids.is_empty() {
        let images = ProductImages::find()
            .filter(ImgCol::ProductId.is_in(ids))
            .order_by_asc(ImgCol::Position)
            .all(&state.orm)
            .await?;
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image);
        }
    }

    let mut categories_by_id: HashMap<Uuid, CategoryModel> = HashMap::new();
    if !category_ids.is_empty() {
        let categories = Categories::find()
            .filter(CatCol::Id.is_in(category_ids))
            .all(&state.orm)
            .await?;
        for category in categories {
            categories_by_id.insert(category.id, category);
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let images = images_by_product
                .remove(&model.id)
                .unwrap_or_default()
                .into_iter()
                .map(|img| ProductImage {
                    id: img.id,
                    url: img.url,
                })
                .collect();
            let category = model
                .category_id
                .and_then(|id| categories_by_id.get(&id))
                .map(|c| CategoryRef {
                    id: c.id,
                    name: c.name.clone(),
                });
            Product {
                id: model.id,
                name: model.name,
                description: model.description,
                price: model.price,
                cost_price: model.cost_price,
                stock: model.stock,
                category,
                images,
                created_at: model.created_at.with_timezone(&Utc),
                updated_at: model.updated_at.with_timezone(&Utc),
            }
        })
        .collect())
}

async fn replace_images<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    urls: &[String],
) -> AppResult<()> {
    ProductImages::delete_many()
        .filter(ImgCol::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    for (position, url) in urls.iter().enumerate() {
        ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            url: Set(url.clone()),
            position: Set(position as i32),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> AppResult<()> {
    let exists = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_some();
    if !exists {
        return Err(AppError::BadRequest("Invalid Category ID provided.".into()));
    }
    Ok(())
}

fn validate_product_fields(
    name: Option<&str>,
    price: Option<i64>,
    stock: Option<i32>,
    cost_price: Option<i64>,
    image_urls: Option<&[String]>,
) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(name) = name {
        if name.is_empty() {
            errors
                .entry("name".into())
                .or_default()
                .push("Name is required".into());
        }
    }
    if let Some(price) = price {
        if price <= 0 {
            errors
                .entry("price".into())
                .or_default()
                .push("Price must be a positive number".into());
        }
    }
    if let Some(stock) = stock {
        if stock < 0 {
            errors
                .entry("stock".into())
                .or_default()
                .push("Stock cannot be negative".into());
        }
    }
    if let Some(cost_price) = cost_price {
        if cost_price <= 0 {
            errors
                .entry("costPrice".into())
                .or_default()
                .push("Cost Price must be a positive number".into());
        }
    }
    if let Some(urls) = image_urls {
        if urls.len() > MAX_IMAGES_PER_PRODUCT {
            errors.entry("imageUrls".into()).or_default().push(format!(
                "A product can have at most {MAX_IMAGES_PER_PRODUCT} images"
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
