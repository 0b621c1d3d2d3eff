use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use storefront_admin_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "admin").await?;
    let customer_id = ensure_user(&pool, "customer@example.com", "customer123", "customer").await?;
    seed_catalog(&pool).await?;
    seed_service_areas(&pool).await?;
    seed_orders(&pool, customer_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Beverages", Some("Hot and cold drinks")),
        ("Snacks", Some("Quick bites")),
        ("Household", None),
    ];

    for (name, description) in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    let products = vec![
        ("Roasted Coffee 500g", "Beverages", 45000_i64, Some(30000_i64), 40),
        ("Green Tea Box", "Beverages", 18000, Some(9000), 120),
        ("Sesame Crackers", "Snacks", 9000, None, 200),
        ("Dish Soap 1L", "Household", 12500, Some(7000), 80),
    ];

    for (name, category, price, cost_price, stock) in products {
        let category_id: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM categories WHERE name = $1")
                .bind(category)
                .fetch_optional(pool)
                .await?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, cost_price, stock, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price)
        .bind(cost_price)
        .bind(stock)
        .bind(category_id.map(|(id,)| id))
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}

async fn seed_service_areas(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // A rough box around the Addis Ababa city centre.
    let downtown = r#"{"type":"Polygon","coordinates":[[[38.70,8.95],[38.85,8.95],[38.85,9.10],[38.70,9.10],[38.70,8.95]]]}"#;
    let airport = r#"{"type":"Polygon","coordinates":[[[38.78,8.96],[38.82,8.96],[38.82,9.00],[38.78,9.00],[38.78,8.96]]]}"#;

    for (name, polygon) in [("Downtown", downtown), ("Airport District", airport)] {
        sqlx::query(
            r#"
            INSERT INTO service_areas (id, name, geo_json_polygon)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(polygon)
        .execute(pool)
        .await?;
    }

    println!("Seeded service areas");
    Ok(())
}

async fn seed_orders(pool: &sqlx::PgPool, customer_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Orders already seeded");
        return Ok(());
    }

    let location_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO delivery_locations (id, name, phone, district)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(location_id)
    .bind("Abebe Bikila")
    .bind("+251911000000")
    .bind("Bole")
    .execute(pool)
    .await?;

    let samples = [
        ("Delivered", 63000_i64, 12_i64, Some((9.01_f64, 38.76_f64))),
        ("Shipped", 27000, 5, Some((9.03, 38.80))),
        ("Pending Call", 9000, 1, None),
        ("Cancelled", 45000, 3, None),
    ];

    for (status, total, days_ago, coords) in samples {
        let order_id = Uuid::new_v4();
        let created_at = Utc::now() - Duration::days(days_ago);
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, status, total_amount, latitude, longitude,
                 delivery_location_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(order_id)
        .bind(customer_id)
        .bind(status)
        .bind(total)
        .bind(coords.map(|(lat, _)| lat))
        .bind(coords.map(|(_, lon)| lon))
        .bind(location_id)
        .bind(created_at)
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, product_name, quantity, price)
            SELECT $1, $2, id, name, 1, price FROM products ORDER BY name LIMIT 1
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded orders");
    Ok(())
}
