use regional_marketplace_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use uuid::Uuid;

struct SeedUser<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    role: &'a str,
    city: &'a str,
    region: &'a str,
}

struct SeedProduct<'a> {
    name: &'a str,
    description: &'a str,
    category: &'a str,
    price: Decimal,
    unit: &'a str,
    stock: i32,
    min_order: i32,
    max_order: Option<i32>,
    organic: bool,
    tags: &'a [&'a str],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    let producer_id = ensure_user(
        &pool,
        SeedUser {
            username: "fatima_argan",
            email: "fatima@example.com",
            password: "producer123",
            first_name: "Fatima",
            last_name: "Ait Ali",
            role: "producer",
            city: "Agadir",
            region: "Souss-Massa",
        },
    )
    .await?;
    let consumer_id = ensure_user(
        &pool,
        SeedUser {
            username: "youssef",
            email: "youssef@example.com",
            password: "consumer123",
            first_name: "Youssef",
            last_name: "Benali",
            role: "consumer",
            city: "Casablanca",
            region: "Casablanca-Settat",
        },
    )
    .await?;
    let admin_id = ensure_user(
        &pool,
        SeedUser {
            username: "admin",
            email: "admin@example.com",
            password: "admin12345",
            first_name: "Platform",
            last_name: "Admin",
            role: "admin",
            city: "Rabat",
            region: "Rabat-Sale-Kenitra",
        },
    )
    .await?;

    seed_products(&pool, producer_id).await?;

    println!(
        "Seed completed. Producer ID: {producer_id}, Consumer ID: {consumer_id}, Admin ID: {admin_id}"
    );
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, user: SeedUser<'_>) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(user.password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, first_name, last_name, role, city, region)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.username)
    .bind(user.email)
    .bind(password_hash)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.role)
    .bind(user.city)
    .bind(user.region)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {} (role={})", user.email, user.role);
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, producer_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE producer_id = $1")
        .bind(producer_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Products already seeded, skipping");
        return Ok(());
    }

    let products = [
        SeedProduct {
            name: "Argan Oil",
            description: "Cold-pressed culinary argan oil from a women's cooperative.",
            category: "Oils",
            price: Decimal::new(18000, 2),
            unit: "liter",
            stock: 40,
            min_order: 1,
            max_order: Some(10),
            organic: true,
            tags: &["argan", "cooperative", "souss"],
        },
        SeedProduct {
            name: "Berber Carpet",
            description: "Hand-woven wool carpet with traditional Amazigh patterns.",
            category: "Crafts",
            price: Decimal::new(250000, 2),
            unit: "piece",
            stock: 3,
            min_order: 1,
            max_order: Some(1),
            organic: false,
            tags: &["handmade", "wool"],
        },
        SeedProduct {
            name: "Taliouine Saffron",
            description: "Hand-harvested saffron threads.",
            category: "Spices",
            price: Decimal::new(4500, 2),
            unit: "gram",
            stock: 500,
            min_order: 5,
            max_order: None,
            organic: true,
            tags: &["saffron", "spice"],
        },
        SeedProduct {
            name: "Medjool Dates",
            description: "Large soft dates from the Draa valley.",
            category: "Fruits",
            price: Decimal::new(9000, 2),
            unit: "kg",
            stock: 120,
            min_order: 2,
            max_order: Some(50),
            organic: false,
            tags: &["dates", "draa"],
        },
        SeedProduct {
            name: "Clay Tagine Pot",
            description: "Glazed cooking tagine from Safi.",
            category: "Crafts",
            price: Decimal::new(15000, 2),
            unit: "piece",
            stock: 25,
            min_order: 1,
            max_order: None,
            organic: false,
            tags: &["pottery", "safi"],
        },
    ];

    for product in products {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, producer_id, name, description, category, price, unit,
                stock_quantity, min_order_quantity, max_order_quantity, is_organic, tags
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(producer_id)
        .bind(product.name)
        .bind(product.description)
        .bind(product.category)
        .bind(product.price)
        .bind(product.unit)
        .bind(product.stock)
        .bind(product.min_order)
        .bind(product.max_order)
        .bind(product.organic)
        .bind(serde_json::json!(product.tags))
        .execute(pool)
        .await?;
        println!("Seeded product {}", product.name);
    }

    Ok(())
}
