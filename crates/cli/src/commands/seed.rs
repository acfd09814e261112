//! Reference data seeding commands.
//!
//! # Usage
//!
//! ```bash
//! sidra-cli seed regions
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the
//!   storefront database (`DATABASE_URL` is used as a fallback)

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// UAE emirates with delivery fees in AED (code, English, Arabic, fee).
const REGIONS: &[(&str, &str, &str, u32)] = &[
    ("AUH", "Abu Dhabi", "أبوظبي", 25),
    ("DXB", "Dubai", "دبي", 15),
    ("SHJ", "Sharjah", "الشارقة", 15),
    ("AJM", "Ajman", "عجمان", 20),
    ("UAQ", "Umm Al Quwain", "أم القيوين", 25),
    ("RAK", "Ras Al Khaimah", "رأس الخيمة", 30),
    ("FUJ", "Fujairah", "الفجيرة", 30),
];

/// Seed (or refresh) the delivery regions table.
///
/// Upserts every emirate, so re-running after a fee change is safe.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or a query fails.
pub async fn regions() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Seeding {} delivery regions...", REGIONS.len());
    for (code, name_en, name_ar, fee) in REGIONS {
        sqlx::query(
            r"
            INSERT INTO storefront.regions (code, name_en, name_ar, delivery_fee)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE
            SET name_en = EXCLUDED.name_en,
                name_ar = EXCLUDED.name_ar,
                delivery_fee = EXCLUDED.delivery_fee
            ",
        )
        .bind(code)
        .bind(name_en)
        .bind(name_ar)
        .bind(Decimal::from(*fee))
        .execute(&pool)
        .await?;

        tracing::info!("  {code}: {name_en} / {name_ar} (AED {fee})");
    }

    tracing::info!("Region seeding complete!");
    Ok(())
}
