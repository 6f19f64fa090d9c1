//! services/api/src/bin/seed.rs
//!
//! Seeds the bootstrap admin account and the department catalog. Safe to run
//! repeatedly: rows that already exist are skipped, not rewritten.
//!
//! The admin credentials come from `ADMIN_NAME` / `ADMIN_EMAIL` /
//! `ADMIN_PASSWORD`, with development defaults when unset.

use api_lib::{adapters::PgStore, credentials, error::ApiError};
use registrar_core::domain::{NewUser, Role};
use registrar_core::ports::{PortError, RecordStore};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEPARTMENTS: &[(&str, &str)] = &[
    ("CSE", "Computer Science and Engineering"),
    ("ECE", "Electronics and Communication Engineering"),
    ("EEE", "Electrical and Electronics Engineering"),
    ("MECH", "Mechanical Engineering"),
    ("CIVIL", "Civil Engineering"),
    ("IT", "Information Technology"),
    ("CHEM", "Chemical Engineering"),
];

async fn seed_admin(store: &PgStore) -> Result<(), ApiError> {
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string());
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@gmail.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    match store.get_user_by_email(&email).await {
        Ok(_) => {
            info!(%email, "Admin already exists, skipping");
            return Ok(());
        }
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let password_hash = credentials::hash_password(&password)
        .map_err(|e| ApiError::Internal(format!("could not hash the admin password: {e}")))?;
    store
        .create_user(NewUser {
            name,
            email: email.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    info!(%email, "Admin created successfully");
    Ok(())
}

async fn seed_departments(store: &PgStore) -> Result<(), ApiError> {
    let existing: Vec<String> = store
        .list_departments()
        .await?
        .into_iter()
        .map(|d| d.dept_code)
        .collect();

    for &(code, name) in DEPARTMENTS {
        if existing.iter().any(|c| c.as_str() == code) {
            info!(dept_code = code, "Department already exists, skipping");
            continue;
        }
        store.create_department(code, name).await?;
        info!(dept_code = code, dept_name = name, "Created department");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| ApiError::Internal("DATABASE_URL is required".to_string()))?;
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    let store = PgStore::new(db_pool);
    store.run_migrations().await?;

    seed_admin(&store).await?;
    seed_departments(&store).await?;

    info!("Seeding complete");
    Ok(())
}
