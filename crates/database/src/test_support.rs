//! Shared helpers for repository tests.

use expodesk_config::DatabaseConfig;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub(crate) async fn create_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let config = DatabaseConfig {
        url: format!("sqlite:{}", db_path.display()),
        max_connections: 1,
    };

    let pool = crate::connection::prepare_database(&config).await.unwrap();
    crate::migrations::run_migrations(&pool).await.unwrap();
    (pool, temp_dir)
}

pub(crate) async fn seed_user(pool: &SqlitePool, email: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO users (public_id, email, display_name, role, created_at, updated_at)
         VALUES (?, ?, ?, 'member', ?, ?)",
    )
    .bind(format!("test_{email}"))
    .bind(email)
    .bind("Test User")
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}

pub(crate) async fn seed_organizer(pool: &SqlitePool, user_id: i64) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO organizers (user_id, name, company, email, phone, approved, approved_at, created_at)
         VALUES (?, 'Test Organizer', 'Test Expo KK', 'organizer@example.com', '03-0000-0000', TRUE, ?, ?)",
    )
    .bind(user_id)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}

pub(crate) async fn seed_exhibitor(pool: &SqlitePool, user_id: i64, company: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO exhibitors (user_id, company, contact_name, email, phone, created_at)
         VALUES (?, ?, 'Test Contact', 'exhibitor@example.com', '06-0000-0000', ?)",
    )
    .bind(user_id)
    .bind(company)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}

pub(crate) async fn seed_event(pool: &SqlitePool, organizer_id: i64, name: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO events (organizer_id, name, description, status, created_at)
         VALUES (?, ?, 'seeded event', 'approved', ?)",
    )
    .bind(organizer_id)
    .bind(name)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}
