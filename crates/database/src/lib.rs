//! Expodesk Database Crate
//!
//! This crate provides database functionality for the Expodesk application,
//! including connection management, migrations, and repository implementations
//! for the portal entities (organizers, events, exhibitors, applications, and
//! notifications).

use expodesk_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{
    ApplicationRepository, EventRepository, ExhibitorRepository, NotificationRepository,
    OrganizerRepository,
};

// Re-export entities
pub use entities::{
    application::{Application, ApplicationStatus, ApplicationWithEvent, ApplicationWithExhibitor},
    event::{CreateEventRequest, Event, EventStatus},
    exhibitor::{CreateExhibitorRequest, DocumentKind, Exhibitor},
    notification::{CreateNotificationRequest, Notification, UserType},
    organizer::{CreateOrganizerRequest, Organizer},
};

// Re-export types
pub use types::{errors::DatabaseError, DatabaseResult};

/// Re-export commonly used types for convenience
pub use sqlx::Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}
