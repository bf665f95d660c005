use std::sync::Arc;
use std::time::Duration;

use hotel_core::{Repositories, StoreError};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::app_config::DatabaseConfig;
use crate::guest_repo::PgGuestRepository;
use crate::reservation_repo::PgReservationRepository;
use crate::room_repo::PgRoomRepository;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            rooms: Arc::new(PgRoomRepository::new(self.pool.clone())),
            guests: Arc::new(PgGuestRepository::new(self.pool.clone())),
            reservations: Arc::new(PgReservationRepository::new(self.pool.clone())),
        }
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const EXCLUSION_VIOLATION: &str = "23P01";

/// Translate a driver error into the repository error vocabulary.
/// `referenced` names the entity for foreign-key violations on delete.
pub(crate) fn store_error(err: sqlx::Error, referenced: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return StoreError::Duplicate {
                    field: unique_field(db.constraint()).to_string(),
                }
            }
            Some(EXCLUSION_VIOLATION) => return StoreError::Overlap,
            Some(FOREIGN_KEY_VIOLATION) => {
                if let Some(what) = referenced {
                    return StoreError::Referenced(what.to_string());
                }
            }
            _ => {}
        }
    }
    StoreError::Backend(err.to_string())
}

fn unique_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("rooms_number_key") => "number",
        Some("guests_document_key") => "document",
        Some("guests_email_key") => "email",
        _ => "value",
    }
}

/// Column values that fail to parse back into domain enums.
pub(crate) fn corrupt(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("invalid stored value: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_field_names() {
        assert_eq!(unique_field(Some("rooms_number_key")), "number");
        assert_eq!(unique_field(Some("guests_email_key")), "email");
        assert_eq!(unique_field(Some("guests_document_key")), "document");
        assert_eq!(unique_field(None), "value");
    }

    #[test]
    fn test_non_database_errors_are_backend() {
        let err = store_error(sqlx::Error::RowNotFound, Some("Room"));
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
