use async_trait::async_trait;
use hotel_core::repository::GuestRepository;
use hotel_core::{Guest, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store_error;

pub struct PgGuestRepository {
    pool: PgPool,
}

impl PgGuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by(&self, column: &str, value: &str) -> StoreResult<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!("{} WHERE {} = $1", SELECT_GUEST, column))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        Ok(row.map(Guest::from))
    }
}

#[derive(sqlx::FromRow)]
struct GuestRow {
    id: Uuid,
    name: String,
    document: String,
    phone: String,
    email: String,
}

impl From<GuestRow> for Guest {
    fn from(row: GuestRow) -> Self {
        Guest {
            id: row.id,
            name: row.name,
            document: row.document,
            phone: row.phone,
            email: row.email,
        }
    }
}

const SELECT_GUEST: &str = "SELECT id, name, document, phone, email FROM guests";

#[async_trait]
impl GuestRepository for PgGuestRepository {
    async fn insert_guest(&self, guest: &Guest) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO guests (id, name, document, phone, email)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(guest.id)
        .bind(&guest.name)
        .bind(&guest.document)
        .bind(&guest.phone)
        .bind(&guest.email)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, None))?;
        Ok(())
    }

    async fn find_guest(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!("{} WHERE id = $1", SELECT_GUEST))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        Ok(row.map(Guest::from))
    }

    async fn find_guest_by_document(&self, document: &str) -> StoreResult<Option<Guest>> {
        self.find_by("document", document).await
    }

    async fn find_guest_by_email(&self, email: &str) -> StoreResult<Option<Guest>> {
        self.find_by("email", email).await
    }

    async fn list_guests(&self) -> StoreResult<Vec<Guest>> {
        let rows = sqlx::query_as::<_, GuestRow>(&format!("{} ORDER BY name, id", SELECT_GUEST))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        Ok(rows.into_iter().map(Guest::from).collect())
    }

    async fn update_guest(&self, guest: &Guest) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE guests
            SET name = $2, document = $3, phone = $4, email = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(guest.id)
        .bind(&guest.name)
        .bind(&guest.document)
        .bind(&guest.phone)
        .bind(&guest.email)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, None))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_guest(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error(e, Some("Guest")))?;
        Ok(result.rows_affected() > 0)
    }
}
