use async_trait::async_trait;
use hotel_core::repository::RoomRepository;
use hotel_core::{Room, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{corrupt, store_error};

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    number: String,
    #[sqlx(rename = "type")]
    room_type: String,
    status: String,
    nightly_rate: f64,
}

impl TryFrom<RoomRow> for Room {
    type Error = hotel_core::StoreError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: row.id,
            number: row.number,
            room_type: row.room_type.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            nightly_rate: row.nightly_rate,
        })
    }
}

const SELECT_ROOM: &str = "SELECT id, number, type, status, nightly_rate FROM rooms";

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, number, type, status, nightly_rate)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(room.id)
        .bind(&room.number)
        .bind(room.room_type.as_str())
        .bind(room.status.as_str())
        .bind(room.nightly_rate)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, None))?;
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(&format!("{} WHERE id = $1", SELECT_ROOM))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        row.map(Room::try_from).transpose()
    }

    async fn find_room_by_number(&self, number: &str) -> StoreResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(&format!("{} WHERE number = $1", SELECT_ROOM))
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        row.map(Room::try_from).transpose()
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>(&format!("{} ORDER BY number", SELECT_ROOM))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        rows.into_iter().map(Room::try_from).collect()
    }

    async fn update_room(&self, room: &Room) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET number = $2, type = $3, status = $4, nightly_rate = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(room.id)
        .bind(&room.number)
        .bind(room.room_type.as_str())
        .bind(room.status.as_str())
        .bind(room.nightly_rate)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, None))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_room(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error(e, Some("Room")))?;
        Ok(result.rows_affected() > 0)
    }
}
