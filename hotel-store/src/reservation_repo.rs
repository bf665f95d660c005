use async_trait::async_trait;
use chrono::NaiveDate;
use hotel_core::repository::{ReservationFilter, ReservationRepository};
use hotel_core::{Reservation, StoreResult};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{corrupt, store_error};

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: String,
    room_id: Uuid,
    guest_id: Uuid,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = hotel_core::StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            check_in: row.check_in,
            check_out: row.check_out,
            status: row.status.parse().map_err(corrupt)?,
            room_id: row.room_id,
            guest_id: row.guest_id,
        })
    }
}

const SELECT_RESERVATION: &str =
    "SELECT id, check_in, check_out, status, room_id, guest_id FROM reservations";

/// Append a WHERE clause for `filter` to `qb`. Every value is bound, never
/// interpolated.
pub fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReservationFilter) {
    qb.push(" WHERE TRUE");

    if let Some(room_id) = filter.room_id {
        qb.push(" AND room_id = ").push_bind(room_id);
    }
    if let Some(guest_id) = filter.guest_id {
        qb.push(" AND guest_id = ").push_bind(guest_id);
    }
    if !filter.statuses.is_empty() {
        qb.push(" AND status IN (");
        let mut separated = qb.separated(", ");
        for status in &filter.statuses {
            separated.push_bind(status.as_str());
        }
        separated.push_unseparated(")");
    }
    if let Some((check_in, check_out)) = filter.overlapping {
        // Half-open intersection: existing.check_in < check_out AND existing.check_out > check_in
        qb.push(" AND check_in < ").push_bind(check_out);
        qb.push(" AND check_out > ").push_bind(check_in);
    }
    if let Some(from) = filter.check_in_from {
        qb.push(" AND check_in >= ").push_bind(from);
    }
    if let Some(exclude) = filter.exclude_id {
        qb.push(" AND id <> ").push_bind(exclude);
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, check_in, check_out, status, room_id, guest_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.check_in)
        .bind(reservation.check_out)
        .bind(reservation.status.as_str())
        .bind(reservation.room_id)
        .bind(reservation.guest_id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, None))?;
        Ok(())
    }

    async fn find_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!("{} WHERE id = $1", SELECT_RESERVATION))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        row.map(Reservation::try_from).transpose()
    }

    async fn list_reservations(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_RESERVATION);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY check_in, id");

        let rows = qb
            .build_query_as::<ReservationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn count_reservations(&self, filter: &ReservationFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reservations");
        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        Ok(count.max(0) as u64)
    }

    async fn update_reservation(&self, reservation: &Reservation) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET check_in = $2, check_out = $3, status = $4, room_id = $5, guest_id = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.check_in)
        .bind(reservation.check_out)
        .bind(reservation.status.as_str())
        .bind(reservation.room_id)
        .bind(reservation.guest_id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, None))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_reservation(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error(e, None))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_core::ReservationStatus;

    fn sql(filter: &ReservationFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_RESERVATION);
        push_filter(&mut qb, filter);
        qb.into_sql()
    }

    #[test]
    fn test_empty_filter_selects_everything() {
        assert_eq!(
            sql(&ReservationFilter::default()),
            format!("{} WHERE TRUE", SELECT_RESERVATION)
        );
    }

    #[test]
    fn test_availability_filter_sql() {
        let filter = ReservationFilter::for_room(Uuid::new_v4())
            .status(ReservationStatus::Active)
            .status(ReservationStatus::Completed)
            .overlapping(
                "2024-01-01".parse().unwrap(),
                "2024-01-05".parse().unwrap(),
            )
            .excluding(Some(Uuid::new_v4()));

        let sql = sql(&filter);
        assert!(sql.ends_with(
            " WHERE TRUE AND room_id = $1 AND status IN ($2, $3) \
             AND check_in < $4 AND check_out > $5 AND id <> $6"
        ));
    }

    #[test]
    fn test_check_in_from_and_guest() {
        let filter = ReservationFilter::default()
            .guest(Uuid::new_v4())
            .check_in_from("2024-01-10".parse().unwrap());
        assert!(sql(&filter).ends_with(" WHERE TRUE AND guest_id = $1 AND check_in >= $2"));
    }
}
