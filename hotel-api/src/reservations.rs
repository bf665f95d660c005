use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use hotel_core::{
    NewReservation, Reservation, ReservationDetails, ReservationFilter, ReservationStatus,
    ReservationUpdate, StayOutcome,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/api/reservations/{id}",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
        .route("/api/reservations/{id}/checkin", post(check_in))
        .route("/api/reservations/{id}/checkout", post(check_out))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub room_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
}

impl From<ListQuery> for ReservationFilter {
    fn from(query: ListQuery) -> Self {
        let mut filter = ReservationFilter {
            room_id: query.room_id,
            guest_id: query.guest_id,
            ..Default::default()
        };
        if let Some(status) = query.status {
            filter = filter.status(status);
        }
        filter
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub reservation: Reservation,
}

#[derive(Debug, Serialize)]
pub struct StayResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: StayOutcome,
}

async fn list_reservations(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<Json<Vec<ReservationDetails>>, AppError> {
    let filter = ReservationFilter::from(query);
    Ok(Json(state.hotel.reservations.list(&filter).await?))
}

async fn create_reservation(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewReservation>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = state.hotel.reservations.create(req).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_reservation(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ReservationDetails>, AppError> {
    Ok(Json(state.hotel.reservations.details(id).await?))
}

async fn update_reservation(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<ReservationUpdate>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.hotel.reservations.update(id, req).await?))
}

async fn delete_reservation(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DeletedResponse>, AppError> {
    let reservation = state.hotel.reservations.delete(id).await?;
    Ok(Json(DeletedResponse {
        message: "Reservation deleted successfully.",
        reservation,
    }))
}

async fn check_in(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<StayResponse>, AppError> {
    let outcome = state.hotel.reservations.check_in(id).await?;
    Ok(Json(StayResponse {
        message: "Check-in completed successfully.",
        outcome,
    }))
}

async fn check_out(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<StayResponse>, AppError> {
    let outcome = state.hotel.reservations.check_out(id).await?;
    Ok(Json(StayResponse {
        message: "Check-out completed successfully.",
        outcome,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_to_filter() {
        let room_id = Uuid::new_v4();
        let filter = ReservationFilter::from(ListQuery {
            room_id: Some(room_id),
            guest_id: None,
            status: Some(ReservationStatus::Active),
        });
        assert_eq!(filter.room_id, Some(room_id));
        assert_eq!(filter.statuses, vec![ReservationStatus::Active]);

        assert_eq!(
            ReservationFilter::from(ListQuery::default()),
            ReservationFilter::default()
        );
    }
}
