use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use hotel_core::{NewRoom, Room, RoomUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route(
            "/api/rooms/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/api/rooms/{id}/availability", get(room_availability))
}

async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(state.hotel.rooms.list().await?))
}

async fn create_room(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewRoom>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let room = state.hotel.rooms.create(req).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn get_room(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.hotel.rooms.get(id).await?))
}

async fn update_room(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<RoomUpdate>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.hotel.rooms.update(id, req).await?))
}

async fn delete_room(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.hotel.rooms.delete(id).await?;
    Ok(Json(json!({ "message": "Room deleted successfully." })))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    room_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    available: bool,
}

async fn room_availability(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available = state
        .hotel
        .reservations
        .is_available(id, query.check_in, query.check_out, query.exclude)
        .await?;

    Ok(Json(AvailabilityResponse {
        room_id: id,
        check_in: query.check_in,
        check_out: query.check_out,
        available,
    }))
}
