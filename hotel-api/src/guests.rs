use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use hotel_core::{Guest, GuestUpdate, NewGuest};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/guests", get(list_guests).post(create_guest))
        .route(
            "/api/guests/{id}",
            get(get_guest).put(update_guest).delete(delete_guest),
        )
}

async fn list_guests(State(state): State<AppState>) -> Result<Json<Vec<Guest>>, AppError> {
    Ok(Json(state.hotel.guests.list().await?))
}

async fn create_guest(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewGuest>,
) -> Result<(StatusCode, Json<Guest>), AppError> {
    let guest = state.hotel.guests.create(req).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

async fn get_guest(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Guest>, AppError> {
    Ok(Json(state.hotel.guests.get(id).await?))
}

async fn update_guest(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<GuestUpdate>,
) -> Result<Json<Guest>, AppError> {
    Ok(Json(state.hotel.guests.update(id, req).await?))
}

async fn delete_guest(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.hotel.guests.delete(id).await?;
    Ok(Json(json!({ "message": "Guest deleted successfully." })))
}
