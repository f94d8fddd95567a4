use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use rutero_booking::error::BookingError;
use rutero_booking::models::{Booking, BookingFilter, BookingKey, CancellationRecord};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(get_bookings))
        .route("/v1/bookings/status", post(change_status))
        .route("/v1/bookings/search", get(search_bookings))
        .route("/v1/bookings/cancelled", get(get_cancellation_records))
}

/// Caller errors surface as 400 with their message; anything else stays
/// internal.
fn reject(err: BookingError) -> AppError {
    if err.is_caller_error() {
        AppError::BadRequest(err.to_string())
    } else {
        AppError::Anyhow(err.into())
    }
}

#[derive(Debug, Deserialize)]
struct BookingKeyParams {
    id: String,
    bus_route_id: String,
}

#[derive(Debug, Deserialize, Default)]
struct BookingSearchParams {
    status: Option<String>,
    bus_id: Option<String>,
    bus_route_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CancellationParams {
    booking_id: String,
}

/// The intake endpoint answers once the payload is validated and queued;
/// the record itself is created later by the worker.
async fn create_booking(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    state.intake.accept(&body).await.map_err(reject)?;
    Ok(StatusCode::OK)
}

async fn change_status(
    State(state): State<AppState>,
    Query(params): Query<BookingKeyParams>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let key = BookingKey {
        id: params.id,
        bus_route_id: params.bus_route_id,
    };
    state.transitions.submit(&key, &body).await.map_err(reject)?;
    Ok(StatusCode::OK)
}

async fn get_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingKeyParams>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let key = BookingKey {
        id: params.id,
        bus_route_id: params.bus_route_id,
    };
    let found = state
        .bookings
        .get(&key)
        .await
        .map_err(anyhow::Error::from_boxed)?;
    Ok(Json(found.into_iter().collect()))
}

async fn search_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingSearchParams>,
) -> Result<Json<Vec<Booking>>, AppError> {
    // Blank params mean "any", same as absent ones.
    let filter = BookingFilter {
        status: params.status.filter(|v| !v.is_empty()),
        bus_id: params.bus_id.filter(|v| !v.is_empty()),
        bus_route_id: params.bus_route_id.filter(|v| !v.is_empty()),
    };
    let bookings = state
        .bookings
        .filter(&filter)
        .await
        .map_err(anyhow::Error::from_boxed)?;
    Ok(Json(bookings))
}

async fn get_cancellation_records(
    State(state): State<AppState>,
    Query(params): Query<CancellationParams>,
) -> Result<Json<Vec<CancellationRecord>>, AppError> {
    let records = state
        .cancellations
        .for_booking(&params.booking_id)
        .await
        .map_err(anyhow::Error::from_boxed)?;
    Ok(Json(records))
}
