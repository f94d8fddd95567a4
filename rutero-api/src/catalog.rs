use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use rutero_catalog::{
    BusLine, BusRoute, BusUnit, CatalogError, LineChange, LineFilter, RouteChange, RouteFilter,
    RouteKey, UnitChange, UnitFilter,
};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/lines", post(create_line).get(get_line))
        .route("/v1/lines/search", get(search_lines))
        .route("/v1/lines/update", post(update_line))
        .route("/v1/units", post(create_unit).get(get_unit))
        .route("/v1/units/search", get(search_units))
        .route("/v1/units/update", post(update_unit))
        .route("/v1/routes", post(create_route).get(get_route))
        .route("/v1/routes/search", get(search_routes))
        .route("/v1/routes/update", post(update_route))
}

/// Caller errors surface as 400 with their message; anything else stays
/// internal.
fn reject(err: CatalogError) -> AppError {
    if err.is_caller_error() {
        AppError::BadRequest(err.to_string())
    } else {
        AppError::Anyhow(err.into())
    }
}

fn no_records() -> AppError {
    AppError::BadRequest("no record(s) found".to_string())
}

#[derive(Debug, Deserialize)]
struct LineKeyParams {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct LineSearchParams {
    name: Option<String>,
    company: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnitKeyParams {
    code: String,
    bus_id: String,
}

#[derive(Debug, Deserialize, Default)]
struct UnitSearchParams {
    code: Option<String>,
    bus_id: Option<String>,
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RouteKeyParams {
    id: String,
    bus_id: String,
}

#[derive(Debug, Deserialize, Default)]
struct RouteSearchParams {
    bus_id: Option<String>,
    bus_unit_id: Option<String>,
    active: Option<bool>,
    departure_time: Option<String>,
    arrival_time: Option<String>,
    from_route: Option<String>,
    to_route: Option<String>,
}

async fn create_line(
    State(state): State<AppState>,
    Json(line): Json<BusLine>,
) -> Result<Json<BusLine>, AppError> {
    let created = state.lines.create(line).await.map_err(reject)?;
    Ok(Json(created))
}

async fn get_line(
    State(state): State<AppState>,
    Query(params): Query<LineKeyParams>,
) -> Result<Json<BusLine>, AppError> {
    let line = state
        .lines
        .find(&params.id, &params.name)
        .await
        .map_err(reject)?
        .ok_or_else(no_records)?;
    Ok(Json(line))
}

async fn search_lines(
    State(state): State<AppState>,
    Query(params): Query<LineSearchParams>,
) -> Result<Json<Vec<BusLine>>, AppError> {
    let filter = LineFilter {
        name: params.name.filter(|v| !v.is_empty()),
        company: params.company.filter(|v| !v.is_empty()),
    };
    let lines = state.lines.search(&filter).await.map_err(reject)?;
    Ok(Json(lines))
}

async fn update_line(
    State(state): State<AppState>,
    Query(params): Query<LineKeyParams>,
    Json(change): Json<LineChange>,
) -> Result<Json<BusLine>, AppError> {
    let updated = state
        .lines
        .update(&params.id, &params.name, change)
        .await
        .map_err(reject)?;
    Ok(Json(updated))
}

async fn create_unit(
    State(state): State<AppState>,
    Json(unit): Json<BusUnit>,
) -> Result<Json<BusUnit>, AppError> {
    let created = state.units.create(unit).await.map_err(reject)?;
    Ok(Json(created))
}

async fn get_unit(
    State(state): State<AppState>,
    Query(params): Query<UnitKeyParams>,
) -> Result<Json<BusUnit>, AppError> {
    let unit = state
        .units
        .find(&params.code, &params.bus_id)
        .await
        .map_err(reject)?
        .ok_or_else(no_records)?;
    Ok(Json(unit))
}

async fn search_units(
    State(state): State<AppState>,
    Query(params): Query<UnitSearchParams>,
) -> Result<Json<Vec<BusUnit>>, AppError> {
    let filter = UnitFilter {
        code: params.code.filter(|v| !v.is_empty()),
        bus_id: params.bus_id.filter(|v| !v.is_empty()),
        active: params.active,
    };
    let units = state.units.search(&filter).await.map_err(reject)?;
    Ok(Json(units))
}

async fn update_unit(
    State(state): State<AppState>,
    Query(params): Query<UnitKeyParams>,
    Json(change): Json<UnitChange>,
) -> Result<Json<BusUnit>, AppError> {
    let updated = state
        .units
        .update(&params.code, &params.bus_id, change)
        .await
        .map_err(reject)?;
    Ok(Json(updated))
}

async fn create_route(
    State(state): State<AppState>,
    Json(route): Json<BusRoute>,
) -> Result<Json<BusRoute>, AppError> {
    let created = state.routes.create(route).await.map_err(reject)?;
    Ok(Json(created))
}

async fn get_route(
    State(state): State<AppState>,
    Query(params): Query<RouteKeyParams>,
) -> Result<Json<BusRoute>, AppError> {
    let key = RouteKey {
        id: params.id,
        bus_id: params.bus_id,
    };
    let route = state
        .routes
        .find(&key)
        .await
        .map_err(reject)?
        .ok_or_else(no_records)?;
    Ok(Json(route))
}

async fn search_routes(
    State(state): State<AppState>,
    Query(params): Query<RouteSearchParams>,
) -> Result<Json<Vec<BusRoute>>, AppError> {
    let filter = RouteFilter {
        bus_id: params.bus_id.filter(|v| !v.is_empty()),
        bus_unit_id: params.bus_unit_id.filter(|v| !v.is_empty()),
        active: params.active,
        departure_time: params.departure_time.filter(|v| !v.is_empty()),
        arrival_time: params.arrival_time.filter(|v| !v.is_empty()),
        from_route: params.from_route.filter(|v| !v.is_empty()),
        to_route: params.to_route.filter(|v| !v.is_empty()),
    };
    let routes = state.routes.search(&filter).await.map_err(reject)?;
    Ok(Json(routes))
}

async fn update_route(
    State(state): State<AppState>,
    Query(params): Query<RouteKeyParams>,
    Json(change): Json<RouteChange>,
) -> Result<Json<BusRoute>, AppError> {
    let key = RouteKey {
        id: params.id,
        bus_id: params.bus_id,
    };
    let updated = state.routes.update(&key, change).await.map_err(reject)?;
    Ok(Json(updated))
}
