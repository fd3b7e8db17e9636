//! HTTP surface.
//!
//! Query endpoints return domain data or a JSON error with a matching
//! status code. Admin endpoints always answer 200 with a
//! [`MutationOutcome`], so callers distinguish "the request was handled"
//! from "the mutation was accepted" by the `success` flag.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::info;

use crate::admin::{Admin, LineSpec, LineUpdate};
use crate::domain::StationId;
use crate::planner::Planner;

use super::dto::{
    AddLineRequest, AddStationRequest, AppError, AttachStationRequest, ItineraryDto, LineDto,
    MutationOutcome, RouteQuery, StationDto, StationQuery, UpdateLineRequest,
    UpdateStationRequest, parse_departure,
};
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/:station/lines", get(lines_for_station))
        .route("/api/lines", get(list_lines))
        .route("/api/lines/:line/stations", get(stations_for_line))
        .route("/api/routes", get(find_routes))
        .route("/api/admin/stations", post(add_station))
        .route(
            "/api/admin/stations/:station",
            delete(delete_station).put(update_station),
        )
        .route("/api/admin/lines", post(add_line))
        .route("/api/admin/lines/:line", delete(delete_line).put(update_line))
        .route("/api/admin/lines/:line/stations", post(attach_station))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// List stations, filtered by `q` when present. A numeric `q` is an id
/// lookup first, falling back to name matching.
async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> Json<Vec<StationDto>> {
    let net = state.network.read().await;
    let stations = net
        .search_stations(&query.q)
        .into_iter()
        .map(StationDto::from)
        .collect();
    Json(stations)
}

async fn list_lines(State(state): State<AppState>) -> Json<Vec<LineDto>> {
    let net = state.network.read().await;
    Json(net.lines().map(LineDto::from).collect())
}

async fn lines_for_station(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Result<Json<Vec<LineDto>>, AppError> {
    let net = state.network.read().await;
    let id = net
        .resolve_station(&station)
        .ok_or_else(|| AppError::NotFound(format!("station \"{}\" not found", station.trim())))?;
    let lines = net
        .lines_for(id)
        .into_iter()
        .filter_map(|lid| net.line(lid))
        .map(LineDto::from)
        .collect();
    Ok(Json(lines))
}

async fn stations_for_line(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    let net = state.network.read().await;
    let id = net
        .resolve_line(&line)
        .ok_or_else(|| AppError::NotFound(format!("line \"{}\" not found", line.trim())))?;
    // resolve_line only returns ids present in the index.
    let stops = net.line(id).map(|l| l.stops.clone()).unwrap_or_default();
    let stations = stops
        .into_iter()
        .filter_map(|sid| net.station(sid))
        .map(StationDto::from)
        .collect();
    Ok(Json(stations))
}

async fn find_routes(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Vec<ItineraryDto>>, AppError> {
    let net = state.network.read().await;
    let max_transfers = query
        .max_transfers
        .unwrap_or(state.config.default_max_transfers);
    let routes = Planner::new(&net, &state.config).find_routes(&query.from, &query.to, max_transfers)?;
    info!(
        from = query.from,
        to = query.to,
        max_transfers,
        results = routes.len(),
        "route query"
    );
    Ok(Json(routes.iter().map(ItineraryDto::from).collect()))
}

async fn add_station(
    State(state): State<AppState>,
    Json(req): Json<AddStationRequest>,
) -> Json<MutationOutcome> {
    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    Json(MutationOutcome::from_result(admin.add_station(
        &mut net,
        req.id,
        &req.name,
    )))
}

async fn update_station(
    State(state): State<AppState>,
    Path(station): Path<String>,
    Json(req): Json<UpdateStationRequest>,
) -> Json<MutationOutcome> {
    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    Json(MutationOutcome::from_result(admin.update_station(
        &mut net,
        &station,
        &req.name,
    )))
}

async fn delete_station(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Json<MutationOutcome> {
    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    Json(MutationOutcome::from_result(
        admin.delete_station(&mut net, &station),
    ))
}

async fn add_line(
    State(state): State<AppState>,
    Json(req): Json<AddLineRequest>,
) -> Json<MutationOutcome> {
    let Some(first_departure) = parse_departure(&req.first_departure) else {
        return Json(MutationOutcome::failure(format!(
            "invalid first_departure \"{}\"",
            req.first_departure
        )));
    };
    let Some(last_departure) = parse_departure(&req.last_departure) else {
        return Json(MutationOutcome::failure(format!(
            "invalid last_departure \"{}\"",
            req.last_departure
        )));
    };

    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    let spec = LineSpec {
        id: req.id,
        name: req.name,
        direction: req.direction,
        first_departure,
        last_departure,
        headway_mins: req.headway_mins,
        stations: req.stations.into_iter().map(StationId).collect(),
    };
    Json(MutationOutcome::from_result(admin.add_line(&mut net, spec)))
}

async fn update_line(
    State(state): State<AppState>,
    Path(line): Path<String>,
    Json(req): Json<UpdateLineRequest>,
) -> Json<MutationOutcome> {
    let Some(first_departure) = parse_departure(&req.first_departure) else {
        return Json(MutationOutcome::failure(format!(
            "invalid first_departure \"{}\"",
            req.first_departure
        )));
    };
    let Some(last_departure) = parse_departure(&req.last_departure) else {
        return Json(MutationOutcome::failure(format!(
            "invalid last_departure \"{}\"",
            req.last_departure
        )));
    };

    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    let update = LineUpdate {
        name: req.name,
        direction: req.direction,
        first_departure,
        last_departure,
        headway_mins: req.headway_mins,
        stations: req.stations.into_iter().map(StationId).collect(),
    };
    Json(MutationOutcome::from_result(
        admin.update_line(&mut net, &line, update),
    ))
}

async fn delete_line(
    State(state): State<AppState>,
    Path(line): Path<String>,
) -> Json<MutationOutcome> {
    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    Json(MutationOutcome::from_result(
        admin.delete_line(&mut net, &line),
    ))
}

async fn attach_station(
    State(state): State<AppState>,
    Path(line): Path<String>,
    Json(req): Json<AttachStationRequest>,
) -> Json<MutationOutcome> {
    let mut net = state.network.write().await;
    let admin = Admin::new(state.store.as_ref());
    Json(MutationOutcome::from_result(admin.add_station_to_line(
        &mut net,
        &line,
        &req.station,
        req.sequence_no,
    )))
}
