//! Wire representations.
//!
//! Handlers translate between these and the domain types; nothing in the
//! core serializes itself directly.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::admin::MutationError;
use crate::domain::{Itinerary, Line, Segment, Station};
use crate::planner::SearchError;

#[derive(Debug, Serialize)]
pub struct StationDto {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
}

impl From<&Station> for StationDto {
    fn from(s: &Station) -> Self {
        Self {
            id: s.id.0,
            name: s.name.clone(),
            longitude: s.longitude,
            latitude: s.latitude,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineDto {
    pub id: u32,
    pub name: String,
    pub direction: String,
    pub first_departure: String,
    pub last_departure: String,
    pub headway_mins: u32,
    pub stations: Vec<u32>,
}

impl From<&Line> for LineDto {
    fn from(l: &Line) -> Self {
        Self {
            id: l.id.0,
            name: l.name.clone(),
            direction: l.direction.clone(),
            first_departure: l.first_departure.format("%H:%M").to_string(),
            last_departure: l.last_departure.format("%H:%M").to_string(),
            headway_mins: l.headway_mins,
            stations: l.stops.iter().map(|s| s.0).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SegmentDto {
    pub line: u32,
    pub line_name: String,
    pub from: u32,
    pub to: u32,
    pub stations: Vec<u32>,
    pub stops: usize,
}

impl From<&Segment> for SegmentDto {
    fn from(seg: &Segment) -> Self {
        Self {
            line: seg.line.0,
            line_name: seg.line_name.clone(),
            from: seg.from.0,
            to: seg.to.0,
            stations: seg.stations.iter().map(|s| s.0).collect(),
            stops: seg.stops,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItineraryDto {
    pub transfers: usize,
    pub total_stops: usize,
    pub segments: Vec<SegmentDto>,
}

impl From<&Itinerary> for ItineraryDto {
    fn from(it: &Itinerary) -> Self {
        Self {
            transfers: it.transfers(),
            total_stops: it.total_stops(),
            segments: it.segments().iter().map(SegmentDto::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub from: String,
    pub to: String,
    pub max_transfers: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StationQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStationRequest {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub id: u32,
    pub name: String,
    pub direction: String,
    /// "HH:MM" or "HH:MM:SS".
    pub first_departure: String,
    pub last_departure: String,
    pub headway_mins: u32,
    pub stations: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStationRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    pub name: String,
    pub direction: String,
    pub first_departure: String,
    pub last_departure: String,
    pub headway_mins: u32,
    pub stations: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AttachStationRequest {
    pub station: String,
    pub sequence_no: u32,
}

/// Outcome of an admin operation. Always delivered with HTTP 200; the
/// `success` flag carries the verdict.
#[derive(Debug, Serialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
}

impl MutationOutcome {
    pub fn from_result(result: Result<String, MutationError>) -> Self {
        match result {
            Ok(message) => Self {
                success: true,
                message,
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
            },
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Error for query endpoints, rendered as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Parse a departure time, accepting both with and without seconds.
pub fn parse_departure(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}
