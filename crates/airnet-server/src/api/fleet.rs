//! Fleet assignment and aircraft recommendation endpoints.

use airnet_core::models::normalize_code;
use airnet_core::{
    equipment_usage, ranked_routes, simulate, CandidateRoute, FleetEntry, FleetRules, FleetSpec,
    OptimalAircraftRanker, PeerClass, RankerWeights,
};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::{known_carrier, snapshot};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FleetAssignmentRequest {
    /// Carrier whose routes are scheduled when `routes` is omitted
    pub carrier: Option<String>,
    pub fleet: Vec<FleetEntry>,
    #[serde(default)]
    pub rules: FleetRules,
    /// Explicit ranked routes; overrides the carrier's historical routes
    pub routes: Option<Vec<CandidateRoute>>,
    /// Take only the top N routes by ASM from the carrier's network
    pub route_limit: Option<usize>,
}

pub async fn assign_fleet(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FleetAssignmentRequest>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let fleet = FleetSpec::build(&request.fleet, &snapshot.equipment)?;

    let (carrier, routes) = match (request.routes, request.carrier.as_deref()) {
        (Some(routes), carrier) => (carrier.and_then(normalize_code), routes),
        (None, Some(carrier)) => {
            let carrier = known_carrier(snapshot, carrier)?;
            let routes = ranked_routes(&snapshot.aggregation, &carrier, request.route_limit);
            (Some(carrier), routes)
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Provide a carrier or an explicit list of routes".to_string(),
            ))
        }
    };

    let result = simulate(&fleet, &routes, &request.rules, &snapshot.equipment)?;
    tracing::info!(
        carrier = carrier.as_deref().unwrap_or("-"),
        tails = result.summary.tail_count,
        routes = result.summary.total_flights,
        scheduled = result.summary.scheduled_flights,
        "Fleet assignment simulated"
    );

    Ok(Json(json!({
        "carrier": carrier,
        "rules": request.rules,
        "summary": result.summary,
        "assignments": result.assignments,
        "unassigned": result.unassigned,
        "tail_logs": result.tail_logs,
    })))
}

#[derive(Debug, Deserialize)]
pub struct OptimalAircraftRequest {
    pub carrier: String,
    /// Route length; computed from coordinates when omitted
    pub route_distance_miles: Option<f64>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub seat_demand: Option<u32>,
    pub top_n: Option<usize>,
    pub peer_class: Option<String>,
    pub weights: Option<RankerWeights>,
}

pub async fn optimal_aircraft(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptimalAircraftRequest>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let carrier = known_carrier(snapshot, &request.carrier)?;

    let distance = match (
        request.route_distance_miles,
        request.source.as_deref(),
        request.destination.as_deref(),
    ) {
        (Some(distance), _, _) => distance,
        (None, Some(source), Some(destination)) => snapshot
            .coords
            .distance_miles(source, destination)
            .ok_or_else(|| {
                ApiError::Unprocessable(format!(
                    "No coordinates for {source} or {destination}; pass route_distance_miles"
                ))
            })?,
        _ => {
            return Err(ApiError::BadRequest(
                "Provide route_distance_miles or both source and destination".to_string(),
            ))
        }
    };

    let mut ranker = OptimalAircraftRanker::new(&snapshot.equipment)
        .with_weights(request.weights.unwrap_or_default());
    if let Some(raw) = request.peer_class.as_deref() {
        let peer = PeerClass::parse(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Unknown peer class '{raw}'; expected legacy, low_cost, ultra_low_cost or regional"
            ))
        })?;
        ranker = ranker.with_peer_class(peer);
    }

    let usage = equipment_usage(&snapshot.aggregation, &carrier);
    let report = ranker.rank(&usage, distance, request.seat_demand, request.top_n.unwrap_or(3))?;
    Ok(Json(json!({
        "carrier": carrier,
        "report": report,
    })))
}
