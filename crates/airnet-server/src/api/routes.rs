//! REST API routes.

use airnet_core::models::normalize_code;
use airnet_core::{
    carrier_directory, network_summary, route_economics, CarrierGroups, CbsaCorridor, CbsaMatcher,
    CompetitionLevel, CompetitionProfile, EconomicsAssumptions, ScoreEngine,
    SuggestionLimits, SuggestionReport,
};
use airnet_data::snapshot::CARRIER_GROUPS_FILE;
use airnet_data::DataSnapshot;
use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::api::error::{ApiError, ApiResult};
use crate::api::rate_limit::{self, RateLimiter};
use crate::api::{demand, fleet};
use crate::config::Config;
use crate::state::AppState;

const DIRECTORY_DEFAULT_LIMIT: usize = 50;
const DIRECTORY_MAX_LIMIT: usize = 500;
const GROUP_ROUTES_DEFAULT: usize = 20;
const GROUP_ROUTES_MAX: usize = 60;
/// Corridors one suggestion request may expand.
pub(crate) const SUGGESTION_MAX_CORRIDORS: usize = 10;
pub(crate) const SUGGESTION_MAX_PER_CORRIDOR: usize = 100;

/// Create the API router.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let limiter = RateLimiter::new(
        config.rate_limit_rps,
        config.rate_limit_enabled,
        config.trust_proxy,
    );

    let v1 = Router::new()
        .route("/v1/carriers", get(list_carriers))
        .route("/v1/carriers/:carrier/network", get(carrier_network))
        .route("/v1/carriers/:carrier/economics", get(carrier_economics))
        .route("/v1/carriers/:carrier/scores", get(carrier_scores))
        .route("/v1/carriers/:carrier/corridors", get(carrier_corridors))
        .route("/v1/carriers/:carrier/suggestions", post(carrier_suggestions))
        .route("/v1/carrier-groups", get(list_carrier_groups))
        .route("/v1/carrier-groups/:code/network", get(carrier_group_network))
        .route("/v1/markets/competition", get(market_competition))
        .route("/v1/fleet-assignment", post(fleet::assign_fleet))
        .route("/v1/optimal-aircraft", post(fleet::optimal_aircraft))
        .route("/v1/demand/top-markets", get(demand::top_markets))
        .route("/v1/demand/concentration", get(demand::concentration))
        .route("/v1/demand/stability", get(demand::stability))
        .layer(middleware::from_fn_with_state(limiter, rate_limit::rate_limit));

    Router::new().route("/health", get(health)).merge(v1)
}

/// The loaded snapshot or a 503.
pub(crate) fn snapshot(state: &AppState) -> ApiResult<&DataSnapshot> {
    state.snapshot().ok_or_else(ApiError::no_data)
}

/// Normalized carrier code that is present in the snapshot, or a 404.
pub(crate) fn known_carrier(snapshot: &DataSnapshot, raw: &str) -> ApiResult<String> {
    let code = normalize_code(raw)
        .ok_or_else(|| ApiError::BadRequest("Carrier code must not be blank".to_string()))?;
    if snapshot.aggregation.has_carrier(&code) {
        Ok(code)
    } else {
        Err(ApiError::unknown_carrier(&code))
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let started_at = state.started_at();
    let uptime_s = (chrono::Utc::now() - started_at).num_seconds();
    let body = match state.snapshot() {
        Some(snapshot) => json!({
            "status": "ok",
            "data_loaded": true,
            "markets": snapshot.report.markets,
            "carriers": snapshot.report.carriers,
            "demand_loaded": snapshot.demand.is_some(),
            "carrier_groups_loaded": !snapshot.carrier_groups.is_empty(),
            "load_report": snapshot.report,
            "cached_score_carriers": state.cached_carriers(),
            "started_at": started_at,
            "uptime_s": uptime_s,
        }),
        None => json!({
            "status": "degraded",
            "data_loaded": false,
            "started_at": started_at,
            "uptime_s": uptime_s,
        }),
    };
    Json(body)
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct CarrierQuery {
    /// Case-insensitive substring of the carrier code
    pub query: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SuggestionRequest {
    /// How many of the carrier's strongest corridors to expand
    pub corridors: Option<usize>,
    /// Suggestions kept per corridor
    pub max_suggestions: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CorridorSuggestions {
    pub corridor: CbsaCorridor,
    #[serde(flatten)]
    pub report: SuggestionReport,
}

#[derive(Debug, Deserialize)]
pub struct CompetitionQuery {
    pub source: Option<String>,
    pub destination: Option<String>,
    /// monopoly, duopoly or competitive
    pub level: Option<String>,
    pub limit: Option<usize>,
}

// === Handlers ===

async fn list_carriers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CarrierQuery>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let limit = query
        .limit
        .unwrap_or(DIRECTORY_DEFAULT_LIMIT)
        .min(DIRECTORY_MAX_LIMIT);
    let carriers = carrier_directory(&snapshot.aggregation, query.query.as_deref(), limit);
    Ok(Json(json!({
        "count": carriers.len(),
        "carriers": carriers,
    })))
}

async fn carrier_network(
    State(state): State<Arc<AppState>>,
    Path(carrier): Path<String>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let carrier = known_carrier(snapshot, &carrier)?;
    let summary = network_summary(
        &snapshot.aggregation,
        &snapshot.cbsa,
        &carrier,
        query.top.unwrap_or(10),
    )
    .ok_or_else(|| ApiError::unknown_carrier(&carrier))?;
    Ok(Json(json!(summary)))
}

async fn carrier_economics(
    State(state): State<Arc<AppState>>,
    Path(carrier): Path<String>,
    Query(assumptions): Query<EconomicsAssumptions>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let carrier = known_carrier(snapshot, &carrier)?;
    let routes = route_economics(&snapshot.aggregation, &carrier, &assumptions);
    let total_profit: f64 = routes.iter().map(|r| r.profit).sum();
    Ok(Json(json!({
        "carrier": carrier,
        "assumptions": assumptions,
        "total_profit": total_profit,
        "routes": routes,
    })))
}

async fn carrier_scores(
    State(state): State<Arc<AppState>>,
    Path(carrier): Path<String>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let carrier = known_carrier(snapshot, &carrier)?;
    let outcomes = state.carrier_scores(&carrier).ok_or_else(ApiError::no_data)?;
    let baseline = ScoreEngine::new(&snapshot.aggregation, state.competition()).baseline(&carrier);

    let scored = outcomes.iter().filter(|o| o.score().is_some()).count();
    let unscorable = outcomes.len() - scored;
    let mut body = json!({
        "carrier": carrier,
        "baseline": baseline,
        "scored": scored,
        "unscorable": unscorable,
        "routes": outcomes.as_slice(),
    });
    if baseline.is_none() {
        body["note"] = json!(
            "Insufficient data: no route has both seats and distance, so nothing can be ranked"
        );
    }
    Ok(Json(body))
}

/// The carrier group table or a 503 when none was loaded.
fn carrier_groups(snapshot: &DataSnapshot) -> ApiResult<&CarrierGroups> {
    if snapshot.carrier_groups.is_empty() {
        return Err(ApiError::Unavailable(format!(
            "No carrier group data loaded; add {CARRIER_GROUPS_FILE} to the data directory"
        )));
    }
    Ok(&snapshot.carrier_groups)
}

async fn list_carrier_groups(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let groups = carrier_groups(snapshot)?.list(&snapshot.aggregation);
    Ok(Json(json!({
        "count": groups.len(),
        "groups": groups,
    })))
}

async fn carrier_group_network(
    State(state): State<Arc<AppState>>,
    Path(code): Path<u32>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let top = query
        .top
        .unwrap_or(GROUP_ROUTES_DEFAULT)
        .clamp(1, GROUP_ROUTES_MAX);
    let summary = carrier_groups(snapshot)?
        .summary(&snapshot.aggregation, &snapshot.cbsa, code, top)
        .ok_or_else(|| {
            ApiError::NotFound(format!("Carrier group {code} has no routes in the loaded data"))
        })?;
    Ok(Json(json!(summary)))
}

async fn carrier_corridors(
    State(state): State<Arc<AppState>>,
    Path(carrier): Path<String>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Json<Value>> {
    let snapshot = snapshot(&state)?;
    let carrier = known_carrier(snapshot, &carrier)?;
    let matcher = CbsaMatcher::new(&snapshot.cbsa, &snapshot.coords);
    let corridors = matcher.top_corridors(&snapshot.aggregation, &carrier, query.top.unwrap_or(10));
    Ok(Json(json!({
        "carrier": carrier,
        "corridors": corridors,
    })))
}

async fn carrier_suggestions(
    State(state): State<Arc<AppState>>,
    Path(carrier): Path<String>,
    body: Option<Json<SuggestionRequest>>,
) -> ApiResult<Json<Value>> {
    let carrier = known_carrier(snapshot(&state)?, &carrier)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let corridors = request.corridors.unwrap_or(3);
    if corridors > SUGGESTION_MAX_CORRIDORS {
        return Err(ApiError::BadRequest(format!(
            "corridors must be at most {SUGGESTION_MAX_CORRIDORS}, got {corridors}"
        )));
    }
    let defaults = SuggestionLimits::default();
    let max_suggestions = request.max_suggestions.unwrap_or(defaults.max_suggestions);
    if max_suggestions > SUGGESTION_MAX_PER_CORRIDOR {
        return Err(ApiError::BadRequest(format!(
            "max_suggestions must be at most {SUGGESTION_MAX_PER_CORRIDOR}, got {max_suggestions}"
        )));
    }
    let limits = SuggestionLimits {
        max_suggestions,
        candidate_cap: state.config().suggestion_candidate_cap,
    };
    let timeout = Duration::from_secs(state.config().suggestion_timeout_secs);

    // The pair scan is CPU bound; keep it off the async workers.
    let scan = {
        let state = Arc::clone(&state);
        let carrier = carrier.clone();
        tokio::task::spawn_blocking(move || -> ApiResult<Vec<CorridorSuggestions>> {
            let snapshot = snapshot(&state)?;
            let matcher = CbsaMatcher::new(&snapshot.cbsa, &snapshot.coords);
            let flown = snapshot.aggregation.carrier_route_set(&carrier);
            Ok(matcher
                .top_corridors(&snapshot.aggregation, &carrier, corridors)
                .into_iter()
                .map(|corridor| {
                    let report = matcher.suggest(&corridor, &flown, limits);
                    CorridorSuggestions { corridor, report }
                })
                .collect())
        })
    };
    let results = match tokio::time::timeout(timeout, scan).await {
        Ok(Ok(results)) => results?,
        Ok(Err(err)) => return Err(ApiError::Internal(format!("Suggestion scan failed: {err}"))),
        Err(_) => {
            return Err(ApiError::TimedOut(format!(
                "Suggestion scan for {carrier} exceeded {}s",
                timeout.as_secs()
            )))
        }
    };

    let truncated = results.iter().any(|r| r.report.truncated);
    if truncated {
        tracing::info!(%carrier, cap = limits.candidate_cap, "Suggestion scan hit the candidate cap");
    }
    Ok(Json(json!({
        "carrier": carrier,
        "candidate_cap": limits.candidate_cap,
        "truncated": truncated,
        "results": results,
    })))
}

fn parse_level(raw: &str) -> ApiResult<CompetitionLevel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "monopoly" => Ok(CompetitionLevel::Monopoly),
        "duopoly" => Ok(CompetitionLevel::Duopoly),
        "competitive" => Ok(CompetitionLevel::Competitive),
        other => Err(ApiError::BadRequest(format!(
            "Unknown competition level '{other}'; expected monopoly, duopoly or competitive"
        ))),
    }
}

async fn market_competition(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompetitionQuery>,
) -> ApiResult<Json<Value>> {
    snapshot(&state)?;
    let index = state.competition();

    let source = query.source.as_deref().and_then(normalize_code);
    let destination = query.destination.as_deref().and_then(normalize_code);
    match (source, destination) {
        (Some(source), Some(destination)) => {
            let profile = index.get(&source, &destination).ok_or_else(|| {
                ApiError::NotFound(format!("No carrier serves {source}-{destination}"))
            })?;
            Ok(Json(json!(profile)))
        }
        (None, None) => {
            let level = query.level.as_deref().map(parse_level).transpose()?;
            let profiles: Vec<&CompetitionProfile> = index
                .profiles()
                .filter(|p| level.map_or(true, |l| p.level == l))
                .take(query.limit.unwrap_or(100).min(DIRECTORY_MAX_LIMIT))
                .collect();
            Ok(Json(json!({
                "count": profiles.len(),
                "markets": profiles,
            })))
        }
        _ => Err(ApiError::BadRequest(
            "Provide both source and destination, or neither".to_string(),
        )),
    }
}
