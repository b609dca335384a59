//! O&D demand endpoints. Available only when demand.csv was loaded.

use airnet_core::{
    aggregate_market_totals, build_market_quarterly, compute_concentration, market_stability,
    rank_markets, DemandRecord, MarketQuarter, StabilityThresholds,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::snapshot;
use crate::state::AppState;

fn quarterly(
    records: &[DemandRecord],
    directional: Option<bool>,
    since_year: Option<i32>,
) -> Vec<MarketQuarter> {
    build_market_quarterly(records, directional.unwrap_or(false), since_year)
}

fn demand_records(state: &AppState) -> ApiResult<&[DemandRecord]> {
    snapshot(state)?
        .demand
        .as_deref()
        .ok_or_else(|| ApiError::Unavailable("No demand data loaded (demand.csv)".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct TopMarketsQuery {
    pub directional: Option<bool>,
    pub since_year: Option<i32>,
    pub top: Option<usize>,
    /// Comma-separated airport codes to leave out
    pub exclude: Option<String>,
}

pub async fn top_markets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopMarketsQuery>,
) -> ApiResult<Json<Value>> {
    let records = demand_records(&state)?;
    let totals =
        aggregate_market_totals(&quarterly(records, query.directional, query.since_year));
    let exclude: Vec<String> = query
        .exclude
        .as_deref()
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let ranked = rank_markets(&totals, query.top.unwrap_or(50), &exclude);
    Ok(Json(json!({
        "markets_total": totals.len(),
        "markets": ranked,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ConcentrationQuery {
    pub directional: Option<bool>,
    pub since_year: Option<i32>,
    pub top_share: Option<f64>,
}

pub async fn concentration(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConcentrationQuery>,
) -> ApiResult<Json<Value>> {
    let records = demand_records(&state)?;
    let totals =
        aggregate_market_totals(&quarterly(records, query.directional, query.since_year));
    let stats = compute_concentration(&totals, query.top_share.unwrap_or(0.10))?;
    Ok(Json(json!(stats)))
}

#[derive(Debug, Deserialize)]
pub struct StabilityQuery {
    pub directional: Option<bool>,
    pub since_year: Option<i32>,
    pub limit: Option<usize>,
    pub stable_residual_cv_max: Option<f64>,
    pub stable_seasonality_max: Option<f64>,
    pub seasonal_seasonality_min: Option<f64>,
    pub seasonal_residual_cv_max: Option<f64>,
}

impl StabilityQuery {
    fn thresholds(&self) -> StabilityThresholds {
        let defaults = StabilityThresholds::default();
        StabilityThresholds {
            stable_residual_cv_max: self
                .stable_residual_cv_max
                .unwrap_or(defaults.stable_residual_cv_max),
            stable_seasonality_max: self
                .stable_seasonality_max
                .unwrap_or(defaults.stable_seasonality_max),
            seasonal_seasonality_min: self
                .seasonal_seasonality_min
                .unwrap_or(defaults.seasonal_seasonality_min),
            seasonal_residual_cv_max: self
                .seasonal_residual_cv_max
                .unwrap_or(defaults.seasonal_residual_cv_max),
        }
    }
}

pub async fn stability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StabilityQuery>,
) -> ApiResult<Json<Value>> {
    let records = demand_records(&state)?;
    let thresholds = query.thresholds();
    let panel = quarterly(records, query.directional, query.since_year);
    let mut markets = market_stability(&panel, &thresholds);
    let total = markets.len();
    markets.truncate(query.limit.unwrap_or(50));
    Ok(Json(json!({
        "markets_total": total,
        "thresholds": thresholds,
        "markets": markets,
    })))
}
