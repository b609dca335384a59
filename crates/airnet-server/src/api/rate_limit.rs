//! Per-IP request budgets.
//!
//! Each client gets `budget` units per second. Cheap lookups spend one unit;
//! the suggestion scan and fleet simulation spend more, so a client cannot
//! saturate the server by repeating them.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

pub const SUGGESTION_COST: u32 = 5;
pub const FLEET_ASSIGNMENT_COST: u32 = 3;
pub const OPTIMAL_AIRCRAFT_COST: u32 = 2;

/// Budget units a request spends.
pub fn request_cost(method: &Method, path: &str) -> u32 {
    if *method != Method::POST {
        return 1;
    }
    match path.trim_end_matches('/') {
        "/v1/fleet-assignment" => FLEET_ASSIGNMENT_COST,
        "/v1/optimal-aircraft" => OPTIMAL_AIRCRAFT_COST,
        p if p.starts_with("/v1/carriers/") && p.ends_with("/suggestions") => SUGGESTION_COST,
        _ => 1,
    }
}

/// Sliding one-second window of spent units per client IP.
#[derive(Clone)]
pub struct RateLimiter {
    spent: Arc<DashMap<String, Vec<(Instant, u32)>>>,
    last_cleanup: Arc<Mutex<Instant>>,
    cleanup_interval: Duration,
    budget: u32,
    enabled: bool,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(budget: u32, enabled: bool, trust_proxy: bool) -> Self {
        Self {
            spent: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(Mutex::new(Instant::now())),
            cleanup_interval: Duration::from_secs(60),
            budget,
            enabled,
            trust_proxy,
        }
    }

    /// Spend `cost` units for `ip`; false when the window cannot afford it.
    ///
    /// A cost above the whole budget is charged as the whole budget, so an
    /// expensive call is still possible from an idle client.
    pub fn check(&self, ip: &str, cost: u32) -> bool {
        if !self.enabled {
            return true;
        }

        let now = Instant::now();
        let do_cleanup = {
            let mut last = self
                .last_cleanup
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if now.duration_since(*last) >= self.cleanup_interval {
                *last = now;
                true
            } else {
                false
            }
        };
        if do_cleanup {
            self.purge_stale_entries(now);
        }

        let cost = cost.clamp(1, self.budget.max(1));
        let mut entry = self.spent.entry(ip.to_string()).or_default();
        let charges = entry.value_mut();
        charges.retain(|(t, _)| now.duration_since(*t) < WINDOW);

        let used: u32 = charges.iter().map(|(_, c)| c).sum();
        if used + cost <= self.budget {
            charges.push((now, cost));
            true
        } else {
            false
        }
    }

    fn purge_stale_entries(&self, now: Instant) {
        self.spent
            .retain(|_, charges| charges.iter().any(|(t, _)| now.duration_since(*t) < WINDOW));
    }

    pub fn tracked_clients(&self) -> usize {
        self.spent.len()
    }

    fn client_ip(&self, request: &Request) -> String {
        let forwarded = if self.trust_proxy {
            request
                .headers()
                .get("X-Forwarded-For")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        } else {
            None
        };
        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = limiter.client_ip(&request);
    let cost = request_cost(request.method(), request.uri().path());
    if limiter.check(&ip, cost) {
        next.run(request).await
    } else {
        tracing::debug!(%ip, cost, path = %request.uri().path(), "Request budget exceeded");
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            Json(serde_json::json!({
                "error": "Rate limit exceeded",
                "cost": cost,
                "budget_per_second": limiter.budget,
                "retry_after": "1 second"
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_each_ip_independently() {
        let limiter = RateLimiter::new(2, true, false);
        assert!(limiter.check("10.0.0.1", 1));
        assert!(limiter.check("10.0.0.1", 1));
        assert!(!limiter.check("10.0.0.1", 1));
        assert!(limiter.check("10.0.0.2", 1));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn expensive_requests_spend_more_of_the_budget() {
        let limiter = RateLimiter::new(6, true, false);
        assert!(limiter.check("10.0.0.1", SUGGESTION_COST));
        assert!(limiter.check("10.0.0.1", 1));
        assert!(!limiter.check("10.0.0.1", 1));

        assert!(limiter.check("10.0.0.2", FLEET_ASSIGNMENT_COST));
        assert!(limiter.check("10.0.0.2", FLEET_ASSIGNMENT_COST));
        assert!(!limiter.check("10.0.0.2", FLEET_ASSIGNMENT_COST));
    }

    #[test]
    fn cost_above_budget_takes_the_whole_window() {
        let limiter = RateLimiter::new(2, true, false);
        assert!(limiter.check("10.0.0.1", SUGGESTION_COST));
        assert!(!limiter.check("10.0.0.1", 1));
    }

    #[test]
    fn costs_follow_method_and_path() {
        assert_eq!(request_cost(&Method::GET, "/v1/carriers"), 1);
        assert_eq!(request_cost(&Method::GET, "/v1/carriers/AA/corridors"), 1);
        assert_eq!(
            request_cost(&Method::POST, "/v1/carriers/AA/suggestions"),
            SUGGESTION_COST
        );
        assert_eq!(
            request_cost(&Method::POST, "/v1/fleet-assignment"),
            FLEET_ASSIGNMENT_COST
        );
        assert_eq!(
            request_cost(&Method::POST, "/v1/optimal-aircraft/"),
            OPTIMAL_AIRCRAFT_COST
        );
    }

    #[test]
    fn disabled_limiter_allows_everything() {
        let limiter = RateLimiter::new(0, false, false);
        assert!((0..100).all(|_| limiter.check("10.0.0.1", SUGGESTION_COST)));
    }
}
