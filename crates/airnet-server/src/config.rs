//! Server configuration from environment.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Directory holding segments.csv, cbsa.csv, airports.csv and the optional files
    pub data_dir: PathBuf,
    /// Allowed CORS origins; empty or `*` allows any
    pub cors_origins: Vec<String>,
    /// Budget units per second per client IP; plain lookups cost one
    pub rate_limit_rps: u32,
    pub rate_limit_enabled: bool,
    /// Take the client IP from X-Forwarded-For when behind a proxy
    pub trust_proxy: bool,
    /// Upper bound on airport pairs scanned per suggestion request
    pub suggestion_candidate_cap: usize,
    /// Wall-clock budget for one suggestion request
    pub suggestion_timeout_secs: u64,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            data_dir: PathBuf::from("./data"),
            cors_origins: Vec::new(),
            rate_limit_rps: 20,
            rate_limit_enabled: true,
            trust_proxy: false,
            suggestion_candidate_cap: 250_000,
            suggestion_timeout_secs: 10,
            log_json: false,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("AIRNET_PORT").unwrap_or(defaults.server_port),
            data_dir: env::var("AIRNET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            cors_origins: env::var("AIRNET_CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_rps: parse_var("AIRNET_RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            rate_limit_enabled: flag("AIRNET_RATE_LIMIT_ENABLED")
                .unwrap_or(defaults.rate_limit_enabled),
            trust_proxy: flag("AIRNET_TRUST_PROXY").unwrap_or(defaults.trust_proxy),
            suggestion_candidate_cap: parse_var("AIRNET_SUGGESTION_CANDIDATE_CAP")
                .filter(|cap: &usize| *cap > 0)
                .unwrap_or(defaults.suggestion_candidate_cap),
            suggestion_timeout_secs: parse_var("AIRNET_SUGGESTION_TIMEOUT_SECS")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.suggestion_timeout_secs),
            log_json: flag("AIRNET_LOG_JSON").unwrap_or(defaults.log_json),
        }
    }

    /// True when any origin may call the API.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}
