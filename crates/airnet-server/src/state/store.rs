//! Read-only data snapshot plus per-carrier caches.

use airnet_core::models::normalize_code;
use airnet_core::{CompetitionIndex, ScoreEngine, ScoreOutcome};
use airnet_data::DataSnapshot;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::config::Config;

/// Application state shared by every handler.
///
/// The snapshot never changes after startup. Score results are memoized per
/// carrier since they depend on nothing else.
pub struct AppState {
    snapshot: Option<DataSnapshot>,
    competition: CompetitionIndex,
    scores: DashMap<String, Arc<Vec<ScoreOutcome>>>,
    config: Config,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(snapshot: Option<DataSnapshot>, config: Config) -> Self {
        let competition = snapshot
            .as_ref()
            .map(|s| CompetitionIndex::build(&s.aggregation))
            .unwrap_or_default();
        Self {
            snapshot,
            competition,
            scores: DashMap::new(),
            config,
            started_at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> Option<&DataSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn competition(&self) -> &CompetitionIndex {
        &self.competition
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Route scores for a carrier, computed on first use. `None` without data.
    pub fn carrier_scores(&self, carrier: &str) -> Option<Arc<Vec<ScoreOutcome>>> {
        let snapshot = self.snapshot.as_ref()?;
        let key = normalize_code(carrier).unwrap_or_default();
        if let Some(cached) = self.scores.get(&key) {
            return Some(cached.value().clone());
        }
        let outcomes: Vec<ScoreOutcome> = ScoreEngine::new(&snapshot.aggregation, &self.competition)
            .score_routes(&key)
            .into_values()
            .collect();
        let entry = self.scores.entry(key).or_insert_with(|| Arc::new(outcomes));
        Some(entry.value().clone())
    }

    pub fn cached_carriers(&self) -> usize {
        self.scores.len()
    }
}
