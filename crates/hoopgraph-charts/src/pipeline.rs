// Chart pipeline entry point: normalize, pull, filter, build.

use std::cell::Cell;
use std::time::{Duration, Instant};

use hoopgraph_core::config::{Config, RequestDefaults};
use hoopgraph_core::record::DEFAULT_MULTI_TEAM_SUFFIX;
use hoopgraph_core::{SeasonRecord, StatStore};
use serde::Serialize;
use tracing::{debug, info};

use crate::awards::AwardRules;
use crate::builders;
use crate::error::GraphError;
use crate::filter::{filter_records, FilterCriteria};
use crate::payload::GraphPayload;
use crate::request::{normalize, GraphRequest, Selection};

/// Point in time after which no further store calls are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.0
    }

    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}

/// Per-invocation counters returned next to the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub store_calls: usize,
    pub records_fetched: usize,
    pub records_kept: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphOutcome {
    pub payload: GraphPayload,
    pub stats: PipelineStats,
}

/// Settings the pipeline reads from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub multi_team_suffix: String,
    pub defaults: RequestDefaults,
    pub awards: AwardRules,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            multi_team_suffix: DEFAULT_MULTI_TEAM_SUFFIX.to_string(),
            defaults: RequestDefaults::default(),
            awards: AwardRules::default(),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            multi_team_suffix: config.pipeline.multi_team_suffix.clone(),
            defaults: config.defaults.clone(),
            awards: AwardRules::from_config(&config.awards),
        }
    }
}

// ---------------------------------------------------------------------------
// Store wrapper
// ---------------------------------------------------------------------------

/// Store handle for one invocation: checks the deadline before every call
/// and counts calls and fetched rows.
pub(crate) struct TrackedStore<'a> {
    inner: &'a dyn StatStore,
    deadline: Option<Deadline>,
    stats: Cell<PipelineStats>,
}

impl<'a> TrackedStore<'a> {
    pub(crate) fn new(inner: &'a dyn StatStore, deadline: Option<Deadline>) -> Self {
        Self {
            inner,
            deadline,
            stats: Cell::new(PipelineStats::default()),
        }
    }

    fn check(&self, operation: &'static str) -> Result<(), GraphError> {
        if self.deadline.is_some_and(|d| d.is_expired()) {
            return Err(GraphError::DeadlineExceeded { operation });
        }
        let mut stats = self.stats.get();
        stats.store_calls += 1;
        self.stats.set(stats);
        Ok(())
    }

    fn fetched(&self, records: anyhow::Result<Vec<SeasonRecord>>) -> Result<Vec<SeasonRecord>, GraphError> {
        let records = records.map_err(GraphError::Store)?;
        let mut stats = self.stats.get();
        stats.records_fetched += records.len();
        self.stats.set(stats);
        Ok(records)
    }

    pub(crate) fn records_by_player(&self, player: &str) -> Result<Vec<SeasonRecord>, GraphError> {
        self.check("records_by_player")?;
        self.fetched(self.inner.records_by_player(player))
    }

    pub(crate) fn records_by_year(
        &self,
        year: i32,
        criteria: &FilterCriteria,
    ) -> Result<Vec<SeasonRecord>, GraphError> {
        self.check("records_by_year")?;
        self.fetched(self.inner.records_by_year(year, &criteria.pushdown()))
    }

    pub(crate) fn award_tokens(&self) -> Result<Vec<String>, GraphError> {
        self.check("award_tokens")?;
        self.inner.award_tokens().map_err(GraphError::Store)
    }

    pub(crate) fn kept(&self, n: usize) {
        let mut stats = self.stats.get();
        stats.records_kept += n;
        self.stats.set(stats);
    }

    pub(crate) fn stats(&self) -> PipelineStats {
        self.stats.get()
    }
}

/// Shared state the builders draw on.
pub(crate) struct BuildContext<'a> {
    pub store: TrackedStore<'a>,
    pub criteria: &'a FilterCriteria,
    pub suffix: &'a str,
}

impl BuildContext<'_> {
    /// Filtered rows for one player.
    pub(crate) fn player_records(&self, player: &str) -> Result<Vec<SeasonRecord>, GraphError> {
        let rows = self.store.records_by_player(player)?;
        let kept = filter_records(rows, self.criteria, self.suffix);
        self.store.kept(kept.len());
        Ok(kept)
    }

    /// Filtered rows for the union of `years`.
    pub(crate) fn season_records(&self, years: &[i32]) -> Result<Vec<SeasonRecord>, GraphError> {
        let mut rows = Vec::new();
        for &year in years {
            rows.extend(self.store.records_by_year(year, self.criteria)?);
        }
        let kept = filter_records(rows, self.criteria, self.suffix);
        self.store.kept(kept.len());
        Ok(kept)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Turns chart requests into payloads against one store.
pub struct GraphPipeline<'a> {
    store: &'a dyn StatStore,
    settings: PipelineSettings,
}

impl<'a> GraphPipeline<'a> {
    pub fn new(store: &'a dyn StatStore, settings: PipelineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Build the payload for `request`. Every store call is made before
    /// `deadline`, or the build fails with `DeadlineExceeded`.
    pub fn build(
        &self,
        request: &GraphRequest,
        deadline: Option<Deadline>,
    ) -> Result<GraphOutcome, GraphError> {
        let started = Instant::now();
        let normalized = normalize(request, &self.settings.defaults)?;
        let kind = normalized.kind();
        debug!("normalized {} request: {:?}", kind, normalized.selection);

        let ctx = BuildContext {
            store: TrackedStore::new(self.store, deadline),
            criteria: &normalized.criteria,
            suffix: &self.settings.multi_team_suffix,
        };

        let payload = match &normalized.selection {
            Selection::Line {
                x_axis,
                y_axis,
                players,
            } => builders::line::build(&ctx, x_axis, y_axis, players, &normalized.labels)?,
            Selection::Histogram {
                stat,
                bin_count,
                years,
            } => builders::histogram::build(&ctx, stat, *bin_count, years, &normalized.labels)?,
            Selection::Scatter {
                x_stat,
                y_stat,
                years,
            } => builders::scatter::build(&ctx, x_stat, y_stat, years, &normalized.labels)?,
        };

        let stats = ctx.store.stats();
        info!(
            "built {} chart: {} store calls, {} fetched, {} kept, {} warnings in {:?}",
            kind,
            stats.store_calls,
            stats.records_fetched,
            stats.records_kept,
            payload.warnings().len(),
            started.elapsed()
        );
        Ok(GraphOutcome { payload, stats })
    }

    /// Distinct award tokens in the store, normalized for display.
    pub fn award_options(&self, deadline: Option<Deadline>) -> Result<Vec<String>, GraphError> {
        let store = TrackedStore::new(self.store, deadline);
        let tokens = store.award_tokens()?;
        Ok(self.settings.awards.normalize(tokens))
    }
}

/// Build with default settings and no deadline.
pub fn build_graph(store: &dyn StatStore, request: &GraphRequest) -> Result<GraphPayload, GraphError> {
    GraphPipeline::new(store, PipelineSettings::default())
        .build(request, None)
        .map(|outcome| outcome.payload)
}
