// Record filter: per-record predicates plus the multi-team season dedup.

use std::collections::HashSet;

use hoopgraph_core::{SeasonRecord, YearPushdown};
use tracing::debug;

/// Sentinel list entry that disables a list criterion.
pub const ALL_SENTINEL: &str = "All";

/// Predicates a chart request can put on the record set.
///
/// Numeric thresholds of zero or below and list criteria that are empty or
/// contain [`ALL_SENTINEL`] are inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_games_played: Option<i32>,
    pub min_minutes_per_game: Option<f64>,
    pub positions: Vec<String>,
    pub teams: Vec<String>,
    /// Raw age tokens; non-numeric tokens never match.
    pub ages: Vec<String>,
    pub awards: Vec<String>,
}

impl FilterCriteria {
    pub fn games_threshold(&self) -> Option<i32> {
        self.min_games_played.filter(|g| *g > 0)
    }

    pub fn minutes_threshold(&self) -> Option<f64> {
        self.min_minutes_per_game.filter(|m| *m > 0.0)
    }

    /// The part of the criteria a year-scoped store query can apply itself.
    pub fn pushdown(&self) -> YearPushdown {
        YearPushdown {
            min_games_played: self.games_threshold(),
        }
    }

    fn positions_set(&self) -> Option<HashSet<&str>> {
        active_set(&self.positions)
    }

    fn teams_set(&self) -> Option<HashSet<&str>> {
        active_set(&self.teams)
    }

    fn awards_set(&self) -> Option<HashSet<&str>> {
        active_set(&self.awards)
    }

    fn ages_set(&self) -> Option<HashSet<i32>> {
        active_set(&self.ages)
            .map(|tokens| tokens.into_iter().filter_map(|t| t.parse().ok()).collect())
    }
}

fn active_set(list: &[String]) -> Option<HashSet<&str>> {
    let set: HashSet<&str> = list
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if set.is_empty() || set.contains(ALL_SENTINEL) {
        None
    } else {
        Some(set)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Apply every active criterion, then the multi-team dedup. Order-preserving.
pub fn filter_records(
    mut records: Vec<SeasonRecord>,
    criteria: &FilterCriteria,
    multi_team_suffix: &str,
) -> Vec<SeasonRecord> {
    let input = records.len();

    if let Some(min) = criteria.games_threshold() {
        records.retain(|r| r.games_played.is_some_and(|g| g >= min));
        debug!("min games {}: {} records remain", min, records.len());
    }

    // Seasons before minutes were tracked have no value; those always pass.
    if let Some(min) = criteria.minutes_threshold() {
        records.retain(|r| r.minutes_per_game.map_or(true, |m| m >= min));
        debug!("min minutes {}: {} records remain", min, records.len());
    }

    if let Some(positions) = criteria.positions_set() {
        records.retain(|r| {
            r.position
                .as_deref()
                .is_some_and(|p| positions.contains(p.trim()))
        });
        debug!("positions {:?}: {} records remain", positions, records.len());
    }

    if let Some(teams) = criteria.teams_set() {
        records.retain(|r| r.team.as_deref().is_some_and(|t| teams.contains(t.trim())));
        debug!("teams {:?}: {} records remain", teams, records.len());
    }

    if let Some(ages) = criteria.ages_set() {
        records.retain(|r| r.age.is_some_and(|a| ages.contains(&a)));
        debug!("ages {:?}: {} records remain", ages, records.len());
    }

    if let Some(awards) = criteria.awards_set() {
        records.retain(|r| r.award_tokens().any(|t| awards.contains(t)));
        debug!("awards {:?}: {} records remain", awards, records.len());
    }

    let records = dedup_multi_team(records, multi_team_suffix);
    debug!("filtered {} -> {} records", input, records.len());
    records
}

/// Drop per-team rows for seasons that also have a multi-team aggregate row.
pub fn dedup_multi_team(mut records: Vec<SeasonRecord>, suffix: &str) -> Vec<SeasonRecord> {
    let aggregated: HashSet<(String, i32)> = records
        .iter()
        .filter(|r| r.is_multi_team(suffix))
        .map(|r| (r.player.clone(), r.year))
        .collect();
    if aggregated.is_empty() {
        return records;
    }

    let before = records.len();
    records.retain(|r| {
        r.team.is_none()
            || r.is_multi_team(suffix)
            || !aggregated.contains(&(r.player.clone(), r.year))
    });
    debug!(
        "multi-team dedup dropped {} per-team rows across {} seasons",
        before - records.len(),
        aggregated.len()
    );
    records
}
