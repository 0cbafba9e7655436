// Record store capability set consumed by the chart pipeline.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use anyhow::Result;

use crate::record::SeasonRecord;

/// Filters the store may apply itself when pulling a season. Anything pushed
/// down here is re-checked in memory by the pipeline, so a store is free to
/// ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearPushdown {
    pub min_games_played: Option<i32>,
}

/// Read-only access to season records.
///
/// Implementations must be safe to share between concurrent requests; the
/// pipeline never writes through this trait.
pub trait StatStore: Send + Sync {
    /// Every row for `player`, ordered by year.
    fn records_by_player(&self, player: &str) -> Result<Vec<SeasonRecord>>;

    /// Every row for `year`, ordered by points descending.
    fn records_by_year(&self, year: i32, pushdown: &YearPushdown) -> Result<Vec<SeasonRecord>>;

    /// Distinct player names, sorted.
    fn player_names(&self) -> Result<Vec<String>>;

    /// Distinct non-null team abbreviations, sorted.
    fn team_names(&self) -> Result<Vec<String>>;

    /// Distinct season years, ascending.
    fn years(&self) -> Result<Vec<i32>>;

    /// Distinct award tokens across all rows, unnormalized.
    fn award_tokens(&self) -> Result<Vec<String>>;

    /// Case-insensitive substring search over player names. An empty
    /// fragment returns every player.
    fn search_players(&self, fragment: &str) -> Result<Vec<String>> {
        let needle = fragment.trim().to_lowercase();
        let names = self.player_names()?;
        if needle.is_empty() {
            return Ok(names);
        }
        Ok(names
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Vec-backed store. Used by tests and for ad-hoc runs over freshly imported
/// CSV data without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<SeasonRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<SeasonRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Points descending with absent values last, matching the SQL ordering.
fn by_points_desc(a: &SeasonRecord, b: &SeasonRecord) -> Ordering {
    match (a.points, b.points) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl StatStore for MemoryStore {
    fn records_by_player(&self, player: &str) -> Result<Vec<SeasonRecord>> {
        let mut rows: Vec<SeasonRecord> = self
            .records
            .iter()
            .filter(|r| r.player == player)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.year);
        Ok(rows)
    }

    fn records_by_year(&self, year: i32, pushdown: &YearPushdown) -> Result<Vec<SeasonRecord>> {
        let mut rows: Vec<SeasonRecord> = self
            .records
            .iter()
            .filter(|r| r.year == year)
            .filter(|r| match pushdown.min_games_played {
                Some(min) => r.games_played.is_some_and(|g| g >= min),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(by_points_desc);
        Ok(rows)
    }

    fn player_names(&self) -> Result<Vec<String>> {
        let names: BTreeSet<&str> = self.records.iter().map(|r| r.player.as_str()).collect();
        Ok(names.into_iter().map(String::from).collect())
    }

    fn team_names(&self) -> Result<Vec<String>> {
        let teams: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|r| r.team.as_deref())
            .collect();
        Ok(teams.into_iter().map(String::from).collect())
    }

    fn years(&self) -> Result<Vec<i32>> {
        let years: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        Ok(years.into_iter().collect())
    }

    fn award_tokens(&self) -> Result<Vec<String>> {
        let tokens: BTreeSet<&str> = self.records.iter().flat_map(|r| r.award_tokens()).collect();
        Ok(tokens.into_iter().map(String::from).collect())
    }
}
