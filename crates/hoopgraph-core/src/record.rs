// Season record model: one player's per-game averages for one season-team row.

use serde::{Deserialize, Serialize};

/// Team-field suffix that marks a season aggregate across several teams
/// (e.g. `2TM`, `3TM`).
pub const DEFAULT_MULTI_TEAM_SUFFIX: &str = "TM";

/// First season for which minutes per game were recorded. Earlier rows carry
/// no `minutes_per_game`.
pub const MINUTES_TRACKED_FROM: i32 = 1952;

/// One player's per-game statistical averages for one season-team combination.
///
/// `player` is not a unique key on its own: a player who changed teams
/// mid-season has one row per team plus, usually, an aggregate row whose
/// `team` ends in [`DEFAULT_MULTI_TEAM_SUFFIX`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRecord {
    pub year: i32,
    pub player: String,
    pub age: Option<i32>,
    pub team: Option<String>,
    pub position: Option<String>,
    pub games_played: Option<i32>,
    pub games_started: Option<i32>,
    pub minutes_per_game: Option<f64>,
    pub field_goals_made: Option<f64>,
    pub field_goals_attempted: Option<f64>,
    pub field_goal_percentage: Option<f64>,
    pub three_pointers_made: Option<f64>,
    pub three_pointers_attempted: Option<f64>,
    pub three_point_percentage: Option<f64>,
    pub two_pointers_made: Option<f64>,
    pub two_pointers_attempted: Option<f64>,
    pub two_point_percentage: Option<f64>,
    pub effective_field_goal_percentage: Option<f64>,
    pub free_throws_made: Option<f64>,
    pub free_throws_attempted: Option<f64>,
    pub free_throw_percentage: Option<f64>,
    pub offensive_rebounds: Option<f64>,
    pub defensive_rebounds: Option<f64>,
    pub total_rebounds: Option<f64>,
    pub assists: Option<f64>,
    pub steals: Option<f64>,
    pub blocks: Option<f64>,
    pub turnovers: Option<f64>,
    pub personal_fouls: Option<f64>,
    pub points: Option<f64>,
    pub awards: Option<String>,
}

impl SeasonRecord {
    /// Start a record for `player` in `year` with every stat absent.
    pub fn new(player: impl Into<String>, year: i32) -> Self {
        Self {
            player: player.into(),
            year,
            ..Self::default()
        }
    }

    /// Whether this row is the multi-team season aggregate.
    pub fn is_multi_team(&self, suffix: &str) -> bool {
        self.team
            .as_deref()
            .is_some_and(|team| team.trim().ends_with(suffix))
    }

    /// Trimmed, non-empty award tokens from the comma-separated `awards` field.
    pub fn award_tokens(&self) -> impl Iterator<Item = &str> {
        self.awards
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Key identifying the season regardless of team.
    pub fn season_key(&self) -> (&str, i32) {
        (self.player.as_str(), self.year)
    }
}
