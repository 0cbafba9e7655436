// Stat accessor: stat-name tokens to numeric extractors and display labels.

use hoopgraph_core::SeasonRecord;
use serde::Serialize;
use tracing::warn;

/// Canonical stat keys a chart axis can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Age,
    Year,
    Points,
    Assists,
    Rebounds,
    OffensiveRebounds,
    DefensiveRebounds,
    Steals,
    Blocks,
    Turnovers,
    PersonalFouls,
    MinutesPerGame,
    GamesPlayed,
    GamesStarted,
    FieldGoalsMade,
    FieldGoalsAttempted,
    FieldGoalPercentage,
    ThreePointersMade,
    ThreePointersAttempted,
    ThreePointPercentage,
    TwoPointersMade,
    TwoPointersAttempted,
    TwoPointPercentage,
    EffectiveFieldGoalPercentage,
    FreeThrowsMade,
    FreeThrowsAttempted,
    FreeThrowPercentage,
}

struct StatEntry {
    stat: Stat,
    key: &'static str,
    aliases: &'static [&'static str],
    label: &'static str,
}

/// One row per canonical key. Tokens are matched lowercase against `key`
/// and `aliases`.
const STAT_TABLE: &[StatEntry] = &[
    StatEntry { stat: Stat::Age, key: "age", aliases: &[], label: "Age" },
    StatEntry { stat: Stat::Year, key: "year", aliases: &["season"], label: "Season" },
    StatEntry { stat: Stat::Points, key: "points", aliases: &["ppg", "pts"], label: "Points Per Game" },
    StatEntry { stat: Stat::Assists, key: "assists", aliases: &["apg", "ast"], label: "Assists Per Game" },
    StatEntry {
        stat: Stat::Rebounds,
        key: "rebounds",
        aliases: &["total_rebounds", "rpg", "trb"],
        label: "Rebounds Per Game",
    },
    StatEntry {
        stat: Stat::OffensiveRebounds,
        key: "offensive_rebounds",
        aliases: &["orb"],
        label: "Offensive Rebounds Per Game",
    },
    StatEntry {
        stat: Stat::DefensiveRebounds,
        key: "defensive_rebounds",
        aliases: &["drb"],
        label: "Defensive Rebounds Per Game",
    },
    StatEntry { stat: Stat::Steals, key: "steals", aliases: &["spg", "stl"], label: "Steals Per Game" },
    StatEntry { stat: Stat::Blocks, key: "blocks", aliases: &["bpg", "blk"], label: "Blocks Per Game" },
    StatEntry { stat: Stat::Turnovers, key: "turnovers", aliases: &["tov"], label: "Turnovers Per Game" },
    StatEntry {
        stat: Stat::PersonalFouls,
        key: "personal_fouls",
        aliases: &["pf"],
        label: "Personal Fouls Per Game",
    },
    StatEntry {
        stat: Stat::MinutesPerGame,
        key: "minutes_per_game",
        aliases: &["mpg", "mp"],
        label: "Minutes Per Game",
    },
    StatEntry { stat: Stat::GamesPlayed, key: "games_played", aliases: &["g", "gp"], label: "Games Played" },
    StatEntry { stat: Stat::GamesStarted, key: "games_started", aliases: &["gs"], label: "Games Started" },
    StatEntry {
        stat: Stat::FieldGoalsMade,
        key: "field_goals_made",
        aliases: &["fg"],
        label: "Field Goals Made",
    },
    StatEntry {
        stat: Stat::FieldGoalsAttempted,
        key: "field_goals_attempted",
        aliases: &["fga"],
        label: "Field Goals Attempted",
    },
    StatEntry {
        stat: Stat::FieldGoalPercentage,
        key: "field_goal_percentage",
        aliases: &["fg%", "fg_pct"],
        label: "Field Goal %",
    },
    StatEntry {
        stat: Stat::ThreePointersMade,
        key: "three_pointers_made",
        aliases: &["3p"],
        label: "3-Pointers Made",
    },
    StatEntry {
        stat: Stat::ThreePointersAttempted,
        key: "three_pointers_attempted",
        aliases: &["3pa"],
        label: "3-Pointers Attempted",
    },
    StatEntry {
        stat: Stat::ThreePointPercentage,
        key: "three_point_percentage",
        aliases: &["3p%", "three_pt_pct"],
        label: "3-Point %",
    },
    StatEntry {
        stat: Stat::TwoPointersMade,
        key: "two_pointers_made",
        aliases: &["2p"],
        label: "2-Pointers Made",
    },
    StatEntry {
        stat: Stat::TwoPointersAttempted,
        key: "two_pointers_attempted",
        aliases: &["2pa"],
        label: "2-Pointers Attempted",
    },
    StatEntry {
        stat: Stat::TwoPointPercentage,
        key: "two_point_percentage",
        aliases: &["2p%"],
        label: "2-Point %",
    },
    StatEntry {
        stat: Stat::EffectiveFieldGoalPercentage,
        key: "effective_field_goal_percentage",
        aliases: &["efg%", "efg"],
        label: "Effective Field Goal %",
    },
    StatEntry {
        stat: Stat::FreeThrowsMade,
        key: "free_throws_made",
        aliases: &["ft"],
        label: "Free Throws Made",
    },
    StatEntry {
        stat: Stat::FreeThrowsAttempted,
        key: "free_throws_attempted",
        aliases: &["fta"],
        label: "Free Throws Attempted",
    },
    StatEntry {
        stat: Stat::FreeThrowPercentage,
        key: "free_throw_percentage",
        aliases: &["ft%", "ft_pct"],
        label: "Free Throw %",
    },
];

impl Stat {
    /// Parse a stat token (case-insensitive, surrounding whitespace ignored).
    pub fn parse(token: &str) -> Option<Stat> {
        let token = token.trim().to_lowercase();
        STAT_TABLE
            .iter()
            .find(|e| e.key == token || e.aliases.contains(&token.as_str()))
            .map(|e| e.stat)
    }

    fn entry(self) -> &'static StatEntry {
        // Every variant has exactly one table row (checked in tests).
        STAT_TABLE
            .iter()
            .find(|e| e.stat == self)
            .unwrap_or(&STAT_TABLE[0])
    }

    /// Canonical snake_case key.
    pub fn key(self) -> &'static str {
        self.entry().key
    }

    /// Human-readable label for axes and warning messages.
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Every canonical stat, in table order.
    pub fn all() -> impl Iterator<Item = Stat> {
        STAT_TABLE.iter().map(|e| e.stat)
    }

    /// Extract this stat from a record; `None` when the record lacks it.
    pub fn value(self, r: &SeasonRecord) -> Option<f64> {
        match self {
            Stat::Age => r.age.map(f64::from),
            Stat::Year => Some(f64::from(r.year)),
            Stat::Points => r.points,
            Stat::Assists => r.assists,
            Stat::Rebounds => r.total_rebounds,
            Stat::OffensiveRebounds => r.offensive_rebounds,
            Stat::DefensiveRebounds => r.defensive_rebounds,
            Stat::Steals => r.steals,
            Stat::Blocks => r.blocks,
            Stat::Turnovers => r.turnovers,
            Stat::PersonalFouls => r.personal_fouls,
            Stat::MinutesPerGame => r.minutes_per_game,
            Stat::GamesPlayed => r.games_played.map(f64::from),
            Stat::GamesStarted => r.games_started.map(f64::from),
            Stat::FieldGoalsMade => r.field_goals_made,
            Stat::FieldGoalsAttempted => r.field_goals_attempted,
            Stat::FieldGoalPercentage => r.field_goal_percentage,
            Stat::ThreePointersMade => r.three_pointers_made,
            Stat::ThreePointersAttempted => r.three_pointers_attempted,
            Stat::ThreePointPercentage => r.three_point_percentage,
            Stat::TwoPointersMade => r.two_pointers_made,
            Stat::TwoPointersAttempted => r.two_pointers_attempted,
            Stat::TwoPointPercentage => r.two_point_percentage,
            Stat::EffectiveFieldGoalPercentage => r.effective_field_goal_percentage,
            Stat::FreeThrowsMade => r.free_throws_made,
            Stat::FreeThrowsAttempted => r.free_throws_attempted,
            Stat::FreeThrowPercentage => r.free_throw_percentage,
        }
        .filter(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Token-level accessor
// ---------------------------------------------------------------------------

/// A request's stat token resolved once per build. An unknown token stays
/// resolvable but projects to absent for every record.
#[derive(Debug, Clone, PartialEq)]
pub struct StatSelector {
    pub token: String,
    pub stat: Option<Stat>,
}

impl StatSelector {
    /// Resolve `token`, warning when it names no known stat.
    pub fn resolve(token: &str) -> Self {
        let stat = Stat::parse(token);
        if stat.is_none() {
            warn!("unknown stat token '{}'; every record will project to absent", token);
        }
        Self {
            token: token.trim().to_string(),
            stat,
        }
    }

    pub fn value(&self, record: &SeasonRecord) -> Option<f64> {
        self.stat.and_then(|s| s.value(record))
    }

    /// Display label; an unknown token labels itself.
    pub fn label(&self) -> String {
        match self.stat {
            Some(s) => s.label().to_string(),
            None => self.token.clone(),
        }
    }
}

/// One-shot lookup of `token` on `record`.
pub fn stat_value(token: &str, record: &SeasonRecord) -> Option<f64> {
    StatSelector::resolve(token).value(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SeasonRecord {
        SeasonRecord {
            age: Some(27),
            points: Some(30.1),
            total_rebounds: Some(5.2),
            field_goal_percentage: Some(0.505),
            minutes_per_game: Some(34.0),
            games_played: Some(79),
            ..SeasonRecord::new("Stephen Curry", 2016)
        }
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(Stat::parse("PPG"), Some(Stat::Points));
        assert_eq!(Stat::parse(" fg% "), Some(Stat::FieldGoalPercentage));
        assert_eq!(Stat::parse("mpg"), Some(Stat::MinutesPerGame));
        assert_eq!(Stat::parse("Season"), Some(Stat::Year));
        assert_eq!(Stat::parse("total_rebounds"), Some(Stat::Rebounds));
        assert_eq!(Stat::parse("plus_minus"), None);
    }

    #[test]
    fn every_stat_has_one_table_row() {
        for stat in Stat::all() {
            let rows = STAT_TABLE.iter().filter(|e| e.stat == stat).count();
            assert_eq!(rows, 1, "{stat:?}");
            assert_eq!(Stat::parse(stat.key()), Some(stat));
        }
        assert_eq!(Stat::all().count(), 27);
    }

    #[test]
    fn aliases_are_unambiguous() {
        let mut seen = std::collections::HashSet::new();
        for e in STAT_TABLE {
            assert!(seen.insert(e.key), "duplicate key {}", e.key);
            for alias in e.aliases {
                assert!(seen.insert(*alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn values_project_from_record() {
        let r = record();
        assert_eq!(Stat::Age.value(&r), Some(27.0));
        assert_eq!(Stat::Year.value(&r), Some(2016.0));
        assert_eq!(Stat::Points.value(&r), Some(30.1));
        assert_eq!(Stat::Rebounds.value(&r), Some(5.2));
        assert_eq!(Stat::GamesPlayed.value(&r), Some(79.0));
        assert_eq!(Stat::Steals.value(&r), None);
    }

    #[test]
    fn unknown_token_projects_absent_and_labels_itself() {
        let sel = StatSelector::resolve("wins_shares");
        assert!(sel.stat.is_none());
        assert_eq!(sel.value(&record()), None);
        assert_eq!(sel.label(), "wins_shares");
        assert_eq!(stat_value("ppg", &record()), Some(30.1));
    }

    #[test]
    fn labels_match_axis_text() {
        assert_eq!(Stat::Points.label(), "Points Per Game");
        assert_eq!(Stat::ThreePointPercentage.label(), "3-Point %");
        assert_eq!(StatSelector::resolve("year").label(), "Season");
    }
}
