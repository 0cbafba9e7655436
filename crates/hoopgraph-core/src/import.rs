// Per-game season CSV loading.
//
// Reads season exports named `NBA_<year>_per_game_stats.csv`: one row per
// player-team-season with Basketball-Reference style column headers. The
// season year comes from the file name, not from the rows.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::record::SeasonRecord;

const FILE_PREFIX: &str = "NBA_";
const FILE_SUFFIX: &str = "_per_game_stats.csv";

/// Summary row that some exports append after the player rows.
const LEAGUE_AVERAGE_ROW: &str = "League Average";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("cannot determine season year from file name {path}")]
    UnknownSeason { path: String },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// One per-game CSV row. Missing or empty cells deserialize to `None`;
/// columns not listed here (`Rk`, `Player-additional`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RawPerGameRow {
    #[serde(rename = "Player")]
    player: String,
    #[serde(rename = "Age", default)]
    age: Option<i32>,
    #[serde(rename = "Team", alias = "Tm", default)]
    team: Option<String>,
    #[serde(rename = "Pos", default)]
    position: Option<String>,
    #[serde(rename = "G", default)]
    games_played: Option<i32>,
    #[serde(rename = "GS", default)]
    games_started: Option<i32>,
    #[serde(rename = "MP", default)]
    minutes_per_game: Option<f64>,
    #[serde(rename = "FG", default)]
    field_goals_made: Option<f64>,
    #[serde(rename = "FGA", default)]
    field_goals_attempted: Option<f64>,
    #[serde(rename = "FG%", default)]
    field_goal_percentage: Option<f64>,
    #[serde(rename = "3P", default)]
    three_pointers_made: Option<f64>,
    #[serde(rename = "3PA", default)]
    three_pointers_attempted: Option<f64>,
    #[serde(rename = "3P%", default)]
    three_point_percentage: Option<f64>,
    #[serde(rename = "2P", default)]
    two_pointers_made: Option<f64>,
    #[serde(rename = "2PA", default)]
    two_pointers_attempted: Option<f64>,
    #[serde(rename = "2P%", default)]
    two_point_percentage: Option<f64>,
    #[serde(rename = "eFG%", default)]
    effective_field_goal_percentage: Option<f64>,
    #[serde(rename = "FT", default)]
    free_throws_made: Option<f64>,
    #[serde(rename = "FTA", default)]
    free_throws_attempted: Option<f64>,
    #[serde(rename = "FT%", default)]
    free_throw_percentage: Option<f64>,
    #[serde(rename = "ORB", default)]
    offensive_rebounds: Option<f64>,
    #[serde(rename = "DRB", default)]
    defensive_rebounds: Option<f64>,
    #[serde(rename = "TRB", default)]
    total_rebounds: Option<f64>,
    #[serde(rename = "AST", default)]
    assists: Option<f64>,
    #[serde(rename = "STL", default)]
    steals: Option<f64>,
    #[serde(rename = "BLK", default)]
    blocks: Option<f64>,
    #[serde(rename = "TOV", default)]
    turnovers: Option<f64>,
    #[serde(rename = "PF", default)]
    personal_fouls: Option<f64>,
    #[serde(rename = "PTS", default)]
    points: Option<f64>,
    #[serde(rename = "Awards", default)]
    awards: Option<String>,
}

/// Trim a text cell, mapping blank to `None`.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawPerGameRow {
    fn into_record(self, year: i32) -> SeasonRecord {
        SeasonRecord {
            year,
            player: self.player.trim().to_string(),
            age: self.age,
            team: clean_text(self.team),
            position: clean_text(self.position),
            games_played: self.games_played,
            games_started: self.games_started,
            minutes_per_game: self.minutes_per_game,
            field_goals_made: self.field_goals_made,
            field_goals_attempted: self.field_goals_attempted,
            field_goal_percentage: self.field_goal_percentage,
            three_pointers_made: self.three_pointers_made,
            three_pointers_attempted: self.three_pointers_attempted,
            three_point_percentage: self.three_point_percentage,
            two_pointers_made: self.two_pointers_made,
            two_pointers_attempted: self.two_pointers_attempted,
            two_point_percentage: self.two_point_percentage,
            effective_field_goal_percentage: self.effective_field_goal_percentage,
            free_throws_made: self.free_throws_made,
            free_throws_attempted: self.free_throws_attempted,
            free_throw_percentage: self.free_throw_percentage,
            offensive_rebounds: self.offensive_rebounds,
            defensive_rebounds: self.defensive_rebounds,
            total_rebounds: self.total_rebounds,
            assists: self.assists,
            steals: self.steals,
            blocks: self.blocks,
            turnovers: self.turnovers,
            personal_fouls: self.personal_fouls,
            points: self.points,
            awards: clean_text(self.awards),
        }
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Extract the season year from `NBA_<year>_per_game_stats.csv`.
pub fn season_year_from_path(path: &Path) -> Option<i32> {
    let name = path.file_name()?.to_str()?;
    let year = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if year.len() != 4 {
        return None;
    }
    year.parse().ok()
}

/// Parse season rows from any reader. Malformed rows (including repeated
/// header rows) and the league-average summary are skipped with a warning.
pub fn load_season_from_reader<R: Read>(rdr: R, year: i32) -> Result<Vec<SeasonRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut records = Vec::new();
    for result in reader.deserialize::<RawPerGameRow>() {
        match result {
            Ok(raw) => {
                let name = raw.player.trim();
                if name.is_empty() || name == LEAGUE_AVERAGE_ROW {
                    continue;
                }
                records.push(raw.into_record(year));
            }
            Err(e) => {
                warn!("skipping malformed {} row: {}", year, e);
            }
        }
    }
    Ok(records)
}

/// Load one season file; the year is taken from the file name.
pub fn load_season_file(path: &Path) -> Result<Vec<SeasonRecord>, ImportError> {
    let year = season_year_from_path(path).ok_or_else(|| ImportError::UnknownSeason {
        path: path.display().to_string(),
    })?;
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let records = load_season_from_reader(file, year).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    info!("Loaded {} rows for season {} from {}", records.len(), year, path.display());
    Ok(records)
}

/// Season files in `dir`, sorted so seasons import in chronological order.
/// Files that do not follow the naming pattern are ignored.
pub fn find_season_files(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ImportError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ImportError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && season_year_from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Rk,Player,Age,Team,Pos,G,GS,MP,FG,FGA,FG%,3P,3PA,3P%,2P,2PA,2P%,eFG%,FT,FTA,FT%,ORB,DRB,TRB,AST,STL,BLK,TOV,PF,PTS,Awards
1,Joel Embiid,29,PHI,C,39,39,33.6,11.5,21.8,.529,1.4,3.6,.388,10.1,18.2,.557,.561,10.2,11.6,.883,2.4,8.6,11.0,5.6,1.2,1.7,3.8,2.9,34.7,
2,Luka Dončić,24,DAL,PG,70,70,37.5,11.5,23.6,.487,4.1,10.6,.382,7.4,13.0,.573,.573,6.7,8.7,.786,0.8,8.4,9.2,9.8,1.4,0.5,4.0,2.1,33.9,\"MVP-3,AS,NBA1\"
3,Kelly Olynyk,32,2TM,C,70,16,21.1,3.3,6.1,.541,0.8,2.1,.387,2.5,4.0,.623,.609,1.5,1.7,.857,1.3,3.8,5.1,3.3,0.8,0.4,1.5,2.3,8.9,
Rk,Player,Age,Team,Pos,G,GS,MP,FG,FGA,FG%,3P,3PA,3P%,2P,2PA,2P%,eFG%,FT,FTA,FT%,ORB,DRB,TRB,AST,STL,BLK,TOV,PF,PTS,Awards
,League Average,26.6,,,,,22.9,4.1,8.7,.474,1.3,3.5,.366,2.8,5.2,.546,.548,1.7,2.2,.782,1.0,3.1,4.1,2.5,0.7,0.5,1.2,1.7,11.1,
";

    #[test]
    fn year_parsed_from_file_name() {
        assert_eq!(
            season_year_from_path(Path::new("data/NBA_2024_per_game_stats.csv")),
            Some(2024)
        );
        assert_eq!(season_year_from_path(Path::new("NBA_24_per_game_stats.csv")), None);
        assert_eq!(season_year_from_path(Path::new("notes.csv")), None);
    }

    #[test]
    fn loads_rows_and_skips_header_repeats_and_league_average() {
        let rows = load_season_from_reader(SAMPLE.as_bytes(), 2024).unwrap();
        assert_eq!(rows.len(), 3);

        let embiid = &rows[0];
        assert_eq!(embiid.year, 2024);
        assert_eq!(embiid.player, "Joel Embiid");
        assert_eq!(embiid.age, Some(29));
        assert_eq!(embiid.team.as_deref(), Some("PHI"));
        assert_eq!(embiid.points, Some(34.7));
        assert_eq!(embiid.field_goal_percentage, Some(0.529));
        assert!(embiid.awards.is_none());

        assert_eq!(rows[1].awards.as_deref(), Some("MVP-3,AS,NBA1"));
        assert_eq!(rows[2].team.as_deref(), Some("2TM"));
    }

    #[test]
    fn early_seasons_without_minutes_load_as_absent() {
        let csv = "\
Player,Age,Tm,Pos,G,PTS
George Mikan,25,MNL,C,68,27.4
";
        let rows = load_season_from_reader(csv.as_bytes(), 1950).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team.as_deref(), Some("MNL"));
        assert!(rows[0].minutes_per_game.is_none());
        assert!(rows[0].games_started.is_none());
    }

    #[test]
    fn load_season_file_rejects_unknown_name() {
        let err = load_season_file(Path::new("players.csv")).unwrap_err();
        assert!(matches!(err, ImportError::UnknownSeason { .. }));
    }

    #[test]
    fn find_season_files_sorts_and_ignores_other_files() {
        let tmp = std::env::temp_dir().join("hoopgraph_import_find_files");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(tmp.join("NBA_2001_per_game_stats.csv"), "Player\n").unwrap();
        std::fs::write(tmp.join("NBA_1999_per_game_stats.csv"), "Player\n").unwrap();
        std::fs::write(tmp.join("readme.txt"), "x").unwrap();

        let files = find_season_files(&tmp).unwrap();
        let years: Vec<i32> = files
            .iter()
            .filter_map(|p| season_year_from_path(p))
            .collect();
        assert_eq!(years, vec![1999, 2001]);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
