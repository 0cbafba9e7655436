// SQLite persistence layer for season records.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::record::SeasonRecord;
use crate::store::{StatStore, YearPushdown};

/// Column list shared by every SELECT so `row_to_record` can map by index.
const RECORD_COLUMNS: &str = "year, player, age, team, position, games_played, games_started,
    minutes_per_game, field_goals_made, field_goals_attempted, field_goal_percentage,
    three_pointers_made, three_pointers_attempted, three_point_percentage,
    two_pointers_made, two_pointers_attempted, two_point_percentage,
    effective_field_goal_percentage, free_throws_made, free_throws_attempted,
    free_throw_percentage, offensive_rebounds, defensive_rebounds, total_rebounds,
    assists, steals, blocks, turnovers, personal_fouls, points, awards";

/// SQLite-backed season record store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS season_stats (
                id                              INTEGER PRIMARY KEY AUTOINCREMENT,
                year                            INTEGER NOT NULL,
                player                          TEXT NOT NULL,
                age                             INTEGER,
                team                            TEXT,
                team_key                        TEXT NOT NULL DEFAULT '',
                position                        TEXT,
                games_played                    INTEGER,
                games_started                   INTEGER,
                minutes_per_game                REAL,
                field_goals_made                REAL,
                field_goals_attempted           REAL,
                field_goal_percentage           REAL,
                three_pointers_made             REAL,
                three_pointers_attempted        REAL,
                three_point_percentage          REAL,
                two_pointers_made               REAL,
                two_pointers_attempted          REAL,
                two_point_percentage            REAL,
                effective_field_goal_percentage REAL,
                free_throws_made                REAL,
                free_throws_attempted           REAL,
                free_throw_percentage           REAL,
                offensive_rebounds              REAL,
                defensive_rebounds              REAL,
                total_rebounds                  REAL,
                assists                         REAL,
                steals                          REAL,
                blocks                          REAL,
                turnovers                       REAL,
                personal_fouls                  REAL,
                points                          REAL,
                awards                          TEXT,
                UNIQUE(player, year, team_key)
            );

            CREATE INDEX IF NOT EXISTS idx_season_stats_player ON season_stats(player);
            CREATE INDEX IF NOT EXISTS idx_season_stats_year ON season_stats(year);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert records in one transaction. A row with the same
    /// `(player, year, team)` replaces the earlier one, so re-importing a
    /// season file is idempotent. Returns the number of rows written.
    pub fn insert_records(&self, records: &[SeasonRecord]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin import transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO season_stats (
                        year, player, age, team, team_key, position, games_played, games_started,
                        minutes_per_game, field_goals_made, field_goals_attempted, field_goal_percentage,
                        three_pointers_made, three_pointers_attempted, three_point_percentage,
                        two_pointers_made, two_pointers_attempted, two_point_percentage,
                        effective_field_goal_percentage, free_throws_made, free_throws_attempted,
                        free_throw_percentage, offensive_rebounds, defensive_rebounds, total_rebounds,
                        assists, steals, blocks, turnovers, personal_fouls, points, awards
                     ) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                        ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32
                     )",
                )
                .context("failed to prepare season_stats insert")?;

            for r in records {
                stmt.execute(params![
                    r.year,
                    r.player,
                    r.age,
                    r.team,
                    r.team.as_deref().unwrap_or(""),
                    r.position,
                    r.games_played,
                    r.games_started,
                    r.minutes_per_game,
                    r.field_goals_made,
                    r.field_goals_attempted,
                    r.field_goal_percentage,
                    r.three_pointers_made,
                    r.three_pointers_attempted,
                    r.three_point_percentage,
                    r.two_pointers_made,
                    r.two_pointers_attempted,
                    r.two_point_percentage,
                    r.effective_field_goal_percentage,
                    r.free_throws_made,
                    r.free_throws_attempted,
                    r.free_throw_percentage,
                    r.offensive_rebounds,
                    r.defensive_rebounds,
                    r.total_rebounds,
                    r.assists,
                    r.steals,
                    r.blocks,
                    r.turnovers,
                    r.personal_fouls,
                    r.points,
                    r.awards,
                ])
                .with_context(|| format!("failed to insert {} ({})", r.player, r.year))?;
            }
        }
        tx.commit().context("failed to commit import transaction")?;
        debug!("inserted {} season rows", records.len());
        Ok(records.len())
    }

    /// Total number of stored season rows.
    pub fn record_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM season_stats", [], |row| row.get(0))
            .context("failed to count season rows")?;
        Ok(count as usize)
    }

    fn query_records(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<SeasonRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(sql)
            .context("failed to prepare season_stats query")?;
        let rows = stmt
            .query_map(args, row_to_record)
            .context("failed to query season_stats")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map season_stats rows")?;
        Ok(rows)
    }

    fn query_strings(&self, sql: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql).context("failed to prepare listing query")?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("failed to run listing query")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map listing rows")?;
        Ok(values)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SeasonRecord> {
    Ok(SeasonRecord {
        year: row.get(0)?,
        player: row.get(1)?,
        age: row.get(2)?,
        team: row.get(3)?,
        position: row.get(4)?,
        games_played: row.get(5)?,
        games_started: row.get(6)?,
        minutes_per_game: row.get(7)?,
        field_goals_made: row.get(8)?,
        field_goals_attempted: row.get(9)?,
        field_goal_percentage: row.get(10)?,
        three_pointers_made: row.get(11)?,
        three_pointers_attempted: row.get(12)?,
        three_point_percentage: row.get(13)?,
        two_pointers_made: row.get(14)?,
        two_pointers_attempted: row.get(15)?,
        two_point_percentage: row.get(16)?,
        effective_field_goal_percentage: row.get(17)?,
        free_throws_made: row.get(18)?,
        free_throws_attempted: row.get(19)?,
        free_throw_percentage: row.get(20)?,
        offensive_rebounds: row.get(21)?,
        defensive_rebounds: row.get(22)?,
        total_rebounds: row.get(23)?,
        assists: row.get(24)?,
        steals: row.get(25)?,
        blocks: row.get(26)?,
        turnovers: row.get(27)?,
        personal_fouls: row.get(28)?,
        points: row.get(29)?,
        awards: row.get(30)?,
    })
}

impl StatStore for Database {
    fn records_by_player(&self, player: &str) -> Result<Vec<SeasonRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM season_stats WHERE player = ?1 ORDER BY year, id"
        );
        self.query_records(&sql, &[&player])
            .with_context(|| format!("failed to load seasons for {player}"))
    }

    fn records_by_year(&self, year: i32, pushdown: &YearPushdown) -> Result<Vec<SeasonRecord>> {
        let rows = match pushdown.min_games_played {
            Some(min_games) => {
                let sql = format!(
                    "SELECT {RECORD_COLUMNS} FROM season_stats
                     WHERE year = ?1 AND games_played >= ?2
                     ORDER BY points IS NULL, points DESC, id"
                );
                self.query_records(&sql, &[&year, &min_games])
            }
            None => {
                let sql = format!(
                    "SELECT {RECORD_COLUMNS} FROM season_stats
                     WHERE year = ?1
                     ORDER BY points IS NULL, points DESC, id"
                );
                self.query_records(&sql, &[&year])
            }
        };
        rows.with_context(|| format!("failed to load season {year}"))
    }

    fn player_names(&self) -> Result<Vec<String>> {
        self.query_strings("SELECT DISTINCT player FROM season_stats ORDER BY player")
    }

    fn team_names(&self) -> Result<Vec<String>> {
        self.query_strings(
            "SELECT DISTINCT team FROM season_stats WHERE team IS NOT NULL ORDER BY team",
        )
    }

    fn years(&self) -> Result<Vec<i32>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT DISTINCT year FROM season_stats ORDER BY year")
            .context("failed to prepare years query")?;
        let years = stmt
            .query_map([], |row| row.get::<_, i32>(0))
            .context("failed to query years")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map year rows")?;
        Ok(years)
    }

    fn award_tokens(&self) -> Result<Vec<String>> {
        let raw = self.query_strings(
            "SELECT DISTINCT awards FROM season_stats WHERE awards IS NOT NULL AND awards != ''",
        )?;
        let tokens: BTreeSet<String> = raw
            .iter()
            .flat_map(|list| list.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect();
        Ok(tokens.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn sample(player: &str, year: i32, team: Option<&str>, points: Option<f64>) -> SeasonRecord {
        SeasonRecord {
            team: team.map(String::from),
            points,
            games_played: Some(60),
            ..SeasonRecord::new(player, year)
        }
    }

    #[test]
    fn open_creates_empty_schema() {
        let db = test_db();
        assert_eq!(db.record_count().unwrap(), 0);
        assert!(db.player_names().unwrap().is_empty());
    }

    #[test]
    fn insert_and_read_back_by_player() {
        let db = test_db();
        let mut rec = sample("Larry Bird", 1986, Some("BOS"), Some(25.8));
        rec.age = Some(29);
        rec.minutes_per_game = Some(38.0);
        rec.awards = Some("MVP-1,AS,NBA1".into());
        db.insert_records(&[rec.clone()]).unwrap();

        let rows = db.records_by_player("Larry Bird").unwrap();
        assert_eq!(rows, vec![rec]);
    }

    #[test]
    fn reimport_replaces_same_season_team_row() {
        let db = test_db();
        db.insert_records(&[sample("A", 2000, Some("LAL"), Some(10.0))])
            .unwrap();
        db.insert_records(&[sample("A", 2000, Some("LAL"), Some(12.0))])
            .unwrap();
        assert_eq!(db.record_count().unwrap(), 1);
        assert_eq!(db.records_by_player("A").unwrap()[0].points, Some(12.0));
    }

    #[test]
    fn multi_team_rows_are_kept_side_by_side() {
        let db = test_db();
        db.insert_records(&[
            sample("A", 2000, Some("2TM"), Some(15.0)),
            sample("A", 2000, Some("LAL"), Some(14.0)),
            sample("A", 2000, Some("BOS"), Some(16.0)),
        ])
        .unwrap();
        assert_eq!(db.records_by_year(2000, &YearPushdown::default()).unwrap().len(), 3);
    }

    #[test]
    fn year_query_orders_by_points_and_pushes_down_games() {
        let db = test_db();
        let mut short = sample("C", 2001, Some("NYK"), Some(30.0));
        short.games_played = Some(3);
        db.insert_records(&[
            sample("A", 2001, Some("LAL"), Some(10.0)),
            sample("B", 2001, Some("BOS"), None),
            short,
        ])
        .unwrap();

        let all: Vec<String> = db
            .records_by_year(2001, &YearPushdown::default())
            .unwrap()
            .into_iter()
            .map(|r| r.player)
            .collect();
        assert_eq!(all, vec!["C", "A", "B"]);

        let pushed = db
            .records_by_year(
                2001,
                &YearPushdown {
                    min_games_played: Some(10),
                },
            )
            .unwrap();
        assert_eq!(pushed.len(), 2);
        assert!(pushed.iter().all(|r| r.player != "C"));
    }

    #[test]
    fn listings_are_distinct_and_sorted() {
        let db = test_db();
        let mut a = sample("Zed", 2001, Some("LAL"), Some(1.0));
        a.awards = Some("AS,MVP-3".into());
        let mut b = sample("Amy", 1999, None, Some(2.0));
        b.awards = Some("AS".into());
        db.insert_records(&[a, b, sample("Zed", 2002, Some("BOS"), None)])
            .unwrap();

        assert_eq!(db.player_names().unwrap(), vec!["Amy", "Zed"]);
        assert_eq!(db.team_names().unwrap(), vec!["BOS", "LAL"]);
        assert_eq!(db.years().unwrap(), vec![1999, 2001, 2002]);
        assert_eq!(db.award_tokens().unwrap(), vec!["AS", "MVP-3"]);
    }
}
