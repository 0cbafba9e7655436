// Chart request wire shape and default filling.

use std::fmt;
use std::str::FromStr;

use hoopgraph_core::config::RequestDefaults;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GraphError;
use crate::filter::FilterCriteria;

/// Upper bound on histogram bins a request may ask for.
pub const MAX_BIN_COUNT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Line,
    Histogram,
    Scatter,
}

impl FromStr for GraphKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(GraphKind::Line),
            "histogram" => Ok(GraphKind::Histogram),
            "scatter" => Ok(GraphKind::Scatter),
            _ => Err(GraphError::UnsupportedKind(s.to_string())),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphKind::Line => "line",
            GraphKind::Histogram => "histogram",
            GraphKind::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

/// A declarative chart request as it arrives over the wire.
///
/// Every field is optional; [`normalize`] fills what the graph kind needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphRequest {
    pub graph_type: Option<String>,

    // Line
    pub x_axis_type: Option<String>,
    pub y_axis_type: Option<String>,
    pub players: Option<Vec<String>>,

    // Histogram
    pub stat: Option<String>,
    pub bin_count: Option<i64>,

    // Scatter
    pub x_axis_stat: Option<String>,
    pub y_axis_stat: Option<String>,

    // Season scope (histogram, scatter). `years` wins over `year`.
    pub year: Option<i32>,
    pub years: Option<Vec<i32>>,

    // Filters
    pub min_games_played: Option<i32>,
    pub min_minutes_per_game: Option<f64>,
    pub positions: Option<Vec<String>>,
    #[serde(alias = "teamsFilter")]
    pub teams: Option<Vec<String>>,
    #[serde(deserialize_with = "string_tokens")]
    pub age_range: Option<Vec<String>>,
    pub awards: Option<Vec<String>>,

    // Labels
    pub title: Option<String>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
}

/// Accept list entries written as strings or bare numbers (`["25", 26]`).
fn string_tokens<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let raw: Option<Vec<Token>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|tokens| {
        tokens
            .into_iter()
            .map(|t| match t {
                Token::Text(s) => s,
                Token::Int(n) => n.to_string(),
                Token::Float(f) => f.to_string(),
            })
            .collect()
    }))
}

// ---------------------------------------------------------------------------
// Normalized form
// ---------------------------------------------------------------------------

/// What to pull and project, per graph kind, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Line {
        x_axis: String,
        y_axis: String,
        players: Vec<String>,
    },
    Histogram {
        stat: String,
        bin_count: usize,
        years: Vec<i32>,
    },
    Scatter {
        x_stat: String,
        y_stat: String,
        years: Vec<i32>,
    },
}

impl Selection {
    pub fn kind(&self) -> GraphKind {
        match self {
            Selection::Line { .. } => GraphKind::Line,
            Selection::Histogram { .. } => GraphKind::Histogram,
            Selection::Scatter { .. } => GraphKind::Scatter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelOverrides {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub selection: Selection,
    pub criteria: FilterCriteria,
    pub labels: LabelOverrides,
}

impl NormalizedRequest {
    pub fn kind(&self) -> GraphKind {
        self.selection.kind()
    }
}

fn selector(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn season_scope(request: &GraphRequest) -> Vec<i32> {
    match (&request.years, request.year) {
        (Some(years), _) if !years.is_empty() => {
            let mut scope = Vec::with_capacity(years.len());
            for year in years {
                if !scope.contains(year) {
                    scope.push(*year);
                }
            }
            scope
        }
        (_, Some(year)) => vec![year],
        _ => Vec::new(),
    }
}

/// Parse the graph kind and fill missing selectors from `defaults`.
/// The incoming request is left untouched.
pub fn normalize(
    request: &GraphRequest,
    defaults: &RequestDefaults,
) -> Result<NormalizedRequest, GraphError> {
    let kind: GraphKind = match request.graph_type.as_deref() {
        Some(raw) => raw.parse()?,
        None => return Err(GraphError::invalid("graphType", "missing graph type")),
    };

    let selection = match kind {
        GraphKind::Line => Selection::Line {
            x_axis: selector(&request.x_axis_type, &defaults.line_x_axis),
            y_axis: selector(&request.y_axis_type, &defaults.line_y_axis),
            players: request
                .players
                .iter()
                .flatten()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
        },
        GraphKind::Histogram => {
            let bin_count = match request.bin_count {
                None => defaults.histogram_bin_count,
                Some(n) if (1..=MAX_BIN_COUNT).contains(&n) => n as usize,
                Some(n) => {
                    return Err(GraphError::invalid(
                        "binCount",
                        format!("{n} is outside 1..={MAX_BIN_COUNT}"),
                    ))
                }
            };
            Selection::Histogram {
                stat: selector(&request.stat, &defaults.histogram_stat),
                bin_count,
                years: season_scope(request),
            }
        }
        GraphKind::Scatter => Selection::Scatter {
            x_stat: selector(&request.x_axis_stat, &defaults.scatter_x_stat),
            y_stat: selector(&request.y_axis_stat, &defaults.scatter_y_stat),
            years: season_scope(request),
        },
    };

    if let Some(min) = request.min_minutes_per_game {
        if !min.is_finite() {
            return Err(GraphError::invalid("minMinutesPerGame", "must be a finite number"));
        }
    }

    let criteria = FilterCriteria {
        min_games_played: request.min_games_played,
        min_minutes_per_game: request.min_minutes_per_game,
        positions: request.positions.clone().unwrap_or_default(),
        teams: request.teams.clone().unwrap_or_default(),
        ages: request.age_range.clone().unwrap_or_default(),
        awards: request.awards.clone().unwrap_or_default(),
    };

    Ok(NormalizedRequest {
        selection,
        criteria,
        labels: LabelOverrides {
            title: non_blank(&request.title),
            x_label: non_blank(&request.x_axis_label),
            y_label: non_blank(&request.y_axis_label),
        },
    })
}
