// Chart payload types handed back to the transport layer.

use serde::Serialize;

/// Ready-to-render chart data, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphPayload {
    Line(LinePayload),
    Histogram(HistogramPayload),
    Scatter(ScatterPayload),
}

impl GraphPayload {
    pub fn axis_meta(&self) -> &AxisMeta {
        match self {
            GraphPayload::Line(p) => &p.axis_meta,
            GraphPayload::Histogram(p) => &p.axis_meta,
            GraphPayload::Scatter(p) => &p.axis_meta,
        }
    }

    pub fn warnings(&self) -> &[CompletenessWarning] {
        match self {
            GraphPayload::Line(_) => &[],
            GraphPayload::Histogram(p) => &p.warnings,
            GraphPayload::Scatter(p) => &p.warnings,
        }
    }

    /// Whether the payload carries no plottable data.
    pub fn is_empty(&self) -> bool {
        match self {
            GraphPayload::Line(p) => p.series.is_empty(),
            GraphPayload::Histogram(p) => p.bin_counts.is_empty(),
            GraphPayload::Scatter(p) => p.points.is_empty(),
        }
    }
}

/// Resolved selector and display label for one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisInfo {
    pub stat: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<AxisInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<AxisInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub label: String,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePayload {
    pub series: Vec<LineSeries>,
    pub axis_meta: AxisMeta,
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One record's contribution to a bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinMember {
    pub player: String,
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramPayload {
    pub bin_edges: Vec<f64>,
    pub bin_counts: Vec<usize>,
    pub bin_members: Vec<Vec<BinMember>>,
    pub axis_meta: AxisMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CompletenessWarning>,
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub player: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub year: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPayload {
    pub points: Vec<ScatterPoint>,
    /// Distinct players represented by `points`, sorted.
    pub players: Vec<String>,
    pub axis_meta: AxisMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CompletenessWarning>,
}

// ---------------------------------------------------------------------------
// Completeness
// ---------------------------------------------------------------------------

/// Records that passed filtering but could not be plotted because a required
/// stat was absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessWarning {
    pub total_records: usize,
    pub valid_records: usize,
    pub excluded_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_x: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_y: Option<usize>,
    pub message: String,
}

impl CompletenessWarning {
    /// Single-stat warning (histogram).
    pub fn for_stat(label: &str, total: usize, valid: usize) -> Self {
        let excluded = total - valid;
        Self {
            total_records: total,
            valid_records: valid,
            excluded_records: excluded,
            missing_x: None,
            missing_y: None,
            message: format!("{excluded} of {total} records excluded: missing {label}"),
        }
    }

    /// Two-axis warning (scatter). A record missing both stats counts toward
    /// both `missing_x` and `missing_y` but is excluded once.
    pub fn for_axes(
        x_label: &str,
        y_label: &str,
        total: usize,
        valid: usize,
        missing_x: usize,
        missing_y: usize,
    ) -> Self {
        let excluded = total - valid;
        Self {
            total_records: total,
            valid_records: valid,
            excluded_records: excluded,
            missing_x: Some(missing_x),
            missing_y: Some(missing_y),
            message: format!(
                "{excluded} of {total} records excluded: {missing_x} missing {x_label}, {missing_y} missing {y_label}"
            ),
        }
    }
}
