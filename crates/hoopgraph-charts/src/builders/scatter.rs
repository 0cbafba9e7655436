// Scatter: one point per season with both stats present.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::axis;
use crate::error::GraphError;
use crate::payload::{AxisMeta, CompletenessWarning, GraphPayload, ScatterPayload, ScatterPoint};
use crate::pipeline::BuildContext;
use crate::request::LabelOverrides;

pub(crate) fn build(
    ctx: &BuildContext<'_>,
    x_stat: &str,
    y_stat: &str,
    years: &[i32],
    labels: &LabelOverrides,
) -> Result<GraphPayload, GraphError> {
    let (x, x_info) = axis(x_stat, labels.x_label.as_ref());
    let (y, y_info) = axis(y_stat, labels.y_label.as_ref());

    let records = ctx.season_records(years)?;
    let mut points = Vec::with_capacity(records.len());
    let (mut missing_x, mut missing_y) = (0, 0);
    for r in &records {
        let (xv, yv) = (x.value(r), y.value(r));
        missing_x += usize::from(xv.is_none());
        missing_y += usize::from(yv.is_none());
        if let (Some(xv), Some(yv)) = (xv, yv) {
            points.push(ScatterPoint {
                x: xv,
                y: yv,
                player: r.player.clone(),
                team: r.team.clone(),
                position: r.position.clone(),
                year: r.year,
                label: r.player.clone(),
            });
        }
    }

    let mut warnings = Vec::new();
    if points.len() < records.len() {
        let w = CompletenessWarning::for_axes(
            &x.label(),
            &y.label(),
            records.len(),
            points.len(),
            missing_x,
            missing_y,
        );
        warn!("{}", w.message);
        warnings.push(w);
    }

    let players: BTreeSet<&str> = points.iter().map(|p| p.player.as_str()).collect();
    let players: Vec<String> = players.into_iter().map(String::from).collect();
    debug!("scatter: {} points across {} players", points.len(), players.len());

    Ok(GraphPayload::Scatter(ScatterPayload {
        points,
        players,
        axis_meta: AxisMeta {
            x: Some(x_info),
            y: Some(y_info),
            title: labels.title.clone(),
        },
        warnings,
    }))
}
