// Histogram: equal-width bins of one stat over one or more seasons.

use tracing::{debug, warn};

use super::axis;
use crate::error::GraphError;
use crate::histogram::BinLayout;
use crate::payload::{AxisInfo, AxisMeta, BinMember, CompletenessWarning, GraphPayload, HistogramPayload};
use crate::pipeline::BuildContext;
use crate::request::LabelOverrides;

pub(crate) fn build(
    ctx: &BuildContext<'_>,
    stat: &str,
    bin_count: usize,
    years: &[i32],
    labels: &LabelOverrides,
) -> Result<GraphPayload, GraphError> {
    let (selector, x_info) = axis(stat, labels.x_label.as_ref());
    let axis_meta = AxisMeta {
        y: Some(AxisInfo {
            stat: "count".into(),
            label: labels.y_label.clone().unwrap_or_else(|| "Players".into()),
        }),
        title: labels.title.clone(),
        x: Some(x_info),
    };

    let records = ctx.season_records(years)?;
    let members: Vec<BinMember> = records
        .iter()
        .filter_map(|r| {
            selector.value(r).map(|value| BinMember {
                player: r.player.clone(),
                year: r.year,
                value,
            })
        })
        .collect();

    let mut warnings = Vec::new();
    if members.len() < records.len() {
        let w = CompletenessWarning::for_stat(&selector.label(), records.len(), members.len());
        warn!("{}", w.message);
        warnings.push(w);
    }

    let values: Vec<f64> = members.iter().map(|m| m.value).collect();
    let Some(layout) = BinLayout::from_values(&values, bin_count) else {
        debug!("no values for '{}' in {:?}; empty histogram", stat, years);
        return Ok(GraphPayload::Histogram(HistogramPayload {
            bin_edges: Vec::new(),
            bin_counts: Vec::new(),
            bin_members: Vec::new(),
            axis_meta,
            warnings,
        }));
    };
    debug!(
        "binning {} values: min={} max={} width={} bins={}",
        values.len(),
        layout.min,
        layout.max,
        layout.width,
        bin_count
    );

    let mut bin_counts = vec![0; bin_count];
    let mut bin_members: Vec<Vec<BinMember>> = vec![Vec::new(); bin_count];
    for member in members {
        if let Some(idx) = layout.bin_index(member.value) {
            bin_counts[idx] += 1;
            bin_members[idx].push(member);
        }
    }

    Ok(GraphPayload::Histogram(HistogramPayload {
        bin_edges: layout.edges,
        bin_counts,
        bin_members,
        axis_meta,
        warnings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriteria;
    use crate::pipeline::TrackedStore;
    use hoopgraph_core::{MemoryStore, SeasonRecord};

    fn scorer(player: &str, year: i32, points: Option<f64>) -> SeasonRecord {
        SeasonRecord {
            points,
            team: Some("BOS".into()),
            games_played: Some(60),
            ..SeasonRecord::new(player, year)
        }
    }

    fn run(store: &MemoryStore, criteria: &FilterCriteria, bins: usize, years: &[i32]) -> HistogramPayload {
        let ctx = BuildContext {
            store: TrackedStore::new(store, None),
            criteria,
            suffix: "TM",
        };
        match build(&ctx, "points", bins, years, &LabelOverrides::default()).unwrap() {
            GraphPayload::Histogram(p) => p,
            other => panic!("expected histogram payload, got {other:?}"),
        }
    }

    #[test]
    fn bins_values_with_members() {
        let store = MemoryStore::new(vec![
            scorer("A", 2020, Some(0.0)),
            scorer("B", 2020, Some(25.0)),
            scorer("C", 2020, Some(60.0)),
            scorer("D", 2020, Some(100.0)),
        ]);
        let p = run(&store, &FilterCriteria::default(), 4, &[2020]);
        assert_eq!(p.bin_edges, [0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(p.bin_counts, [1, 1, 1, 1]);
        assert_eq!(p.bin_members[1][0].player, "B");
        assert_eq!(p.bin_members[3][0].value, 100.0);
        assert!(p.warnings.is_empty());
    }

    #[test]
    fn missing_values_warn_and_counts_add_up() {
        let store = MemoryStore::new(vec![
            scorer("A", 2020, Some(3.0)),
            scorer("B", 2020, None),
            scorer("C", 2021, Some(9.5)),
            scorer("D", 2021, Some(7.0)),
        ]);
        let p = run(&store, &FilterCriteria::default(), 5, &[2020, 2021]);
        assert_eq!(p.bin_counts.iter().sum::<usize>(), 3);
        assert_eq!(p.warnings.len(), 1);
        assert_eq!(p.warnings[0].excluded_records, 1);
        assert!(p.warnings[0].message.contains("Points Per Game"));
    }

    #[test]
    fn no_values_gives_empty_payload() {
        let store = MemoryStore::new(vec![scorer("A", 2020, Some(3.0))]);
        let p = run(&store, &FilterCriteria::default(), 20, &[1999]);
        assert!(p.bin_edges.is_empty());
        assert!(p.bin_counts.is_empty());
        assert!(p.warnings.is_empty());

        let p = run(&store, &FilterCriteria::default(), 20, &[]);
        assert!(p.bin_counts.is_empty());
    }

    #[test]
    fn filters_apply_before_binning() {
        let mut bench = scorer("E", 2020, Some(2.0));
        bench.games_played = Some(5);
        let store = MemoryStore::new(vec![scorer("A", 2020, Some(10.0)), bench]);
        let criteria = FilterCriteria {
            min_games_played: Some(20),
            ..Default::default()
        };
        let p = run(&store, &criteria, 2, &[2020]);
        assert_eq!(p.bin_counts, [0, 1]);
        assert_eq!(p.bin_members[1][0].player, "A");
    }
}
