// Line chart: one X-sorted series per requested player.

use tracing::debug;

use super::axis;
use crate::error::GraphError;
use crate::payload::{AxisMeta, GraphPayload, LinePayload, LineSeries};
use crate::pipeline::BuildContext;
use crate::request::LabelOverrides;

pub(crate) fn build(
    ctx: &BuildContext<'_>,
    x_axis: &str,
    y_axis: &str,
    players: &[String],
    labels: &LabelOverrides,
) -> Result<GraphPayload, GraphError> {
    let (x, x_info) = axis(x_axis, labels.x_label.as_ref());
    let (y, y_info) = axis(y_axis, labels.y_label.as_ref());

    let mut series = Vec::with_capacity(players.len());
    for player in players {
        let records = ctx.player_records(player)?;
        let mut pairs: Vec<(f64, f64)> = records
            .iter()
            .filter_map(|r| Some((x.value(r)?, y.value(r)?)))
            .collect();
        if pairs.is_empty() {
            debug!("no plottable seasons for '{}' ({} records)", player, records.len());
            continue;
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (x_values, y_values) = pairs.into_iter().unzip();
        series.push(LineSeries {
            label: player.clone(),
            x_values,
            y_values,
        });
    }

    Ok(GraphPayload::Line(LinePayload {
        series,
        axis_meta: AxisMeta {
            x: Some(x_info),
            y: Some(y_info),
            title: labels.title.clone(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriteria;
    use crate::pipeline::TrackedStore;
    use hoopgraph_core::{MemoryStore, SeasonRecord};

    fn season(player: &str, year: i32, age: Option<i32>, points: Option<f64>, team: &str) -> SeasonRecord {
        SeasonRecord {
            age,
            points,
            team: Some(team.into()),
            ..SeasonRecord::new(player, year)
        }
    }

    fn run(store: &MemoryStore, players: &[&str], labels: &LabelOverrides) -> LinePayload {
        let criteria = FilterCriteria::default();
        let ctx = BuildContext {
            store: TrackedStore::new(store, None),
            criteria: &criteria,
            suffix: "TM",
        };
        let players: Vec<String> = players.iter().map(|p| p.to_string()).collect();
        match build(&ctx, "age", "ppg", &players, labels).unwrap() {
            GraphPayload::Line(p) => p,
            other => panic!("expected line payload, got {other:?}"),
        }
    }

    #[test]
    fn series_sorted_by_x() {
        let store = MemoryStore::new(vec![
            season("A", 2012, Some(25), Some(10.0), "BOS"),
            season("A", 2009, Some(22), Some(30.0), "BOS"),
            season("A", 2011, Some(24), Some(20.0), "BOS"),
        ]);
        let payload = run(&store, &["A"], &LabelOverrides::default());
        assert_eq!(payload.series.len(), 1);
        assert_eq!(payload.series[0].x_values, [22.0, 24.0, 25.0]);
        assert_eq!(payload.series[0].y_values, [30.0, 20.0, 10.0]);
        assert_eq!(payload.axis_meta.x.as_ref().unwrap().label, "Age");
        assert_eq!(payload.axis_meta.y.as_ref().unwrap().label, "Points Per Game");
    }

    #[test]
    fn incomplete_pairs_and_empty_players_skipped() {
        let store = MemoryStore::new(vec![
            season("A", 2010, Some(23), None, "BOS"),
            season("A", 2011, None, Some(12.0), "BOS"),
            season("A", 2012, Some(25), Some(14.0), "BOS"),
            season("B", 2012, None, Some(3.0), "LAL"),
        ]);
        let payload = run(&store, &["A", "B", "Nobody"], &LabelOverrides::default());
        assert_eq!(payload.series.len(), 1);
        assert_eq!(payload.series[0].label, "A");
        assert_eq!(payload.series[0].x_values, [25.0]);
    }

    #[test]
    fn traded_season_plots_once() {
        let store = MemoryStore::new(vec![
            season("A", 2019, Some(28), Some(20.0), "HOU"),
            season("A", 2019, Some(28), Some(24.0), "2TM"),
            season("A", 2019, Some(28), Some(27.0), "BRK"),
        ]);
        let payload = run(&store, &["A"], &LabelOverrides::default());
        assert_eq!(payload.series[0].y_values, [24.0]);
    }

    #[test]
    fn label_overrides_win() {
        let store = MemoryStore::new(vec![season("A", 2012, Some(25), Some(10.0), "BOS")]);
        let labels = LabelOverrides {
            title: Some("Career arc".into()),
            x_label: None,
            y_label: Some("PPG".into()),
        };
        let payload = run(&store, &["A"], &labels);
        assert_eq!(payload.axis_meta.title.as_deref(), Some("Career arc"));
        assert_eq!(payload.axis_meta.x.as_ref().unwrap().label, "Age");
        assert_eq!(payload.axis_meta.y.as_ref().unwrap().label, "PPG");
        assert_eq!(payload.axis_meta.y.as_ref().unwrap().stat, "ppg");
    }
}
