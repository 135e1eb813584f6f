//! Noise-sweep view: per-noise-level scatter pairs (train/test accuracy per
//! model) with a vertical connector per model, gated by a slider.
//!
//! Each noise level owns its trace group. The slider works off group
//! membership, so a model missing at one noise level shortens that group
//! without shifting any other level's traces.

use anyhow::{anyhow, Result};
use std::collections::BTreeSet;

use crate::series::{
    Annotation, Coord, Figure, FigureBuilder, Layout, LineStyle, MarkerStyle, Series, Shape,
    SliderStep,
};
use crate::table::MetricTable;

pub const COL_MODEL: &str = "model_name";
pub const COL_NOISE: &str = "train_noise_prob";
pub const COL_TRAIN_ACC: &str = "Train Acc";
pub const COL_TEST_ACC: &str = "Dirty Test";

const TRAIN_COLOR: &str = "#00CED1";
const TEST_COLOR: &str = "#a83277";
const MARKER_SIZE: f64 = 15.0;
const CONNECTOR_COLOR: &str = "Black";

/// Display names assigned positionally to the sorted raw model names.
pub const DISPLAY_NAMES: [&str; 6] = [
    "ResNet 18",
    "Wide ResNet",
    "ConvNet",
    "AMDIM",
    "MoCoV2",
    "SimCLR",
];

/// Supervised models sit left of this x position, SSS algorithms right of it.
const DIVIDER_X: f64 = 2.5;

/// All traces belonging to one noise level, in draw order: Train scatter,
/// Test scatter, then one connector per model present at this level.
#[derive(Debug, Clone)]
pub struct NoiseGroup {
    pub noise: f64,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone)]
struct SweepRow {
    noise: f64,
    display: String,
    train_acc: f64,
    test_acc: f64,
}

fn sweep_rows(table: &MetricTable) -> Result<Vec<SweepRow>> {
    let models = table.text(COL_MODEL)?;
    let noises = table.numeric(COL_NOISE)?;
    let train = table.numeric(COL_TRAIN_ACC)?;
    let test = table.numeric(COL_TEST_ACC)?;

    let sorted_names: Vec<String> = models
        .iter()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    if sorted_names.len() > DISPLAY_NAMES.len() {
        return Err(anyhow!(
            "{} distinct models, display mapping covers {}",
            sorted_names.len(),
            DISPLAY_NAMES.len()
        ));
    }
    let display_of = |raw: &str| -> String {
        sorted_names
            .iter()
            .position(|n| n == raw)
            .map(|i| DISPLAY_NAMES[i].to_string())
            .unwrap_or_else(|| raw.to_string())
    };

    let mut rows: Vec<SweepRow> = models
        .iter()
        .zip(&noises)
        .zip(train.iter().zip(&test))
        .map(|((model, noise), (train_acc, test_acc))| SweepRow {
            noise: *noise,
            display: display_of(model),
            train_acc: *train_acc,
            test_acc: *test_acc,
        })
        .collect();
    // Same ordering the source data is presented in: noise first, then model
    rows.sort_by(|a, b| {
        a.noise
            .partial_cmp(&b.noise)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.display.cmp(&b.display))
    });
    Ok(rows)
}

fn distinct_noise_levels(rows: &[SweepRow]) -> Vec<f64> {
    let mut levels: Vec<f64> = Vec::new();
    for row in rows {
        if levels.last().map(|l| *l != row.noise).unwrap_or(true) {
            levels.push(row.noise);
        }
    }
    levels
}

/// Build one trace group per distinct noise level. All traces start hidden;
/// figure assembly decides the initial visible group.
pub fn build_noise_groups(table: &MetricTable) -> Result<Vec<NoiseGroup>> {
    let rows = sweep_rows(table)?;
    let levels = distinct_noise_levels(&rows);

    let mut groups = Vec::with_capacity(levels.len());
    for noise in levels {
        let level_rows: Vec<&SweepRow> = rows.iter().filter(|r| r.noise == noise).collect();
        let xs: Vec<Coord> = level_rows
            .iter()
            .map(|r| Coord::Label(r.display.clone()))
            .collect();

        let mut series = Vec::with_capacity(2 + level_rows.len());
        series.push(
            Series::markers(xs.clone(), level_rows.iter().map(|r| r.train_acc).collect())
                .with_marker(MarkerStyle {
                    size: MARKER_SIZE,
                    color: TRAIN_COLOR.to_string(),
                })
                .named("Train")
                .hidden(),
        );
        series.push(
            Series::markers(xs, level_rows.iter().map(|r| r.test_acc).collect())
                .with_marker(MarkerStyle {
                    size: MARKER_SIZE,
                    color: TEST_COLOR.to_string(),
                })
                .named("Test")
                .hidden(),
        );
        for row in &level_rows {
            series.push(
                Series::lines(
                    vec![
                        Coord::Label(row.display.clone()),
                        Coord::Label(row.display.clone()),
                    ],
                    vec![row.test_acc, row.train_acc],
                )
                .with_line(LineStyle::solid(3.0, CONNECTOR_COLOR))
                .legend(false)
                .hidden(),
            );
        }
        groups.push(NoiseGroup { noise, series });
    }
    Ok(groups)
}

/// Visibility over the flattened trace list: true exactly for the traces the
/// selected group owns. With the full model set this reproduces the stride-8
/// layout (2 scatter + 6 connectors per level).
pub fn visibility_mask(groups: &[NoiseGroup], selected: usize) -> Vec<bool> {
    groups
        .iter()
        .enumerate()
        .flat_map(|(i, g)| std::iter::repeat(i == selected).take(g.series.len()))
        .collect()
}

fn step_title(noise: f64) -> String {
    format!("Generalization gap (noise = {:.2})", noise)
}

/// One slider step per noise level, each carrying its own visibility mask.
pub fn slider_steps(groups: &[NoiseGroup]) -> Vec<SliderStep> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| SliderStep {
            label: format!("{}", g.noise),
            title: step_title(g.noise),
            visible: visibility_mask(groups, i),
        })
        .collect()
}

/// Assemble the sweep figure: flattened groups (first level visible), slider
/// steps, the supervised/SSS divider, and flanking annotations.
pub fn build_sweep_figure(table: &MetricTable) -> Result<Figure> {
    let groups = build_noise_groups(table)?;
    let steps = slider_steps(&groups);
    let first_visible = visibility_mask(&groups, 0);
    let initial_noise = groups.first().map(|g| g.noise).unwrap_or(0.0);

    let flattened = groups
        .into_iter()
        .flat_map(|g| g.series)
        .zip(&first_visible)
        .map(|(mut s, visible)| {
            s.visible = *visible;
            s
        });

    Ok(FigureBuilder::new()
        .extend(flattened)
        .slider(steps)
        .layout(Layout {
            title: Some(step_title(initial_noise)),
            font_size: Some(16.0),
            annotations: vec![
                Annotation {
                    x: 0.1,
                    y: 1.1,
                    text: "End-to-end Supervision".to_string(),
                },
                Annotation {
                    x: 0.9,
                    y: 1.1,
                    text: "SSS algorithms".to_string(),
                },
            ],
            shapes: vec![Shape {
                x0: DIVIDER_X,
                y0: 0.0,
                x1: DIVIDER_X,
                y1: 110.0,
                line: LineStyle::dotted(3.0, "Grey"),
            }],
            ..Layout::default()
        })
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep_table(models: &[&str], noises: &[f64]) -> MetricTable {
        let mut csv = String::from("model_name,train_noise_prob,Train Acc,Dirty Test\n");
        for noise in noises {
            for (i, model) in models.iter().enumerate() {
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    model,
                    noise,
                    95.0 - i as f64,
                    80.0 - i as f64
                ));
            }
        }
        MetricTable::parse_csv(&csv).unwrap()
    }

    #[test]
    fn test_group_per_noise_level() {
        let table = sweep_table(&["m1", "m2"], &[0.0, 0.1, 0.2]);
        let groups = build_noise_groups(&table).unwrap();
        assert_eq!(groups.len(), 3);
        // 2 scatter + 2 connectors per level
        for g in &groups {
            assert_eq!(g.series.len(), 4);
        }
    }

    #[test]
    fn test_scatter_named_connectors_silent() {
        let table = sweep_table(&["m1", "m2"], &[0.0]);
        let groups = build_noise_groups(&table).unwrap();
        let g = &groups[0];
        assert_eq!(g.series[0].name.as_deref(), Some("Train"));
        assert_eq!(g.series[1].name.as_deref(), Some("Test"));
        assert!(g.series[2..].iter().all(|s| !s.show_legend));
    }

    #[test]
    fn test_display_name_mapping_is_positional_over_sorted_names() {
        // Sorted raw order: a_model, b_model → ResNet 18, Wide ResNet
        let table = sweep_table(&["b_model", "a_model"], &[0.0]);
        let groups = build_noise_groups(&table).unwrap();
        let xs = &groups[0].series[0].x;
        assert_eq!(xs[0], Coord::Label("ResNet 18".to_string()));
        assert_eq!(xs[1], Coord::Label("Wide ResNet".to_string()));
    }

    #[test]
    fn test_connector_spans_test_to_train() {
        let table = sweep_table(&["m1"], &[0.0]);
        let groups = build_noise_groups(&table).unwrap();
        let connector = &groups[0].series[2];
        assert_eq!(connector.y, vec![80.0, 95.0]);
        assert_eq!(connector.x[0], connector.x[1]);
    }

    #[test]
    fn test_slider_step_titles() {
        let table = sweep_table(&["m1"], &[0.0, 0.15]);
        let groups = build_noise_groups(&table).unwrap();
        let steps = slider_steps(&groups);
        assert_eq!(steps[1].title, "Generalization gap (noise = 0.15)");
        assert_eq!(steps[1].label, "0.15");
    }

    #[test]
    fn test_figure_first_group_visible() {
        let table = sweep_table(&["m1", "m2"], &[0.0, 0.1]);
        let fig = build_sweep_figure(&table).unwrap();
        assert!(fig.series[..4].iter().all(|s| s.visible));
        assert!(fig.series[4..].iter().all(|s| !s.visible));
        assert_eq!(fig.slider.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_too_many_models_rejected() {
        let models = ["m1", "m2", "m3", "m4", "m5", "m6", "m7"];
        let table = sweep_table(&models, &[0.0]);
        assert!(build_noise_groups(&table).is_err());
    }
}
