//! The slider's trace-visibility contract: each noise level owns its trace
//! group, and with the full model set the flattened layout reproduces the
//! stride-8 positions the front-end was built around.

use gapboard::source::{DatasetSource, FixedSource, NOISE_DATASET};
use gapboard::sweep::{
    build_noise_groups, build_sweep_figure, slider_steps, visibility_mask, DISPLAY_NAMES,
};
use gapboard::table::MetricTable;

fn full_sweep_csv(noise_levels: &[f64]) -> String {
    let models = ["amdim", "convnet", "mocov2", "resnet18", "simclr", "wrn"];
    let mut csv = String::from("model_name,train_noise_prob,Train Acc,Dirty Test\n");
    for noise in noise_levels {
        for (i, model) in models.iter().enumerate() {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                model,
                noise,
                98.0 - i as f64,
                90.0 - 20.0 * noise - i as f64
            ));
        }
    }
    csv
}

#[test]
fn six_models_give_groups_of_eight() {
    let table = MetricTable::parse_csv(&full_sweep_csv(&[0.0, 0.1, 0.2, 0.5])).unwrap();
    let groups = build_noise_groups(&table).unwrap();
    assert_eq!(groups.len(), 4);
    for g in &groups {
        assert_eq!(g.series.len(), 8, "2 scatter + 6 connectors");
    }
}

#[test]
fn selected_level_two_lights_offsets_sixteen_through_twentythree() {
    let table = MetricTable::parse_csv(&full_sweep_csv(&[0.0, 0.1, 0.2, 0.5])).unwrap();
    let groups = build_noise_groups(&table).unwrap();
    let mask = visibility_mask(&groups, 2);
    assert_eq!(mask.len(), 32);
    for (offset, visible) in mask.iter().enumerate() {
        let expected = (16..=23).contains(&offset);
        assert_eq!(
            *visible, expected,
            "offset {} expected visible={}",
            offset, expected
        );
    }
}

#[test]
fn every_step_lights_exactly_its_own_group() {
    let table = MetricTable::parse_csv(&full_sweep_csv(&[0.0, 0.1, 0.2])).unwrap();
    let groups = build_noise_groups(&table).unwrap();
    let steps = slider_steps(&groups);
    assert_eq!(steps.len(), 3);
    for (i, step) in steps.iter().enumerate() {
        let lit: usize = step.visible.iter().filter(|v| **v).count();
        assert_eq!(lit, groups[i].series.len());
        let first_lit = step.visible.iter().position(|v| *v).unwrap();
        let group_start: usize = groups[..i].iter().map(|g| g.series.len()).sum();
        assert_eq!(first_lit, group_start);
    }
}

#[test]
fn missing_model_shortens_only_its_own_group() {
    // Drop one model from the middle noise level; other levels keep stride 8
    let mut csv = full_sweep_csv(&[0.0, 0.1, 0.2]);
    let dropped: String = csv
        .lines()
        .filter(|l| !(l.starts_with("mocov2,0.1,")))
        .map(|l| format!("{}\n", l))
        .collect();
    csv = dropped;

    let table = MetricTable::parse_csv(&csv).unwrap();
    let groups = build_noise_groups(&table).unwrap();
    assert_eq!(groups[0].series.len(), 8);
    assert_eq!(groups[1].series.len(), 7);
    assert_eq!(groups[2].series.len(), 8);

    // The last level's group still starts right after the shortened one
    let mask = visibility_mask(&groups, 2);
    assert_eq!(mask.len(), 23);
    assert!(mask[15..].iter().all(|v| *v));
    assert!(mask[..15].iter().all(|v| !*v));
}

#[test]
fn display_names_cover_the_sorted_model_set() {
    let table = MetricTable::parse_csv(&full_sweep_csv(&[0.0])).unwrap();
    let groups = build_noise_groups(&table).unwrap();
    let train = &groups[0].series[0];
    let labels: Vec<String> = train
        .x
        .iter()
        .map(|c| match c {
            gapboard::series::Coord::Label(s) => s.clone(),
            gapboard::series::Coord::Num(v) => v.to_string(),
        })
        .collect();
    assert_eq!(labels.len(), DISPLAY_NAMES.len());
    for label in &labels {
        assert!(DISPLAY_NAMES.contains(&label.as_str()));
    }
}

#[tokio::test]
async fn sweep_view_from_fixed_source() {
    let table = MetricTable::parse_csv(&full_sweep_csv(&[0.0, 0.3])).unwrap();
    let source = FixedSource::new().with_table(NOISE_DATASET, table);

    let fetched = source.fetch(NOISE_DATASET).await.unwrap();
    let fig = build_sweep_figure(&fetched).unwrap();

    assert_eq!(fig.series.len(), 16);
    assert!(fig.series[..8].iter().all(|s| s.visible));
    assert!(fig.series[8..].iter().all(|s| !s.visible));

    let steps = fig.slider.as_ref().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].title, "Generalization gap (noise = 0.00)");
    assert_eq!(steps[1].title, "Generalization gap (noise = 0.30)");

    // Divider and annotations survive serialization
    let json = fig.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["layout"]["shapes"][0]["x0"], 2.5);
    assert_eq!(
        parsed["layout"]["annotations"][0]["text"],
        "End-to-end Supervision"
    );
}
