//! Decomposition view: stacked area fills for the gap components, the clipped
//! Theorem II bound overlay, per-row connector strokes, the empirical RRM
//! bound, and the generalization-gap identity line.

use anyhow::Result;

use crate::decompose::{compute_bound, connector_segments, stack, Component, CumulativeSeries};
use crate::series::{
    rgba, Coord, Figure, FigureBuilder, Layout, LineStyle, MarkerStyle, Mode, Series,
};
use crate::table::MetricTable;

pub const COL_MEMORIZATION: &str = "Memorization";
pub const COL_RATIONALITY: &str = "Rationality";
pub const COL_ROBUSTNESS: &str = "Robustness";
pub const COL_GEN_GAP: &str = "Generalization Gap";
pub const COL_THEOREM_BOUND: &str = "Theorem II bound";

// Paper palette
const C_MEMORIZATION: &str = "#F36D44";
const SHADE_MEMORIZATION: &str = "#F3D19D";
const C_RATIONALITY: &str = "#F9E378";
const SHADE_RATIONALITY: &str = "#FCFDBD";
const C_ROBUSTNESS: &str = "#49AD67";
const SHADE_ROBUSTNESS: &str = "#C9E6A6";
const C_BOUND: &str = "#5EA8B1";
const C_RRM: &str = "#4B7F69";
const C_GREY: &str = "#666666";

const BOUND_FILL_ALPHA: f64 = 0.1;

/// The three gap components in stack order. Order is load-bearing: it fixes
/// stack order, color assignment, and the additive bound.
pub fn gap_components(table: &MetricTable) -> Result<Vec<Component>> {
    Ok(vec![
        Component::new(
            "Memorization Gap",
            table.numeric(COL_MEMORIZATION)?,
            C_MEMORIZATION,
            SHADE_MEMORIZATION,
        ),
        Component::new(
            "Rationality Gap",
            table.numeric(COL_RATIONALITY)?,
            C_RATIONALITY,
            SHADE_RATIONALITY,
        ),
        Component::new(
            "Robustness Gap",
            table.numeric(COL_ROBUSTNESS)?,
            C_ROBUSTNESS,
            SHADE_ROBUSTNESS,
        ),
    ])
}

fn area_series(xs: &[f64], cumulative: &CumulativeSeries) -> Series {
    Series::lines(
        xs.iter().map(|x| Coord::Num(*x)).collect(),
        cumulative.totals.clone(),
    )
    .with_line(LineStyle::solid(0.0, &cumulative.shade))
    .fill_to_previous(&cumulative.shade)
    .legend(false)
}

fn connector_series(
    xs: &[f64],
    previous: &[f64],
    cumulative: &CumulativeSeries,
) -> Result<Vec<Series>> {
    let segments = connector_segments(xs, previous, &cumulative.totals)?;
    Ok(segments
        .into_iter()
        .map(|seg| {
            let series = Series::lines(
                vec![Coord::Num(seg.x), Coord::Num(seg.x)],
                vec![seg.y0, seg.y1],
            )
            .with_line(LineStyle::solid(3.0, &cumulative.color));
            if seg.show_legend {
                series.named(&cumulative.name)
            } else {
                series.legend(false)
            }
        })
        .collect())
}

/// Build the full decomposition figure from a (possibly filtered) table.
/// Trace order matters to the front-end: fills, bound, connectors, RRM line,
/// identity line.
pub fn build_decomposition_figure(table: &MetricTable) -> Result<Figure> {
    let gen_gap = table.numeric(COL_GEN_GAP)?;
    let components = gap_components(table)?;
    let stacked = stack(&components)?;
    let bound = compute_bound(
        &table.numeric(COL_ROBUSTNESS)?,
        &table.numeric(COL_RATIONALITY)?,
        &table.numeric(COL_THEOREM_BOUND)?,
    )?;

    let mut builder = FigureBuilder::new();
    for cumulative in &stacked {
        builder = builder.push(area_series(&gen_gap, cumulative));
    }

    let xs: Vec<Coord> = gen_gap.iter().map(|x| Coord::Num(*x)).collect();
    builder = builder.push(
        Series::new(xs.clone(), bound, Mode::LinesMarkers)
            .with_line(LineStyle::solid(0.0, C_BOUND))
            .with_marker(MarkerStyle {
                size: 5.0,
                color: C_BOUND.to_string(),
            })
            .fill_to_previous(&rgba(C_BOUND, BOUND_FILL_ALPHA)?)
            .named("Theorem II Bound"),
    );

    let zeros = vec![0.0; gen_gap.len()];
    for (i, cumulative) in stacked.iter().enumerate() {
        let previous = if i == 0 {
            &zeros
        } else {
            &stacked[i - 1].totals
        };
        builder = builder.extend(connector_series(&gen_gap, previous, cumulative)?);
    }

    if let Some(last) = stacked.last() {
        builder = builder.push(
            Series::lines(xs.clone(), last.totals.clone())
                .with_line(LineStyle::solid(1.8, C_RRM))
                .named("Empirical RRM Bound"),
        );
    }

    builder = builder.push(
        Series::lines(xs, gen_gap.clone())
            .with_line(LineStyle::dashed(1.8, C_GREY))
            .named("Generalization Gap"),
    );

    Ok(builder
        .layout(Layout {
            x_title: Some(COL_GEN_GAP.to_string()),
            y_title: Some("value".to_string()),
            y_range: Some([-0.01, 60.0]),
            template: Some("ggplot2".to_string()),
            font_size: Some(18.0),
            ..Layout::default()
        })
        .build())
}
