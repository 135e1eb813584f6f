//! Stacked decomposition arithmetic: cumulative component sums, the clipped
//! theoretical bound, and the vertical connector segments drawn over the fill.
//!
//! Everything here is a pure function over row-aligned series; the figure
//! layer re-runs it from scratch on every filter change.

use anyhow::{anyhow, Result};

/// The bound never reports above this; ties truncate.
pub const BOUND_CEILING: f64 = 100.0;

/// One named gap component with its stack colors. Order in the component list
/// determines stack order, which is part of the contract.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub values: Vec<f64>,
    pub color: String,
    pub shade: String,
}

impl Component {
    pub fn new(name: &str, values: Vec<f64>, color: &str, shade: &str) -> Self {
        Self {
            name: name.to_string(),
            values,
            color: color.to_string(),
            shade: shade.to_string(),
        }
    }
}

/// Running totals for one component: `totals[i]` is the sum of this and every
/// earlier component at row `i`.
#[derive(Debug, Clone)]
pub struct CumulativeSeries {
    pub name: String,
    pub color: String,
    pub shade: String,
    pub totals: Vec<f64>,
}

/// Cumulative stacked sums, in component order. All component series must be
/// row-aligned; a length mismatch is an error, not a truncation.
pub fn stack(components: &[Component]) -> Result<Vec<CumulativeSeries>> {
    let rows = match components.first() {
        Some(c) => c.values.len(),
        None => return Ok(Vec::new()),
    };

    let mut running = vec![0.0; rows];
    let mut out = Vec::with_capacity(components.len());
    for component in components {
        if component.values.len() != rows {
            return Err(anyhow!(
                "component '{}' has {} rows, expected {}",
                component.name,
                component.values.len(),
                rows
            ));
        }
        for (total, v) in running.iter_mut().zip(&component.values) {
            *total += v;
        }
        out.push(CumulativeSeries {
            name: component.name.clone(),
            color: component.color.clone(),
            shade: component.shade.clone(),
            totals: running.clone(),
        });
    }
    Ok(out)
}

/// Elementwise `min(BOUND_CEILING, robustness + rationality + theorem_bound)`.
pub fn compute_bound(
    robustness: &[f64],
    rationality: &[f64],
    theorem_bound: &[f64],
) -> Result<Vec<f64>> {
    if robustness.len() != rationality.len() || robustness.len() != theorem_bound.len() {
        return Err(anyhow!(
            "bound inputs not row-aligned: {} / {} / {}",
            robustness.len(),
            rationality.len(),
            theorem_bound.len()
        ));
    }
    Ok(robustness
        .iter()
        .zip(rationality)
        .zip(theorem_bound)
        .map(|((r, ra), t)| (r + ra + t).min(BOUND_CEILING))
        .collect())
}

/// A vertical stroke from the previous cumulative level to the new one at a
/// single x position. Only the first segment of a component's group labels the
/// legend; the rest stay silent so the legend shows each component once.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalSegment {
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
    pub show_legend: bool,
}

/// Per-row vertical segments between two cumulative levels, row-aligned with
/// `xs`.
pub fn connector_segments(
    xs: &[f64],
    old_cumulative: &[f64],
    new_cumulative: &[f64],
) -> Result<Vec<VerticalSegment>> {
    if xs.len() != old_cumulative.len() || xs.len() != new_cumulative.len() {
        return Err(anyhow!(
            "connector inputs not row-aligned: {} / {} / {}",
            xs.len(),
            old_cumulative.len(),
            new_cumulative.len()
        ));
    }
    Ok(xs
        .iter()
        .zip(old_cumulative)
        .zip(new_cumulative)
        .enumerate()
        .map(|(i, ((x, y0), y1))| VerticalSegment {
            x: *x,
            y0: *y0,
            y1: *y1,
            show_legend: i == 0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_components() -> Vec<Component> {
        vec![
            Component::new("Memorization Gap", vec![1.0, 2.0], "#F36D44", "#F3D19D"),
            Component::new("Rationality Gap", vec![3.0, 4.0], "#F9E378", "#FCFDBD"),
            Component::new("Robustness Gap", vec![5.0, 6.0], "#49AD67", "#C9E6A6"),
        ]
    }

    #[test]
    fn test_stack_staircase() {
        let stacked = stack(&three_components()).unwrap();
        assert_eq!(stacked[0].totals, vec![1.0, 3.0]);
        assert_eq!(stacked[1].totals, vec![4.0, 7.0]);
        assert_eq!(stacked[2].totals, vec![9.0, 13.0]);
    }

    #[test]
    fn test_stack_nondecreasing_for_nonnegative_components() {
        let stacked = stack(&three_components()).unwrap();
        for pair in stacked.windows(2) {
            for (lo, hi) in pair[0].totals.iter().zip(&pair[1].totals) {
                assert!(hi >= lo);
            }
        }
    }

    #[test]
    fn test_stack_preserves_order_and_colors() {
        let stacked = stack(&three_components()).unwrap();
        let names: Vec<&str> = stacked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Memorization Gap", "Rationality Gap", "Robustness Gap"]
        );
        assert_eq!(stacked[0].color, "#F36D44");
        assert_eq!(stacked[2].shade, "#C9E6A6");
    }

    #[test]
    fn test_stack_rejects_misaligned_rows() {
        let mut components = three_components();
        components[1].values.pop();
        assert!(stack(&components).is_err());
    }

    #[test]
    fn test_stack_empty_input() {
        assert!(stack(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_bound_clips_at_ceiling() {
        let bound = compute_bound(&[10.0], &[10.0], &[90.0]).unwrap();
        assert_eq!(bound, vec![100.0]);
    }

    #[test]
    fn test_bound_below_ceiling_untouched() {
        let bound = compute_bound(&[10.0, 5.0], &[10.0, 5.0], &[20.0, 1.0]).unwrap();
        assert_eq!(bound, vec![40.0, 11.0]);
    }

    #[test]
    fn test_bound_idempotent_and_capped() {
        let once = compute_bound(&[60.0, 1.0], &[50.0, 2.0], &[80.0, 3.0]).unwrap();
        let zeros = vec![0.0; once.len()];
        let twice = compute_bound(&once, &zeros, &zeros).unwrap();
        assert_eq!(once, twice);
        assert!(once.iter().all(|v| *v <= BOUND_CEILING));
    }

    #[test]
    fn test_bound_rejects_misaligned_rows() {
        assert!(compute_bound(&[1.0], &[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_connectors_first_carries_legend() {
        let segs = connector_segments(&[0.5, 1.5, 2.5], &[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert_eq!(segs.len(), 3);
        assert!(segs[0].show_legend);
        assert!(!segs[1].show_legend);
        assert!(!segs[2].show_legend);
        assert_eq!(segs[1].x, 1.5);
        assert_eq!(segs[1].y0, 1.0);
        assert_eq!(segs[1].y1, 3.0);
    }

    #[test]
    fn test_connectors_reject_misaligned_rows() {
        assert!(connector_segments(&[1.0], &[0.0, 0.0], &[1.0]).is_err());
    }
}
