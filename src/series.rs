//! Drawable series and figure description handed across the presentation
//! boundary. The front-end charting library owns layout, widgets, and actual
//! rendering; this module only describes what to draw, in order.

use anyhow::{anyhow, Result};
use serde::Serialize;

/// An x value: numeric for the decomposition axis, a label for the categorical
/// model axis of the sweep view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coord {
    Num(f64),
    Label(String),
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        Coord::Num(v)
    }
}

impl From<&str> for Coord {
    fn from(s: &str) -> Self {
        Coord::Label(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl LineStyle {
    pub fn solid(width: f64, color: &str) -> Self {
        Self {
            width,
            color: color.to_string(),
            dash: None,
        }
    }

    pub fn dashed(width: f64, color: &str) -> Self {
        Self {
            width,
            color: color.to_string(),
            dash: Some("dash".to_string()),
        }
    }

    pub fn dotted(width: f64, color: &str) -> Self {
        Self {
            width,
            color: color.to_string(),
            dash: Some("dot".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerStyle {
    pub size: f64,
    pub color: String,
}

/// One drawable trace. Field names serialize to what the charting front-end
/// expects, so a figure dumps straight to its JSON wire form.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: Vec<Coord>,
    pub y: Vec<f64>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(rename = "fillcolor", skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(rename = "showlegend")]
    pub show_legend: bool,
    pub visible: bool,
}

impl Series {
    pub fn new(x: Vec<Coord>, y: Vec<f64>, mode: Mode) -> Self {
        Self {
            name: None,
            x,
            y,
            mode,
            line: None,
            marker: None,
            fill: None,
            fill_color: None,
            show_legend: false,
            visible: true,
        }
    }

    pub fn lines(x: Vec<Coord>, y: Vec<f64>) -> Self {
        Self::new(x, y, Mode::Lines)
    }

    pub fn markers(x: Vec<Coord>, y: Vec<f64>) -> Self {
        Self::new(x, y, Mode::Markers)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self.show_legend = true;
        self
    }

    pub fn with_line(mut self, line: LineStyle) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_marker(mut self, marker: MarkerStyle) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Fill down to the previously drawn series.
    pub fn fill_to_previous(mut self, color: &str) -> Self {
        self.fill = Some("tonexty".to_string());
        self.fill_color = Some(color.to_string());
        self
    }

    pub fn legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

// =============================================================================
// Layout, slider, figure
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    /// Paper coordinates, 0..1
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// A decoration line drawn in data coordinates (the sweep view's divider).
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub line: LineStyle,
}

/// One slider position: which traces are visible and what the title becomes.
#[derive(Debug, Clone, Serialize)]
pub struct SliderStep {
    pub label: String,
    pub title: String,
    pub visible: Vec<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

/// An ordered, immutable list of series plus layout and optional slider.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub layout: Layout,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slider: Option<Vec<SliderStep>>,
}

impl Figure {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow!("figure serialization: {}", e))
    }
}

/// Explicit figure assembly: the builder is consumed and returned at each step,
/// so there is no shared mutable figure object between construction calls.
#[derive(Debug, Clone, Default)]
pub struct FigureBuilder {
    layout: Layout,
    series: Vec<Series>,
    slider: Option<Vec<SliderStep>>,
}

impl FigureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn extend(mut self, series: impl IntoIterator<Item = Series>) -> Self {
        self.series.extend(series);
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn slider(mut self, steps: Vec<SliderStep>) -> Self {
        self.slider = Some(steps);
        self
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn build(self) -> Figure {
        Figure {
            layout: self.layout,
            series: self.series,
            slider: self.slider,
        }
    }
}

// =============================================================================
// Color helpers
// =============================================================================

/// Parse `#RGB` or `#RRGGBB` into components.
pub fn hex_to_rgb(hex_color: &str) -> Result<(u8, u8, u8)> {
    let stripped = hex_color.trim_start_matches('#');
    let full = match stripped.len() {
        3 => stripped.repeat(2),
        6 => stripped.to_string(),
        n => return Err(anyhow!("bad hex color '{}' (length {})", hex_color, n)),
    };
    let r = u8::from_str_radix(&full[0..2], 16)?;
    let g = u8::from_str_radix(&full[2..4], 16)?;
    let b = u8::from_str_radix(&full[4..6], 16)?;
    Ok((r, g, b))
}

/// CSS rgba() string for a hex color at the given alpha.
pub fn rgba(hex_color: &str, alpha: f64) -> Result<String> {
    let (r, g, b) = hex_to_rgb(hex_color)?;
    Ok(format!("rgba({}, {}, {}, {})", r, g, b, alpha))
}

// =============================================================================
// Tests
// =============================================================================
