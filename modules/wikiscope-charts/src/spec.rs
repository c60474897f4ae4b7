//! Chart-specification value objects.
//!
//! Builders produce these; a separate rendering layer (browser-side Plotly)
//! consumes their JSON form. Keeping the specification side-effect-free
//! means every chart is unit-testable without a rendering environment.

use serde::Serialize;

/// Layout constants shared by every chart: transparent backgrounds, Arial
/// 12, tight margins. The page supplies its own surface.
#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub font_family: &'static str,
    pub font_size: u32,
    pub margin: Margin,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            plot_bgcolor: "rgba(0,0,0,0)",
            paper_bgcolor: "rgba(0,0,0,0)",
            font_family: "Arial",
            font_size: 12,
            margin: Margin {
                l: 10,
                r: 10,
                t: 40,
                b: 10,
            },
        }
    }
}

/// One renderable chart. The `kind` tag tells the rendering layer which
/// trace type to build.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarSpec),
    Histogram(HistogramSpec),
    Scatter(ScatterSpec),
    Violin(ViolinSpec),
    Heatmap(HeatmapSpec),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar(s) => &s.title,
            ChartSpec::Histogram(s) => &s.title,
            ChartSpec::Scatter(s) => &s.title,
            ChartSpec::Violin(s) => &s.title,
            ChartSpec::Heatmap(s) => &s.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Where bar value labels render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    Inside,
    Outside,
}

/// Bar chart, one bar per category, value and color both keyed to `values`.
#[derive(Debug, Clone, Serialize)]
pub struct BarSpec {
    pub title: String,
    pub orientation: Orientation,
    pub categories: Vec<String>,
    pub values: Vec<i64>,
    pub text_position: TextPosition,
    pub color_scale: &'static str,
    /// Plotly category-axis ordering, e.g. "total ascending".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_order: Option<&'static str>,
    pub layout: ChartLayout,
}

/// Fixed tick positions and labels for a log-scaled axis.
#[derive(Debug, Clone, Serialize)]
pub struct AxisTicks {
    pub values: Vec<u64>,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramSpec {
    pub title: String,
    pub values: Vec<i64>,
    pub bins: u32,
    pub bar_color: &'static str,
    pub bar_gap: f64,
    pub log_y: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_ticks: Option<AxisTicks>,
    pub layout: ChartLayout,
}

/// One point per article; `y` keeps nulls so missing text_len renders as a
/// gap instead of dropping the row.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x: Vec<i64>,
    pub y: Vec<Option<i64>>,
    pub color: Vec<i64>,
    pub hover: Vec<String>,
    pub color_scale: &'static str,
    pub layout: ChartLayout,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViolinSpec {
    pub title: String,
    pub values: Vec<i64>,
    pub show_box: bool,
    pub show_points: bool,
    pub layout: ChartLayout,
}

/// Day-of-week by hour-of-day count matrix. `rows` and `columns` label the
/// matrix; every cell is present even when zero.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapSpec {
    pub title: String,
    pub rows: Vec<&'static str>,
    pub columns: Vec<u32>,
    pub matrix: Vec<Vec<u64>>,
    pub color_scale: &'static str,
    pub layout: ChartLayout,
}
