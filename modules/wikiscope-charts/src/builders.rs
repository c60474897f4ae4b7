//! Chart builders: pure, total functions from derived data to a chart
//! specification. `None` means "not enough data to render", never an error.

use wikiscope_common::normalize::WEEKDAY_LABELS;
use wikiscope_common::{SliceRecord, TopArticle, YearCount};

use crate::spec::{
    AxisTicks, BarSpec, ChartLayout, ChartSpec, HeatmapSpec, HistogramSpec, Orientation,
    ScatterSpec, TextPosition, ViolinSpec,
};

/// Rows at or above this word count are excluded from the default
/// distribution view.
pub const OUTLIER_WORD_LIMIT: i64 = 5000;
pub const HISTOGRAM_BINS: u32 = 50;

const HISTOGRAM_COLOR: &str = "#00CC96";
const HISTOGRAM_BAR_GAP: f64 = 0.1;
const LOG_TICK_VALUES: [u64; 5] = [1, 10, 100, 1_000, 10_000];
const LOG_TICK_LABELS: [&str; 5] = ["1", "10", "100", "1k", "10k"];

/// Article count per year, ascending, value labels outside the bars.
pub fn articles_over_time(years: &[YearCount]) -> Option<ChartSpec> {
    if years.is_empty() {
        return None;
    }
    Some(ChartSpec::Bar(BarSpec {
        title: "Xu hướng bài viết theo năm".to_string(),
        orientation: Orientation::Vertical,
        categories: years.iter().map(|y| y.year.to_string()).collect(),
        values: years.iter().map(|y| y.count as i64).collect(),
        text_position: TextPosition::Outside,
        color_scale: "Blues",
        category_order: None,
        layout: ChartLayout::default(),
    }))
}

/// Horizontal leaderboard of the longest articles. Total-ascending category
/// order puts the longest bar on top when rendered.
pub fn top_longest(top: &[TopArticle]) -> Option<ChartSpec> {
    if top.is_empty() {
        return None;
    }
    Some(ChartSpec::Bar(BarSpec {
        title: "Top 10 bài dài nhất".to_string(),
        orientation: Orientation::Horizontal,
        categories: top.iter().map(|t| t.title.clone()).collect(),
        values: top.iter().map(|t| t.word_count).collect(),
        text_position: TextPosition::Inside,
        color_scale: "Viridis",
        category_order: Some("total ascending"),
        layout: ChartLayout::default(),
    }))
}

/// Word-count histogram. Default mode filters out rows at or above the
/// outlier limit and uses a linear y-axis; outlier mode keeps everything and
/// switches to a log y-axis with fixed ticks. `None` when nothing survives
/// the filter.
pub fn word_count_distribution(word_counts: &[i64], show_outliers: bool) -> Option<ChartSpec> {
    let (values, title, log_y): (Vec<i64>, &str, bool) = if show_outliers {
        (word_counts.to_vec(), "Phân bố độ dài (Log Scale)", true)
    } else {
        (
            word_counts
                .iter()
                .copied()
                .filter(|wc| *wc < OUTLIER_WORD_LIMIT)
                .collect(),
            "Phân bố độ dài (< 5000 từ)",
            false,
        )
    };
    if values.is_empty() {
        return None;
    }
    Some(ChartSpec::Histogram(HistogramSpec {
        title: title.to_string(),
        values,
        bins: HISTOGRAM_BINS,
        bar_color: HISTOGRAM_COLOR,
        bar_gap: HISTOGRAM_BAR_GAP,
        log_y,
        y_ticks: log_y.then(|| AxisTicks {
            values: LOG_TICK_VALUES.to_vec(),
            labels: LOG_TICK_LABELS.to_vec(),
        }),
        layout: ChartLayout::default(),
    }))
}

/// word_count against text_len, one point per article, title on hover.
/// Missing text_len stays a null point.
pub fn length_scatter(records: &[SliceRecord]) -> Option<ChartSpec> {
    if records.is_empty() {
        return None;
    }
    Some(ChartSpec::Scatter(ScatterSpec {
        title: "Tương quan số từ và độ dài văn bản".to_string(),
        x: records.iter().map(|r| r.word_count).collect(),
        y: records.iter().map(|r| r.text_len).collect(),
        color: records.iter().map(|r| r.word_count).collect(),
        hover: records.iter().map(|r| r.title.clone()).collect(),
        color_scale: "Viridis",
        layout: ChartLayout::default(),
    }))
}

/// Full word-count distribution as a violin with embedded box plot and all
/// points shown.
pub fn word_count_violin(records: &[SliceRecord]) -> Option<ChartSpec> {
    if records.is_empty() {
        return None;
    }
    Some(ChartSpec::Violin(ViolinSpec {
        title: "Phân bố số từ (Violin)".to_string(),
        values: records.iter().map(|r| r.word_count).collect(),
        show_box: true,
        show_points: true,
        layout: ChartLayout::default(),
    }))
}

/// 7x24 article-count matrix, weekday rows Monday first with Sunday last,
/// hour columns 0-23 all present. Records without a timestamp carry no
/// calendar bucket and are left out of the counting.
pub fn weekday_hour_heatmap(records: &[SliceRecord]) -> Option<ChartSpec> {
    if records.is_empty() {
        return None;
    }
    let mut matrix = vec![vec![0u64; 24]; WEEKDAY_LABELS.len()];
    for record in records {
        let (Some(day), Some(hour)) = (record.day_of_week, record.hour) else {
            continue;
        };
        if let Some(row) = WEEKDAY_LABELS.iter().position(|label| *label == day) {
            matrix[row][hour as usize] += 1;
        }
    }
    Some(ChartSpec::Heatmap(HeatmapSpec {
        title: "Mật độ bài viết theo thứ và giờ".to_string(),
        rows: WEEKDAY_LABELS.to_vec(),
        columns: (0..24).collect(),
        matrix,
        color_scale: "Blues",
        layout: ChartLayout::default(),
    }))
}
