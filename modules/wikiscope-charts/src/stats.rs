//! Descriptive statistics for the slice path: the 99th-percentile outlier
//! table and the word-count summary.

use serde::Serialize;

use wikiscope_common::SliceRecord;

/// Percentile above which an article counts as an outlier.
pub const OUTLIER_PERCENTILE: f64 = 99.0;

/// Linear-interpolation percentile over the order statistics. `None` on an
/// empty input or a percentile outside 0..=100.
pub fn percentile(values: &[i64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo] as f64);
    }
    let weight = rank - lo as f64;
    Some(sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * weight)
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierRow {
    pub title: String,
    pub word_count: i64,
    pub year: Option<i32>,
}

/// Articles whose word count strictly exceeds the outlier threshold,
/// descending by word count.
#[derive(Debug, Clone, Serialize)]
pub struct OutlierTable {
    pub threshold: f64,
    pub rows: Vec<OutlierRow>,
}

/// `None` only when there is no data to take a percentile of. A loaded set
/// with no outliers is a table with zero rows.
pub fn outlier_table(records: &[SliceRecord]) -> Option<OutlierTable> {
    let counts: Vec<i64> = records.iter().map(|r| r.word_count).collect();
    let threshold = percentile(&counts, OUTLIER_PERCENTILE)?;

    let mut rows: Vec<OutlierRow> = records
        .iter()
        .filter(|r| (r.word_count as f64) > threshold)
        .map(|r| OutlierRow {
            title: r.title.clone(),
            word_count: r.word_count,
            year: r.year,
        })
        .collect();
    rows.sort_by(|a, b| b.word_count.cmp(&a.word_count));

    Some(OutlierTable { threshold, rows })
}

#[derive(Debug, Clone, Serialize)]
pub struct WordCountSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two rows.
    pub std: Option<f64>,
    pub min: i64,
    pub median: f64,
    pub max: i64,
}

pub fn word_count_summary(records: &[SliceRecord]) -> Option<WordCountSummary> {
    if records.is_empty() {
        return None;
    }
    let counts: Vec<i64> = records.iter().map(|r| r.word_count).collect();
    let n = counts.len();
    let mean = counts.iter().sum::<i64>() as f64 / n as f64;

    let std = (n >= 2).then(|| {
        let variance = counts
            .iter()
            .map(|c| {
                let d = *c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / (n - 1) as f64;
        variance.sqrt()
    });

    Some(WordCountSummary {
        count: n,
        mean,
        std,
        min: *counts.iter().min().unwrap(),
        median: percentile(&counts, 50.0).unwrap(),
        max: *counts.iter().max().unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, word_count: i64) -> SliceRecord {
        SliceRecord {
            title: title.to_string(),
            text_clean: None,
            word_count,
            text_len: None,
            timestamp: None,
            year: None,
            hour: None,
            day_of_week: None,
        }
    }

    // --- percentile tests ---

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values: Vec<i64> = (1..=100).collect();
        // rank 0.99 * 99 = 98.01, between 99 and 100
        assert!((percentile(&values, 99.0).unwrap() - 99.01).abs() < 1e-9);
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 100.0), Some(100.0));
    }

    #[test]
    fn percentile_handles_degenerate_inputs() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[7], 99.0), Some(7.0));
        assert_eq!(percentile(&[1, 2], 150.0), None);
    }

    #[test]
    fn percentile_does_not_depend_on_input_order() {
        let ordered: Vec<i64> = (1..=50).collect();
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        assert_eq!(percentile(&ordered, 75.0), percentile(&shuffled, 75.0));
    }

    // --- outlier table tests ---

    #[test]
    fn uniform_range_has_exactly_one_outlier() {
        let records: Vec<SliceRecord> =
            (1..=100).map(|i| record(&format!("a{i}"), i)).collect();
        let table = outlier_table(&records).unwrap();
        // threshold 99.01; only 100 strictly exceeds it
        assert!((table.threshold - 99.01).abs() < 1e-9);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].word_count, 100);
    }

    #[test]
    fn outliers_sort_descending() {
        let mut records: Vec<SliceRecord> = (1..=200).map(|i| record(&format!("a{i}"), i)).collect();
        records.push(record("giant", 10_000));
        let table = outlier_table(&records).unwrap();
        assert!(table.rows.len() >= 2);
        assert!(table
            .rows
            .windows(2)
            .all(|w| w[0].word_count >= w[1].word_count));
        assert_eq!(table.rows[0].title, "giant");
    }

    #[test]
    fn empty_records_have_no_outlier_table() {
        assert!(outlier_table(&[]).is_none());
    }

    #[test]
    fn identical_counts_have_no_outliers() {
        let records = vec![record("a", 50), record("b", 50), record("c", 50)];
        let table = outlier_table(&records).unwrap();
        assert_eq!(table.threshold, 50.0);
        assert!(table.rows.is_empty(), "nothing strictly exceeds 50");
    }

    // --- summary tests ---

    #[test]
    fn summary_over_known_values() {
        let records = vec![record("a", 2), record("b", 4), record("c", 6)];
        let summary = word_count_summary(&records).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 4.0).abs() < 1e-9);
        assert_eq!(summary.min, 2);
        assert!((summary.median - 4.0).abs() < 1e-9);
        assert_eq!(summary.max, 6);
        // sample std of [2, 4, 6] is 2
        assert!((summary.std.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn single_row_summary_has_no_std() {
        let summary = word_count_summary(&[record("only", 9)]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.std, None);
        assert!((summary.median - 9.0).abs() < 1e-9);
    }

    #[test]
    fn empty_records_have_no_summary() {
        assert!(word_count_summary(&[]).is_none());
    }
}
