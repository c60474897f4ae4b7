use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WikiscopeError;

// --- Article records ---

/// One normalized article from the overview (full-collection) path.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub title: String,
    pub text_clean: Option<String>,
    pub word_count: i64,
    pub text_len: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub year: Option<i32>,
}

/// One normalized article from the slice (recent-N) path, carrying the
/// extra time-of-day derivations the slice charts need.
#[derive(Debug, Clone, Serialize)]
pub struct SliceRecord {
    pub title: String,
    pub text_clean: Option<String>,
    pub word_count: i64,
    pub text_len: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub year: Option<i32>,
    pub hour: Option<u32>,
    pub day_of_week: Option<&'static str>,
}

// --- Aggregation artifacts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

/// Size of the longest-articles leaderboard.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopArticle {
    pub title: String,
    pub word_count: i64,
}

/// The three headline counters of the overview dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    /// Unfiltered row count of the loaded collection, independent of any
    /// sampling or limiting applied to the other artifacts.
    pub total_docs: u64,
    /// Word count of the longest article (0 when the collection is empty).
    pub max_len: i64,
    /// Most recent year present (0 when no document carries a year).
    pub latest_year: i32,
}

/// Everything the overview path computes in one pass. Recomputed in full on
/// each trigger and cached for a bounded TTL; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    /// (year, count) ascending, one entry per year; null-year documents are
    /// absent here but still counted in `kpi.total_docs`.
    pub stats_year: Vec<YearCount>,
    /// At most 10 entries, descending by word_count; ties keep load order.
    pub top_10: Vec<TopArticle>,
    /// The full word_count column, one value per document, unordered.
    pub distribution: Vec<i64>,
    /// ~10% Bernoulli sample of the text column, truncated to 100 rows
    /// after sampling. Nulls are kept; the word cloud drops them later.
    pub sample_text: Vec<Option<String>>,
    pub kpi: Kpi,
    pub raw: RawTable,
}

// --- Display table ---

/// Default display columns, restricted to the columns actually present.
pub const DEFAULT_TABLE_COLUMNS: [&str; 3] = ["title", "year", "word_count"];

/// The full document set coerced for safe tabular display: every datetime
/// value is already a printable string, ObjectIds are hex strings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, serde_json::Value>>,
}

impl RawTable {
    /// Rows whose `title` or `text_clean` contains `query`,
    /// case-insensitively. An empty query matches every row.
    pub fn matching_rows(&self, query: &str) -> Vec<&BTreeMap<String, serde_json::Value>> {
        if query.is_empty() {
            return self.rows.iter().collect();
        }
        let needle = query.to_lowercase();
        self.rows
            .iter()
            .filter(|row| {
                field_contains(row, "title", &needle) || field_contains(row, "text_clean", &needle)
            })
            .collect()
    }

    /// Resolve the display column selection. `None` means "not specified":
    /// fall back to the default subset of columns actually present. An
    /// explicitly empty (or entirely unknown) selection is rejected.
    pub fn display_columns(&self, requested: Option<&[String]>) -> Result<Vec<String>, WikiscopeError> {
        let present = |name: &str| self.columns.iter().any(|c| c == name);
        match requested {
            None => Ok(DEFAULT_TABLE_COLUMNS
                .iter()
                .filter(|c| present(c))
                .map(|c| c.to_string())
                .collect()),
            Some(cols) => {
                let kept: Vec<String> = cols.iter().filter(|c| present(c)).cloned().collect();
                if kept.is_empty() {
                    return Err(WikiscopeError::Validation(
                        "Vui lòng chọn ít nhất một cột.".to_string(),
                    ));
                }
                Ok(kept)
            }
        }
    }
}

fn field_contains(row: &BTreeMap<String, serde_json::Value>, field: &str, needle: &str) -> bool {
    match row.get(field) {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => s.to_lowercase().contains(needle),
        Some(other) => other.to_string().to_lowercase().contains(needle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RawTable {
        let mk = |title: &str, text: serde_json::Value, year: i64| {
            BTreeMap::from([
                ("title".to_string(), json!(title)),
                ("text_clean".to_string(), text),
                ("year".to_string(), json!(year)),
            ])
        };
        RawTable {
            columns: vec!["text_clean".into(), "title".into(), "year".into()],
            rows: vec![
                mk("Hà Nội", json!("thủ đô của Việt Nam"), 2019),
                mk("Sài Gòn", json!(null), 2021),
                mk("Đà Nẵng", json!("thành phố biển"), 2020),
            ],
        }
    }

    // --- search tests ---

    #[test]
    fn empty_query_matches_all_rows() {
        assert_eq!(table().matching_rows("").len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_on_title() {
        let t = table();
        assert_eq!(t.matching_rows("hà nội").len(), 1);
        assert_eq!(t.matching_rows("HÀ NỘI").len(), 1);
    }

    #[test]
    fn search_matches_title_or_text() {
        let t = table();
        // "biển" only appears in Đà Nẵng's text_clean
        assert_eq!(t.matching_rows("biển").len(), 1);
        // "n" appears in every title
        assert_eq!(t.matching_rows("n").len(), 3);
    }

    #[test]
    fn null_text_does_not_match() {
        let t = table();
        let hits = t.matching_rows("null");
        assert!(hits.is_empty());
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(table().matching_rows("zzz").is_empty());
    }

    // --- column selection tests ---

    #[test]
    fn default_columns_restricted_to_present() {
        let t = table();
        // word_count is not a column of this table
        let cols = t.display_columns(None).unwrap();
        assert_eq!(cols, vec!["title".to_string(), "year".to_string()]);
    }

    #[test]
    fn explicit_selection_kept_in_request_order() {
        let t = table();
        let req = vec!["year".to_string(), "title".to_string()];
        let cols = t.display_columns(Some(&req)).unwrap();
        assert_eq!(cols, vec!["year".to_string(), "title".to_string()]);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let t = table();
        let err = t.display_columns(Some(&[])).unwrap_err();
        assert!(matches!(err, WikiscopeError::Validation(_)));
    }

    #[test]
    fn unknown_only_selection_is_rejected() {
        let t = table();
        let req = vec!["nope".to_string()];
        assert!(t.display_columns(Some(&req)).is_err());
    }
}
