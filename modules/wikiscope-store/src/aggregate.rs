//! The overview path: load a whole collection, normalize it, and compute
//! every artifact the dashboard shows in one pass.
//!
//! The heavy lifting is in pure functions over `Article` slices so they can
//! be tested without a source; `Aggregator` is the thin async shell that
//! feeds them from a `DocumentSource`.

use std::collections::{BTreeMap, BTreeSet};

use mongodb::bson::{Bson, Document};
use rand::Rng;
use tracing::info;

use wikiscope_common::normalize::{clean_count, parse_rev_ts, year_of};
use wikiscope_common::{
    AggregationResult, Article, Kpi, RawTable, TopArticle, WikiscopeError, YearCount, TOP_N,
};

use crate::source::DocumentSource;

/// Bernoulli keep probability for the text sample.
pub const SAMPLE_FRACTION: f64 = 0.1;
/// Hard cap applied after sampling.
pub const SAMPLE_CAP: usize = 100;

/// Datetime values are coerced to this shape everywhere they become text.
pub const DISPLAY_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Aggregator<'a> {
    source: &'a dyn DocumentSource,
}

impl<'a> Aggregator<'a> {
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self { source }
    }

    /// Load a collection and compute the full overview bundle.
    ///
    /// Every artifact is recomputed from scratch; nothing is persisted. A
    /// source failure is returned as-is, the caller decides how to report it.
    pub async fn aggregate(
        &self,
        db: &str,
        collection: &str,
    ) -> Result<AggregationResult, WikiscopeError> {
        let start = std::time::Instant::now();

        let docs = self.source.fetch_all(db, collection).await?;
        // The KPI counts the rows actually loaded, so it always agrees with
        // the distribution and the display table built from the same fetch.
        let total_docs = docs.len() as u64;

        let articles: Vec<Article> = docs.iter().map(article_from_doc).collect();

        let stats_year = count_by_year(&articles);
        let top_10 = top_by_word_count(&articles, TOP_N);
        let distribution: Vec<i64> = articles.iter().map(|a| a.word_count).collect();

        let texts: Vec<Option<String>> = articles.iter().map(|a| a.text_clean.clone()).collect();
        let mut rng = rand::rng();
        let sample_text = sample_texts(&texts, SAMPLE_FRACTION, SAMPLE_CAP, &mut rng);

        let kpi = Kpi {
            total_docs,
            max_len: top_10.first().map(|t| t.word_count).unwrap_or(0),
            latest_year: stats_year.last().map(|y| y.year).unwrap_or(0),
        };

        let raw = display_table(&docs, &articles);

        let elapsed = start.elapsed();
        info!(
            db = %db,
            collection = %collection,
            documents = articles.len(),
            years = stats_year.len(),
            sampled = sample_text.len(),
            elapsed_ms = elapsed.as_millis(),
            "Collection aggregated"
        );

        Ok(AggregationResult {
            stats_year,
            top_10,
            distribution,
            sample_text,
            kpi,
            raw,
        })
    }
}

// --- Normalization boundary ---

/// Normalize one raw document into an `Article`. Total: a missing or
/// malformed field degrades to its null form, the row is always kept.
pub fn article_from_doc(doc: &Document) -> Article {
    let timestamp = doc.get("rev_ts").and_then(parse_rev_ts);
    Article {
        title: doc.get_str("title").unwrap_or_default().to_string(),
        text_clean: doc.get_str("text_clean").ok().map(|s| s.to_string()),
        word_count: doc.get("word_count").and_then(clean_count).unwrap_or(0),
        text_len: doc.get("text_len").and_then(clean_count),
        year: timestamp.as_ref().map(year_of),
        timestamp,
    }
}

// --- Pure aggregation ---

/// Article counts per year, ascending, one entry per year. Documents
/// without a year are skipped here (they still count toward the KPI total).
pub fn count_by_year(articles: &[Article]) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for article in articles {
        let Some(year) = article.year else {
            continue;
        };
        *counts.entry(year).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// The `n` longest articles, descending by word count. The sort is stable,
/// so equal counts keep load order.
pub fn top_by_word_count(articles: &[Article], n: usize) -> Vec<TopArticle> {
    let mut ranked: Vec<&Article> = articles.iter().collect();
    ranked.sort_by(|a, b| b.word_count.cmp(&a.word_count));
    ranked
        .into_iter()
        .take(n)
        .map(|a| TopArticle {
            title: a.title.clone(),
            word_count: a.word_count,
        })
        .collect()
}

/// Independent Bernoulli sample of the text column, then a hard cap. The
/// cap runs after sampling, so the result is approximate by design: up to
/// `cap` rows of roughly `fraction` of the input. Nulls are sampled like
/// any other row.
pub fn sample_texts<R: Rng>(
    texts: &[Option<String>],
    fraction: f64,
    cap: usize,
    rng: &mut R,
) -> Vec<Option<String>> {
    let mut sampled: Vec<Option<String>> = texts
        .iter()
        .filter(|_| rng.random_bool(fraction))
        .cloned()
        .collect();
    sampled.truncate(cap);
    sampled
}

// --- Display table ---

/// Build the searchable display table: every stored field of every document
/// plus the derived `timestamp` and `year` columns. Stored columns sort
/// alphabetically, derived columns go last and shadow stored fields of the
/// same name. Normalized counts replace their raw arrival forms.
pub fn display_table(docs: &[Document], articles: &[Article]) -> RawTable {
    let mut stored: BTreeSet<String> = BTreeSet::new();
    for doc in docs {
        for key in doc.keys() {
            stored.insert(key.clone());
        }
    }
    stored.remove("timestamp");
    stored.remove("year");

    let mut columns: Vec<String> = stored.into_iter().collect();
    columns.push("timestamp".to_string());
    columns.push("year".to_string());

    let rows = docs
        .iter()
        .zip(articles)
        .map(|(doc, article)| {
            let mut row: BTreeMap<String, serde_json::Value> = doc
                .iter()
                .map(|(key, value)| (key.clone(), display_value(value)))
                .collect();
            if row.contains_key("word_count") {
                row.insert("word_count".to_string(), article.word_count.into());
            }
            if row.contains_key("text_len") {
                row.insert("text_len".to_string(), int_or_null(article.text_len));
            }
            row.insert(
                "timestamp".to_string(),
                match &article.timestamp {
                    Some(ts) => ts.format(DISPLAY_TS_FORMAT).to_string().into(),
                    None => serde_json::Value::Null,
                },
            );
            row.insert(
                "year".to_string(),
                match article.year {
                    Some(year) => year.into(),
                    None => serde_json::Value::Null,
                },
            );
            row
        })
        .collect();

    RawTable { columns, rows }
}

fn int_or_null(value: Option<i64>) -> serde_json::Value {
    match value {
        Some(n) => n.into(),
        None => serde_json::Value::Null,
    }
}

/// Coerce one BSON value for display. Datetimes become printable strings,
/// ObjectIds become hex, containers recurse.
fn display_value(value: &Bson) -> serde_json::Value {
    match value {
        Bson::Null | Bson::Undefined => serde_json::Value::Null,
        Bson::String(s) => s.clone().into(),
        Bson::Boolean(b) => (*b).into(),
        Bson::Int32(n) => (*n).into(),
        Bson::Int64(n) => (*n).into(),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Bson::DateTime(dt) => {
            match chrono::DateTime::from_timestamp_millis(dt.timestamp_millis()) {
                Some(ts) => ts.format(DISPLAY_TS_FORMAT).to_string().into(),
                None => serde_json::Value::Null,
            }
        }
        Bson::ObjectId(oid) => oid.to_hex().into(),
        Bson::Array(items) => items.iter().map(display_value).collect(),
        Bson::Document(doc) => doc
            .iter()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect(),
        other => other.clone().into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mongodb::bson::{doc, oid::ObjectId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn article(title: &str, word_count: i64, year: Option<i32>) -> Article {
        Article {
            title: title.to_string(),
            text_clean: None,
            word_count,
            text_len: None,
            timestamp: year.map(|y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap()),
            year,
        }
    }

    // --- count_by_year tests ---

    #[test]
    fn year_counts_ascend_without_duplicates() {
        let articles = vec![
            article("a", 1, Some(2021)),
            article("b", 2, Some(2019)),
            article("c", 3, Some(2021)),
            article("d", 4, Some(2020)),
        ];
        let counts = count_by_year(&articles);
        assert_eq!(
            counts,
            vec![
                YearCount { year: 2019, count: 1 },
                YearCount { year: 2020, count: 1 },
                YearCount { year: 2021, count: 2 },
            ]
        );
    }

    #[test]
    fn null_years_are_skipped() {
        let articles = vec![article("a", 1, None), article("b", 2, Some(2020))];
        let counts = count_by_year(&articles);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].year, 2020);
    }

    // --- top_by_word_count tests ---

    #[test]
    fn top_is_descending_and_capped() {
        let articles: Vec<Article> = (1..=15)
            .map(|i| article(&format!("a{i}"), i as i64 * 10, None))
            .collect();
        let top = top_by_word_count(&articles, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].word_count, 150);
        assert_eq!(top[9].word_count, 60);
    }

    #[test]
    fn ties_keep_load_order() {
        let articles = vec![
            article("first", 500, None),
            article("second", 500, None),
            article("third", 900, None),
        ];
        let top = top_by_word_count(&articles, 3);
        assert_eq!(top[0].title, "third");
        assert_eq!(top[1].title, "first");
        assert_eq!(top[2].title, "second");
    }

    // --- sample_texts tests ---

    #[test]
    fn sampling_is_deterministic_for_a_fixed_seed() {
        let texts: Vec<Option<String>> = (0..1000).map(|i| Some(format!("t{i}"))).collect();
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        assert_eq!(
            sample_texts(&texts, 0.1, 100, &mut rng_a),
            sample_texts(&texts, 0.1, 100, &mut rng_b)
        );
    }

    #[test]
    fn cap_applies_after_sampling() {
        let texts: Vec<Option<String>> = (0..5000).map(|i| Some(format!("t{i}"))).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let sampled = sample_texts(&texts, 0.1, 100, &mut rng);
        assert_eq!(sampled.len(), 100);
    }

    #[test]
    fn zero_fraction_samples_nothing() {
        let texts = vec![Some("a".to_string()); 50];
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_texts(&texts, 0.0, 100, &mut rng).is_empty());
    }

    #[test]
    fn full_fraction_samples_up_to_cap() {
        let texts = vec![Some("a".to_string()); 50];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_texts(&texts, 1.0, 100, &mut rng).len(), 50);

        let texts = vec![Some("a".to_string()); 500];
        assert_eq!(sample_texts(&texts, 1.0, 100, &mut rng).len(), 100);
    }

    #[test]
    fn nulls_are_sampled_like_any_row() {
        let texts = vec![None, None, None];
        let mut rng = StdRng::seed_from_u64(1);
        let sampled = sample_texts(&texts, 1.0, 100, &mut rng);
        assert_eq!(sampled, vec![None, None, None]);
    }

    // --- article_from_doc tests ---

    #[test]
    fn documents_normalize_into_articles() {
        let doc = doc! {
            "title": "Hà Nội",
            "text_clean": "thủ đô",
            "word_count": "1,234",
            "text_len": Bson::Null,
            "rev_ts": "2020-05-01 10:00:00",
        };
        let article = article_from_doc(&doc);
        assert_eq!(article.title, "Hà Nội");
        assert_eq!(article.word_count, 1234);
        assert_eq!(article.text_len, None);
        assert_eq!(article.year, Some(2020));
    }

    #[test]
    fn missing_fields_degrade_to_null_forms() {
        let article = article_from_doc(&doc! { "other": 1 });
        assert_eq!(article.title, "");
        assert_eq!(article.word_count, 0);
        assert_eq!(article.text_clean, None);
        assert_eq!(article.timestamp, None);
        assert_eq!(article.year, None);
    }

    // --- display table tests ---

    #[test]
    fn display_values_coerce_datetimes_and_object_ids() {
        let millis = Utc
            .with_ymd_and_hms(2021, 3, 4, 5, 6, 7)
            .unwrap()
            .timestamp_millis();
        let coerced = display_value(&Bson::DateTime(mongodb::bson::DateTime::from_millis(millis)));
        assert_eq!(coerced, serde_json::json!("2021-03-04 05:06:07"));

        let oid = ObjectId::new();
        assert_eq!(
            display_value(&Bson::ObjectId(oid)),
            serde_json::json!(oid.to_hex())
        );
    }

    #[test]
    fn table_columns_sort_stored_then_derived() {
        let docs = vec![
            doc! { "title": "a", "word_count": 5, "zeta": 1 },
            doc! { "title": "b", "alpha": 2 },
        ];
        let articles: Vec<Article> = docs.iter().map(article_from_doc).collect();
        let table = display_table(&docs, &articles);
        assert_eq!(
            table.columns,
            vec!["alpha", "title", "word_count", "zeta", "timestamp", "year"]
        );
    }

    #[test]
    fn derived_columns_shadow_stored_fields() {
        let docs = vec![doc! { "title": "a", "year": "not a year", "rev_ts": "2019-01-01" }];
        let articles: Vec<Article> = docs.iter().map(article_from_doc).collect();
        let table = display_table(&docs, &articles);
        assert_eq!(
            table.columns.iter().filter(|c| *c == "year").count(),
            1,
            "no duplicate year column"
        );
        assert_eq!(table.rows[0]["year"], serde_json::json!(2019));
        assert_eq!(table.rows[0]["timestamp"], serde_json::json!("2019-01-01 00:00:00"));
    }

    #[test]
    fn normalized_counts_replace_raw_strings() {
        let docs = vec![doc! { "title": "a", "word_count": "2,500" }];
        let articles: Vec<Article> = docs.iter().map(article_from_doc).collect();
        let table = display_table(&docs, &articles);
        assert_eq!(table.rows[0]["word_count"], serde_json::json!(2500));
    }
}
