//! The slice path: the most recent N documents, projected down to the five
//! fields the slice charts read, with time-of-day derivations.

use chrono::Datelike;
use mongodb::bson::Document;
use tracing::info;

use wikiscope_common::normalize::{clean_count, hour_of, parse_rev_ts, weekday_label, year_of};
use wikiscope_common::{SliceRecord, WikiscopeError};

use crate::source::DocumentSource;

/// The projection of the slice query. Everything else stays on the server.
pub const SLICE_FIELDS: [&str; 5] = ["title", "rev_ts", "text_len", "word_count", "text_clean"];

/// Load the `limit` most recent documents (by `rev_ts` descending) and
/// normalize them. An empty collection is `Ok(vec![])`, not a failure.
pub async fn load_slice(
    source: &dyn DocumentSource,
    db: &str,
    collection: &str,
    limit: i64,
) -> Result<Vec<SliceRecord>, WikiscopeError> {
    let limit = limit.max(1);
    let docs = source
        .fetch_recent(db, collection, &SLICE_FIELDS, limit)
        .await?;
    let records: Vec<SliceRecord> = docs.iter().map(slice_record_from_doc).collect();

    info!(
        db = %db,
        collection = %collection,
        limit,
        records = records.len(),
        "Recent slice loaded"
    );
    Ok(records)
}

/// Normalize one projected document. Total, like the overview path: a null
/// timestamp propagates as null year/hour/day_of_week.
pub fn slice_record_from_doc(doc: &Document) -> SliceRecord {
    let timestamp = doc.get("rev_ts").and_then(parse_rev_ts);
    SliceRecord {
        title: doc.get_str("title").unwrap_or_default().to_string(),
        text_clean: doc.get_str("text_clean").ok().map(|s| s.to_string()),
        word_count: doc.get("word_count").and_then(clean_count).unwrap_or(0),
        text_len: doc.get("text_len").and_then(clean_count),
        year: timestamp.as_ref().map(year_of),
        hour: timestamp.as_ref().map(hour_of),
        day_of_week: timestamp.as_ref().map(|ts| weekday_label(ts.weekday())),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    // --- slice_record_from_doc tests ---

    #[test]
    fn derivations_follow_the_timestamp() {
        // 2023-07-03 was a Monday
        let record = slice_record_from_doc(&doc! {
            "title": "Huế",
            "word_count": 150,
            "rev_ts": "2023-07-03T14:30:00Z",
        });
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.hour, Some(14));
        assert_eq!(record.day_of_week, Some("Thứ 2"));
    }

    #[test]
    fn null_timestamp_propagates() {
        let record = slice_record_from_doc(&doc! { "title": "x", "word_count": 1 });
        assert_eq!(record.timestamp, None);
        assert_eq!(record.year, None);
        assert_eq!(record.hour, None);
        assert_eq!(record.day_of_week, None);
    }

    #[test]
    fn unparseable_timestamp_keeps_the_row() {
        let record = slice_record_from_doc(&doc! {
            "title": "kept",
            "word_count": 9,
            "rev_ts": "not a date",
        });
        assert_eq!(record.title, "kept");
        assert_eq!(record.word_count, 9);
        assert_eq!(record.year, None);
    }
}
