//! JSON API handlers for both analysis paths.
//!
//! Handlers pull a cached bundle or recompute it, then hand sub-frames to
//! the chart builders. Store failures are logged and surfaced as an inline
//! error payload; empty data is a 200 with null charts, never a failure.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use wikiscope_charts::{builders, stats, word_cloud};
use wikiscope_common::{AggregationResult, SliceRecord, WikiscopeError, YearCount};
use wikiscope_store::{load_slice, Aggregator, DocumentSource};

use crate::AppState;

/// Operator-adjustable row limit bounds for the slice path.
pub const SLICE_LIMIT_MIN: i64 = 100;
pub const SLICE_LIMIT_MAX: i64 = 10_000;
pub const SLICE_LIMIT_DEFAULT: i64 = 2_000;

// --- Query structs ---

#[derive(Deserialize)]
pub struct OverviewQuery {
    db: String,
    coll: String,
    outliers: Option<bool>,
}

#[derive(Deserialize)]
pub struct TableQuery {
    db: String,
    coll: String,
    q: Option<String>,
    cols: Option<String>,
}

#[derive(Deserialize)]
pub struct SliceQuery {
    db: String,
    coll: String,
    limit: Option<i64>,
    outliers: Option<bool>,
}

// --- Catalog ---

pub async fn api_databases(State(state): State<Arc<AppState>>) -> Response {
    match state.client.list_databases().await {
        Ok(databases) => Json(json!({ "databases": databases })).into_response(),
        Err(e) => store_error("list databases", e),
    }
}

pub async fn api_collections(
    State(state): State<Arc<AppState>>,
    Path(db): Path<String>,
) -> Response {
    match state.client.list_collections(&db).await {
        Ok(collections) => Json(json!({ "collections": collections })).into_response(),
        Err(e) => store_error("list collections", e),
    }
}

// --- Overview path ---

pub async fn api_overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverviewQuery>,
) -> Response {
    let result = match overview_bundle(&state, &params.db, &params.coll).await {
        Ok(result) => result,
        Err(e) => return store_error("aggregate collection", e),
    };
    let show_outliers = params.outliers.unwrap_or(false);

    Json(json!({
        "kpi": result.kpi,
        "charts": {
            "year_trend": builders::articles_over_time(&result.stats_year),
            "top_10": builders::top_longest(&result.top_10),
            "distribution": builders::word_count_distribution(&result.distribution, show_outliers),
        },
        "word_cloud": word_cloud::word_cloud(&result.sample_text, word_cloud::OVERVIEW_MIN_CHARS),
        "sample_count": result.sample_text.len(),
        "row_count": result.raw.rows.len(),
    }))
    .into_response()
}

pub async fn api_overview_table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TableQuery>,
) -> Response {
    let result = match overview_bundle(&state, &params.db, &params.coll).await {
        Ok(result) => result,
        Err(e) => return store_error("aggregate collection", e),
    };

    // `cols` present but empty is an explicit empty selection and gets the
    // user-visible warning; absent means "use the defaults".
    let requested: Option<Vec<String>> = params.cols.as_ref().map(|cols| {
        cols.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    });
    let columns = match result.raw.display_columns(requested.as_deref()) {
        Ok(columns) => columns,
        Err(e) => return store_error("select display columns", e),
    };

    let query = params.q.as_deref().unwrap_or("");
    let matched = result.raw.matching_rows(query);
    let rows: Vec<serde_json::Value> = matched
        .iter()
        .map(|row| {
            let projected: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .map(|column| {
                    (
                        column.clone(),
                        row.get(column).cloned().unwrap_or(serde_json::Value::Null),
                    )
                })
                .collect();
            serde_json::Value::Object(projected)
        })
        .collect();

    Json(json!({
        "columns": columns,
        "matched": rows.len(),
        "total": result.raw.rows.len(),
        "rows": rows,
    }))
    .into_response()
}

async fn overview_bundle(
    state: &AppState,
    db: &str,
    coll: &str,
) -> Result<Arc<AggregationResult>, WikiscopeError> {
    let key = (db.to_string(), coll.to_string());
    if let Some(cached) = state.overview_cache.get(&key) {
        return Ok(cached);
    }
    let bundle = Aggregator::new(&state.client).aggregate(db, coll).await?;
    Ok(state.overview_cache.insert(key, bundle))
}

// --- Slice path ---

pub async fn api_slice(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SliceQuery>,
) -> Response {
    let limit = clamp_limit(params.limit);
    let records = match slice_records(&state, &params.db, &params.coll, limit).await {
        Ok(records) => records,
        Err(e) => return store_error("load slice", e),
    };
    let show_outliers = params.outliers.unwrap_or(false);

    let word_counts: Vec<i64> = records.iter().map(|r| r.word_count).collect();
    let texts: Vec<Option<String>> = records.iter().map(|r| r.text_clean.clone()).collect();

    Json(json!({
        "record_count": records.len(),
        "limit": limit,
        "summary": stats::word_count_summary(&records),
        "charts": {
            "year_trend": builders::articles_over_time(&slice_year_counts(&records)),
            "scatter": builders::length_scatter(&records),
            "distribution": builders::word_count_distribution(&word_counts, show_outliers),
            "violin": builders::word_count_violin(&records),
            "heatmap": builders::weekday_hour_heatmap(&records),
        },
        "outliers": stats::outlier_table(&records),
        "word_cloud": word_cloud::word_cloud(&texts, word_cloud::SLICE_MIN_CHARS),
    }))
    .into_response()
}

async fn slice_records(
    state: &AppState,
    db: &str,
    coll: &str,
    limit: i64,
) -> Result<Arc<Vec<SliceRecord>>, WikiscopeError> {
    let key = (db.to_string(), coll.to_string(), limit);
    if let Some(cached) = state.slice_cache.get(&key) {
        return Ok(cached);
    }
    let records = load_slice(&state.client, db, coll, limit).await?;
    Ok(state.slice_cache.insert(key, records))
}

// --- Reload ---

pub async fn api_reload(State(state): State<Arc<AppState>>) -> Response {
    state.overview_cache.clear();
    state.slice_cache.clear();
    info!("Result caches cleared");
    Json(json!({ "reloaded": true })).into_response()
}

// --- Helpers ---

fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(SLICE_LIMIT_DEFAULT)
        .clamp(SLICE_LIMIT_MIN, SLICE_LIMIT_MAX)
}

fn slice_year_counts(records: &[SliceRecord]) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for record in records {
        let Some(year) = record.year else { continue };
        *counts.entry(year).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

fn store_error(action: &'static str, e: WikiscopeError) -> Response {
    warn!(error = %e, action, "Request failed");
    let status = match e {
        WikiscopeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WikiscopeError::Connection(_) | WikiscopeError::Query(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- limit clamp tests ---

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 2_000);
        assert_eq!(clamp_limit(Some(500)), 500);
        assert_eq!(clamp_limit(Some(5)), 100);
        assert_eq!(clamp_limit(Some(1_000_000)), 10_000);
    }

    // --- slice year count tests ---

    fn record(year: Option<i32>) -> SliceRecord {
        SliceRecord {
            title: String::new(),
            text_clean: None,
            word_count: 0,
            text_len: None,
            timestamp: None,
            year,
            hour: None,
            day_of_week: None,
        }
    }

    #[test]
    fn slice_years_group_ascending_and_skip_nulls() {
        let records = vec![
            record(Some(2021)),
            record(None),
            record(Some(2019)),
            record(Some(2021)),
        ];
        assert_eq!(
            slice_year_counts(&records),
            vec![
                YearCount { year: 2019, count: 1 },
                YearCount { year: 2021, count: 2 },
            ]
        );
    }
}
