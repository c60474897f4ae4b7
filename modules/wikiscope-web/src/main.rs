use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wikiscope_common::{AggregationResult, Config, SliceRecord};
use wikiscope_store::cache::CACHE_TTL;
use wikiscope_store::{StoreClient, TtlCache};

mod api;
mod templates;

// --- App State ---

/// Process-wide services: one store connection and the two result caches,
/// constructed once in `main` and shared by every handler.
pub struct AppState {
    pub client: StoreClient,
    pub overview_cache: TtlCache<(String, String), AggregationResult>,
    pub slice_cache: TtlCache<(String, String, i64), Vec<SliceRecord>>,
}

// --- Main ---

/// Default log directives, one per crate that logs. Targets follow crate
/// names, so the binary logs under `web` and the store under
/// `wikiscope_store`.
const LOG_DIRECTIVES: [&str; 2] = ["web=info", "wikiscope_store=info"];

fn log_filter() -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let config = Config::from_env();

    let client = StoreClient::connect(&config.mongo_uri).await?;

    let state = Arc::new(AppState {
        client,
        overview_cache: TtlCache::new(CACHE_TTL),
        slice_cache: TtlCache::new(CACHE_TTL),
    });

    let app = Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(healthz))
        // Catalog
        .route("/api/databases", get(api::api_databases))
        .route("/api/databases/{db}/collections", get(api::api_collections))
        // Overview path
        .route("/api/overview", get(api::api_overview))
        .route("/api/overview/table", get(api::api_overview_table))
        // Slice path
        .route("/api/slice", get(api::api_slice))
        // Explicit cache invalidation
        .route("/api/reload", post(api::api_reload))
        .with_state(state)
        // Computed bundles already have a server-side TTL; the browser must
        // not add its own layer on top.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only, no query params
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Wikiscope web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Page handlers ---

async fn dashboard_page() -> impl IntoResponse {
    Html(templates::render_dashboard())
}

async fn healthz() -> impl IntoResponse {
    "ok"
}
