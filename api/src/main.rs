//! HTTP facade over the Dalil search engine.

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dalil::{Catalog, Chapter, DalilError, MatchedVariant, Reciter, SearchEngine, Searchable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

struct AppState {
    engine: SearchEngine,
    catalog: Catalog,
}

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    threshold: Option<f64>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct NormalizeQuery {
    text: String,
}

#[derive(Serialize)]
struct NormalizeResponse {
    text: String,
    normalized: String,
}

#[derive(Serialize)]
struct ScoredResult<T: Serialize> {
    #[serde(flatten)]
    item: T,
    score: f64,
    variant: MatchedVariant,
}

#[derive(Serialize)]
struct SearchResponse<T: Serialize> {
    query: String,
    total_hits: usize,
    results: Vec<ScoredResult<T>>,
    elapsed_ms: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    reciters: usize,
    chapters: usize,
}

#[derive(Serialize)]
struct CacheStats {
    entries: usize,
    capacity: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        reciters: state.catalog.reciters.len(),
        chapters: state.catalog.chapters.len(),
    })
}

fn run_search<T: Searchable + Serialize + Clone>(
    engine: &SearchEngine,
    items: &[T],
    params: SearchQuery,
) -> SearchResponse<T> {
    let start = std::time::Instant::now();

    let mut options = engine.options();
    if let Some(threshold) = params.threshold {
        options.threshold = threshold.clamp(0.0, 1.0);
    }
    let limit = params.limit.unwrap_or(50).min(100);

    let hits = engine.search_scored(items, &params.q, &options);
    let total_hits = hits.len();
    let results = hits
        .into_iter()
        .take(limit)
        .map(|hit| ScoredResult {
            item: hit.item.clone(),
            score: hit.score,
            variant: hit.variant,
        })
        .collect();

    SearchResponse {
        query: params.q,
        total_hits,
        results,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

async fn search_reciters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse<Reciter>> {
    Json(run_search(&state.engine, &state.catalog.reciters, params))
}

async fn search_chapters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse<Chapter>> {
    Json(run_search(&state.engine, &state.catalog.chapters, params))
}

async fn normalize_text(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NormalizeQuery>,
) -> Json<NormalizeResponse> {
    let normalized = state.engine.normalize_text(&params.text);
    Json(NormalizeResponse {
        text: params.text,
        normalized,
    })
}

async fn get_all_reciters(State(state): State<Arc<AppState>>) -> Json<Vec<Reciter>> {
    Json(state.catalog.reciters.clone())
}

async fn get_reciter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Reciter>, (StatusCode, Json<ErrorResponse>)> {
    state
        .catalog
        .reciters
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            let err = DalilError::NotFound(format!("reciter {id}"));
            (StatusCode::NOT_FOUND, Json(ErrorResponse { error: err.to_string() }))
        })
}

async fn get_all_chapters(State(state): State<Arc<AppState>>) -> Json<Vec<Chapter>> {
    Json(state.catalog.chapters.clone())
}

async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    let (entries, capacity) = state.engine.cache_stats();
    Json(CacheStats { entries, capacity })
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    state.engine.clear_cache();
    let (entries, capacity) = state.engine.cache_stats();
    Json(CacheStats { entries, capacity })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let catalog_path =
        std::env::var("DALIL_CATALOG").unwrap_or_else(|_| "catalog.json".to_string());
    let addr = std::env::var("DALIL_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let catalog = Catalog::load(std::path::Path::new(&catalog_path))
        .with_context(|| format!("failed to load catalog from {catalog_path}"))?;
    tracing::info!(
        reciters = catalog.reciters.len(),
        chapters = catalog.chapters.len(),
        "catalog loaded"
    );

    let state = Arc::new(AppState {
        engine: SearchEngine::new(),
        catalog,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/search/reciters", get(search_reciters))
        .route("/search/chapters", get(search_chapters))
        .route("/normalize", get(normalize_text))
        .route("/reciters", get(get_all_reciters))
        .route("/reciters/:id", get(get_reciter))
        .route("/chapters", get(get_all_chapters))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", post(clear_cache))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> Arc<AppState> {
        let catalog = Catalog::from_json(
            r#"{
                "reciters": [
                    {"id": 1, "name": "عبد الباسط عبد الصمد"},
                    {"id": 2, "name": "محمد صديق المنشاوي"}
                ],
                "chapters": [
                    {"id": 1, "name": "الفاتحة", "verse_count": 7}
                ]
            }"#,
        )
        .unwrap();
        Arc::new(AppState {
            engine: SearchEngine::new(),
            catalog,
        })
    }

    #[test]
    fn search_response_carries_scores_and_counts() {
        let state = test_state();
        let response = run_search(
            &state.engine,
            &state.catalog.reciters,
            SearchQuery {
                q: "عبض الباسط".to_string(),
                threshold: None,
                limit: None,
            },
        );
        assert_eq!(response.total_hits, 1);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].item.id, 1);
        assert!(response.results[0].score <= 0.35);
    }

    #[test]
    fn threshold_parameter_is_clamped() {
        let state = test_state();
        let response = run_search(
            &state.engine,
            &state.catalog.reciters,
            SearchQuery {
                q: "قق".to_string(),
                threshold: Some(7.5),
                limit: None,
            },
        );
        // Clamped to 1.0, which accepts every candidate.
        assert_eq!(response.total_hits, 2);
    }

    #[test]
    fn limit_caps_the_result_page() {
        let state = test_state();
        let response = run_search(
            &state.engine,
            &state.catalog.reciters,
            SearchQuery {
                q: String::new(),
                threshold: None,
                limit: Some(1),
            },
        );
        assert_eq!(response.total_hits, 2);
        assert_eq!(response.results.len(), 1);
    }

    #[test]
    fn scored_result_serializes_flat() {
        let result = ScoredResult {
            item: Reciter {
                id: 9,
                name: "يس".to_string(),
                riwaya: None,
                server: None,
                letter: None,
            },
            score: 0.25,
            variant: MatchedVariant::Canonical,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["score"], 0.25);
        assert_eq!(json["variant"], "canonical");
    }
}
