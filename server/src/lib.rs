use anyhow::{bail, Result};
use axum::{extract::{rejection::QueryRejection, Path, Query, State}, http::HeaderMap, routing::{get, post}, Json, Router};
use docsearch_core::persist::{load_index, IndexPaths};
use docsearch_core::{Category, DocId, QueryEngine, SearchOptions, SharedIndex, Snippet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod error;

pub use error::ApiError;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    /// Comma-separated category names.
    pub category: Option<String>,
    #[serde(default)]
    pub min_score: f32,
    pub version: Option<String>,
}
fn default_limit() -> usize { docsearch_core::config::DEFAULT_LIMIT }

#[derive(Deserialize)]
pub struct VersionParam {
    pub version: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub version: String,
    pub took_ms: u128,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub location: String,
    pub page: String,
    pub title: String,
    pub category: Category,
    /// Snippet text with matches wrapped in `<em>`.
    pub snippet: String,
    /// Byte ranges of the matches within the plain snippet text.
    pub highlights: Vec<(usize, usize)>,
}

#[derive(Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub num_docs: u32,
    pub num_terms: usize,
    pub default: bool,
}

/// One documentation version: where its index lives and the index currently
/// being served.
pub struct VersionEntry {
    pub dir: PathBuf,
    pub index: SharedIndex,
}

#[derive(Clone)]
pub struct AppState {
    pub versions: Arc<BTreeMap<String, VersionEntry>>,
    pub default_version: String,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Load every `(version, dir)` pair; the first one becomes the default.
    pub fn load(indexes: &[(String, PathBuf)], admin_token: Option<String>) -> Result<Self> {
        let Some((default_version, _)) = indexes.first() else {
            bail!("at least one index is required");
        };
        let mut versions = BTreeMap::new();
        for (name, dir) in indexes {
            let index = load_index(&IndexPaths::new(dir))?;
            tracing::info!(version = %name, num_docs = index.num_docs(), "serving index");
            if versions.insert(name.clone(), VersionEntry { dir: dir.clone(), index: SharedIndex::new(index) }).is_some() {
                bail!("version `{name}` given more than once");
            }
        }
        Ok(Self { versions: Arc::new(versions), default_version: default_version.clone(), admin_token })
    }

    fn entry(&self, version: Option<&str>) -> Result<(&str, &VersionEntry), ApiError> {
        let name = version.unwrap_or(self.default_version.as_str());
        self.versions
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ApiError::NotFound(format!("unknown version `{name}`")))
    }
}

/// Parse `version=dir` (or a bare `dir`, served as version `latest`).
pub fn parse_index_arg(arg: &str) -> (String, PathBuf) {
    match arg.split_once('=') {
        Some((name, dir)) if !name.is_empty() => (name.to_string(), PathBuf::from(dir)),
        _ => ("latest".to_string(), PathBuf::from(arg)),
    }
}

pub fn build_app(indexes: &[(String, PathBuf)]) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::load(indexes, admin_token)?;
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/versions", get(versions_handler))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Allowed origins come from `CORS_ALLOW_ORIGIN` (comma-separated); any
/// origin when unset or unparsable.
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|o| o.trim().parse().ok()).collect())
        .unwrap_or_default();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn versions_handler(State(state): State<AppState>) -> Json<Vec<VersionInfo>> {
    let infos = state
        .versions
        .iter()
        .map(|(name, entry)| {
            let snap = entry.index.snapshot();
            VersionInfo {
                version: name.clone(),
                num_docs: snap.num_docs(),
                num_terms: snap.num_terms(),
                default: *name == state.default_version,
            }
        })
        .collect();
    Json(infos)
}

pub async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let start = std::time::Instant::now();
    let (version, entry) = state.entry(params.version.as_deref())?;

    let mut options = SearchOptions::default()
        .with_limit(params.limit)
        .with_offset(params.offset)
        .with_min_score(params.min_score);
    if let Some(raw) = params.category.as_deref() {
        let names: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
        if !names.is_empty() {
            options = options.with_categories(&names);
        }
    }

    let index = entry.index.snapshot();
    let found = QueryEngine::new(&index).search(&params.q, &options)?;
    let results = found
        .results
        .into_iter()
        .filter_map(|r| {
            let doc = index.document(r.doc_id)?;
            Some(SearchHit {
                doc_id: r.doc_id,
                score: r.score,
                location: doc.location.clone(),
                page: doc.page.clone(),
                title: doc.title.clone(),
                category: doc.category,
                snippet: r.snippet.render("<em>", "</em>"),
                highlights: r.snippet.highlights,
            })
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        version: version.to_string(),
        took_ms: elapsed.as_millis(),
        total_hits: found.total_hits,
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
    params: Result<Query<VersionParam>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = params?;
    let (version, entry) = state.entry(params.version.as_deref())?;
    let index = entry.index.snapshot();
    let doc = index
        .document(doc_id)
        .ok_or_else(|| ApiError::NotFound(format!("no document {doc_id} in version `{version}`")))?;
    Ok(Json(serde_json::json!({
        "doc_id": doc.id,
        "version": version,
        "location": doc.location,
        "page": doc.page,
        "title": doc.title,
        "category": doc.category,
        "text": doc.text,
    })))
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub version: String,
    pub num_docs: u32,
    pub previous_num_docs: u32,
}

/// Re-read a version's index directory and swap it in. Queries already
/// running keep the snapshot they started with.
async fn reload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<VersionParam>, QueryRejection>,
) -> Result<Json<ReloadResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Query(params) = params?;
    let (version, entry) = state.entry(params.version.as_deref())?;
    let dir = entry.dir.clone();
    let fresh = tokio::task::spawn_blocking(move || load_index(&IndexPaths::new(dir)))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    let num_docs = fresh.num_docs();
    let previous = entry.index.replace(fresh);
    tracing::info!(version, num_docs, previous = previous.num_docs(), "reloaded index");
    Ok(Json(ReloadResponse { version: version.to_string(), num_docs, previous_num_docs: previous.num_docs() }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
