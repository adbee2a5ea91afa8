use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Response};
use bson::Document;
use futures::TryStreamExt;
use serde::Deserialize;

use crate::models::FileRecord;
use crate::render;
use crate::search::query::build_search_pipeline;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /search - HTML search results page; an empty or missing `q` renders
/// the bare form without touching the search service
pub async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Ok(Html(render::search_page("", None)));
    }

    let pipeline = build_search_pipeline(&state.config.search_index, &query);
    let results = run_search(&state, pipeline).await.map_err(|e| {
        tracing::error!("Search failed for '{query}': {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Search failed".to_string(),
        )
    })?;

    tracing::debug!("Search '{query}' returned {} result(s)", results.len());
    Ok(Html(render::search_page(&query, Some(&results))))
}

async fn run_search(
    state: &AppState,
    pipeline: Vec<Document>,
) -> anyhow::Result<Vec<FileRecord>> {
    let mut cursor = state.files.aggregate(pipeline).await?;
    let mut results = Vec::new();
    while let Some(doc) = cursor.try_next().await? {
        results.push(bson::from_document(doc)?);
    }
    Ok(results)
}

/// GET /search/download/{id} - same semantics as /files/{id}, scoped to the
/// search UI
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    crate::api::files::stream_blob(&state, &id).await
}
