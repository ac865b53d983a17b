pub mod chunking;
pub mod store;

use tracing::warn;
use uuid::Uuid;

use crate::rag::chunking::{chunk_by_size, chunk_readme, CodeChunk, DEFAULT_MAX_CHUNK_CHARS};
use crate::rag::store::{ChunkStore, ContextItem};
use crate::repository::analysis::ProjectAnalysis;

pub const README_PATH: &str = "README.md";
const OVERVIEW_QUERY: &str = "project overview purpose description";

/// README sections plus size-based chunks of every sampled source file.
pub fn build_chunks(analysis: &ProjectAnalysis) -> Vec<CodeChunk> {
    let mut chunks = analysis
        .readme
        .as_deref()
        .map(|readme| chunk_readme(README_PATH, readme))
        .unwrap_or_default();

    for file in &analysis.sample_files {
        chunks.extend(
            chunk_by_size(&file.content, &file.path, DEFAULT_MAX_CHUNK_CHARS)
                .into_iter()
                .filter(|c| !c.content.trim().is_empty())
                .map(|c| CodeChunk {
                    language: Some(file.language.to_string()),
                    ..c
                }),
        );
    }
    chunks
}

/// Ranked context for a query. Retrieval failures are logged and yield nothing.
pub async fn retrieve_context(
    store: &dyn ChunkStore,
    candidate_id: Uuid,
    query: &str,
    n: usize,
) -> Vec<ContextItem> {
    match store.retrieve(candidate_id, query, n).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Context retrieval failed for candidate {candidate_id}: {e:#}");
            Vec::new()
        }
    }
}

/// Concatenated chunk contents, best first.
pub fn context_text(items: &[ContextItem]) -> String {
    items
        .iter()
        .map(|i| i.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Documentation-oriented context used to seed question generation.
pub async fn project_overview_context(store: &dyn ChunkStore, candidate_id: Uuid) -> String {
    let items = retrieve_context(store, candidate_id, OVERVIEW_QUERY, 3).await;
    let mut overview = String::from("# Project Context\n\n");
    if !items.is_empty() {
        overview.push_str("## Documentation:\n");
        for item in &items {
            overview.push_str(&format!("\n{}\n", item.content));
        }
    }
    overview
}
