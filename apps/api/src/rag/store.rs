//! Chunk persistence and retrieval.
//!
//! `AppState` holds an `Arc<dyn ChunkStore>`. The Postgres backend ranks chunks
//! with the database's full-text search; tests use the in-memory backend.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::rag::chunking::CodeChunk;

/// One retrieved chunk, ranked from 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextItem {
    pub content: String,
    pub file_path: String,
    pub relevance_score: f64,
    pub rank: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Drops every chunk previously stored for the candidate, then stores `chunks`.
    async fn replace_chunks(&self, candidate_id: Uuid, chunks: &[CodeChunk]) -> anyhow::Result<usize>;

    /// Top `n` chunks for the candidate, best first. Never errors on an empty index.
    async fn retrieve(&self, candidate_id: Uuid, query: &str, n: usize) -> anyhow::Result<Vec<ContextItem>>;
}

/// Turns free text into an OR-ed `to_tsquery` expression, so a question matches
/// chunks sharing any of its words rather than all of them.
pub fn or_query(text: &str) -> String {
    let mut terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect();
    terms.sort();
    terms.dedup();
    terms.join(" | ")
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres backend
// ────────────────────────────────────────────────────────────────────────────

pub struct PgChunkStore {
    pool: PgPool,
}

impl PgChunkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RankedChunkRow {
    content: String,
    file_path: String,
    relevance_score: f64,
}

#[async_trait]
impl ChunkStore for PgChunkStore {
    async fn replace_chunks(&self, candidate_id: Uuid, chunks: &[CodeChunk]) -> anyhow::Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM code_chunks WHERE candidate_id = $1")
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO code_chunks
                    (id, candidate_id, chunk_id, file_path, chunk_type, language, content, metadata)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(candidate_id)
            .bind(&chunk.chunk_id)
            .bind(&chunk.file_path)
            .bind(chunk.kind.as_str())
            .bind(chunk.language.as_deref())
            .bind(&chunk.content)
            .bind(&chunk.metadata)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(chunks.len())
    }

    async fn retrieve(&self, candidate_id: Uuid, query: &str, n: usize) -> anyhow::Result<Vec<ContextItem>> {
        let rows: Vec<RankedChunkRow> = sqlx::query_as(
            r#"
            SELECT content, file_path,
                   ts_rank(search, to_tsquery('english', $2))::float8 AS relevance_score
            FROM code_chunks
            WHERE candidate_id = $1
            ORDER BY relevance_score DESC, chunk_type DESC, chunk_id
            LIMIT $3
            "#,
        )
        .bind(candidate_id)
        .bind(or_query(query))
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| ContextItem {
                content: row.content,
                file_path: row.file_path,
                relevance_score: row.relevance_score,
                rank: i + 1,
            })
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend (tests)
// ────────────────────────────────────────────────────────────────────────────
