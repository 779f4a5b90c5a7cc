//! In-memory semantic index — a pure-Rust stand-in for the vector backend.
//!
//! Embeds text as hashed bag-of-words term frequencies and ranks by cosine
//! similarity. Good enough for tests and demos; a production deployment
//! swaps in a real embedding service behind the same `SemanticSearch`
//! contract.

use async_trait::async_trait;
use deskhand_core::error::SearchError;
use deskhand_core::search::{ScoredMatch, SemanticSearch};
use deskhand_core::ticket::Ticket;
use tokio::sync::RwLock;

/// Dimensionality of the hashed bag-of-words space.
const EMBED_DIM: usize = 128;

struct Doc {
    id: String,
    title: String,
    body: String,
    embedding: Vec<f32>,
}

/// An in-memory semantic index over two independent document sets:
/// historical tickets and knowledge-base articles.
#[derive(Default)]
pub struct InMemorySearchIndex {
    tickets: RwLock<Vec<Doc>>,
    articles: RwLock<Vec<Doc>>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched or zero vectors. For term-frequency vectors
/// the result is always in [0, 1].
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    (dot / denom) as f32
}

/// Hash a token into the embedding space (FNV-1a).
fn token_bucket(token: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in token.bytes() {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % EMBED_DIM as u64) as usize
}

fn embed_text(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBED_DIM];
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
    {
        v[token_bucket(token)] += 1.0;
    }
    v
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a ticket under its number.
    pub async fn index_ticket(&self, ticket: &Ticket) {
        let text = ticket.search_text();
        self.tickets.write().await.push(Doc {
            id: ticket.number.to_string(),
            title: ticket.subject.clone(),
            body: ticket.description.clone(),
            embedding: embed_text(&text),
        });
    }

    /// Index a knowledge-base article.
    pub async fn index_article(&self, id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) {
        let title = title.into();
        let body = body.into();
        let text = format!("{title} {body}");
        self.articles.write().await.push(Doc {
            id: id.into(),
            title,
            body,
            embedding: embed_text(&text),
        });
    }

    async fn query(docs: &RwLock<Vec<Doc>>, vector: &[f32], limit: usize) -> Vec<ScoredMatch> {
        let docs = docs.read().await;
        let mut scored: Vec<ScoredMatch> = docs
            .iter()
            .map(|doc| ScoredMatch {
                id: doc.id.clone(),
                title: doc.title.clone(),
                body: doc.body.clone(),
                score: cosine_similarity(&doc.embedding, vector),
            })
            .filter(|m| m.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }
}

#[async_trait]
impl SemanticSearch for InMemorySearchIndex {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        Ok(embed_text(text))
    }

    async fn query_tickets(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredMatch>, SearchError> {
        Ok(Self::query(&self.tickets, vector, limit).await)
    }

    async fn query_articles(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredMatch>, SearchError> {
        Ok(Self::query(&self.articles, vector, limit).await)
    }
}
