//! Semantic search contract — the read-only collaborator behind the
//! search gateway.
//!
//! The backend (embedding model + vector index) is a black box. The core
//! only sees the narrow query interface here; the in-memory reference
//! implementation lives in `deskhand-store`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// What kind of content a search hit points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    /// A historical support ticket.
    Ticket,
    /// A knowledge-base article.
    Article,
}

impl std::fmt::Display for HitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ticket => write!(f, "ticket"),
            Self::Article => write!(f, "article"),
        }
    }
}

/// One ranked match from a semantic search, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Content type of the match.
    pub kind: HitKind,
    /// Backend identifier (ticket number or article id).
    pub id: String,
    /// Title or subject line.
    pub title: String,
    /// Short excerpt for display.
    pub excerpt: String,
    /// Similarity score in [0, 1], higher is closer.
    pub score: f32,
}

/// A raw scored match as returned by the search backend, before it is
/// shaped into a [`SearchHit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// Backend identifier.
    pub id: String,
    /// Title or subject.
    pub title: String,
    /// Matched body text (truncated to an excerpt by the gateway).
    pub body: String,
    /// Cosine similarity in [0, 1].
    pub score: f32,
}

/// The semantic search backend contract.
///
/// `embed` converts text into the backend's vector space; the two query
/// methods return ranked matches from independent indexes. Both queries
/// are read-only and may run concurrently within one agent run.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Embed free text into the backend's vector space.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError>;

    /// Query the historical-ticket index.
    async fn query_tickets(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredMatch>, SearchError>;

    /// Query the knowledge-base article index.
    async fn query_articles(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredMatch>, SearchError>;
}

impl ScoredMatch {
    /// Shape this raw match into a display-ready hit, truncating the body
    /// to `excerpt_len` characters on a char boundary.
    pub fn into_hit(self, kind: HitKind, excerpt_len: usize) -> SearchHit {
        let excerpt = if self.body.chars().count() > excerpt_len {
            let cut: String = self.body.chars().take(excerpt_len).collect();
            format!("{cut}…")
        } else {
            self.body
        };
        SearchHit {
            kind,
            id: self.id,
            title: self.title,
            excerpt,
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_hit_truncates_long_bodies() {
        let m = ScoredMatch {
            id: "kb-1".into(),
            title: "VPN setup".into(),
            body: "a".repeat(500),
            score: 0.9,
        };
        let hit = m.into_hit(HitKind::Article, 200);
        assert_eq!(hit.kind, HitKind::Article);
        assert_eq!(hit.excerpt.chars().count(), 201); // 200 chars + ellipsis
        assert!(hit.excerpt.ends_with('…'));
    }

    #[test]
    fn into_hit_keeps_short_bodies() {
        let m = ScoredMatch {
            id: "101".into(),
            title: "Login issue".into(),
            body: "Cannot log in".into(),
            score: 0.5,
        };
        let hit = m.into_hit(HitKind::Ticket, 200);
        assert_eq!(hit.excerpt, "Cannot log in");
    }
}
