//! In-memory reference backends for deskhand.
//!
//! Production deployments implement [`deskhand_core::RecordStore`] and
//! [`deskhand_core::SemanticSearch`] over their real storage and vector
//! services; these implementations keep everything in process for tests
//! and ephemeral sessions.

pub mod index;
pub mod memory;

pub use index::InMemorySearchIndex;
pub use memory::InMemoryTicketStore;
