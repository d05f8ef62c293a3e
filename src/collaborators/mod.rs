//! External collaborators (spec §6): the object store and relational store
//! the coordinator treats as shared, best-effort-writable resources it does
//! not own. Trait-based so any object store / relational store can stand in
//! (spec's Non-goals: "replaceable by any object store + relational store
//! implementing the interfaces in §6"), mirroring the teacher's
//! `storage::traits::Storage` split between interface and backend.

mod blob;
mod metadata;

pub use blob::{BlobStore, FsBlobStore};
pub use metadata::{PageRecord, PageMetadataStore, SqlitePageMetadataStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage lock poisoned: {0}")]
    Lock(String),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;
