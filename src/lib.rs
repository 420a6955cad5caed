//! # astvault - syntax tree store for JavaScript/TypeScript projects
//!
//! astvault keeps parsed source files in a small SQLite store:
//! - Projects own files, files own serialized ASTs (cascade on delete)
//! - Tree-sitter based extraction of a single file into a JSON AST
//! - Directory ingestion with optional cryptography keyword filtering
//! - JSON export of every AST recorded for a project

pub mod id;
pub mod model;
pub mod storage;
pub mod extract;
pub mod scan;
pub mod ingest;
pub mod export;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use id::{AstId, FileId, ProjectId};
pub use model::{FileAst, FileEntry, Project, ProjectAst, ProjectFile};
pub use storage::SqliteStore;
pub use extract::{AstExtractor, AstNode, Extraction, Syntax};

/// Result type alias for astvault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for astvault operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}
