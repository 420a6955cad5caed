//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - project(projectId, projectName)
//! - projectFile(fileId, fileName, projectId) cascading from project
//! - fileAST(astId, fileId, ast) cascading from projectFile

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats, RebuildReport};
