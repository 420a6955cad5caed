//! Stored entities and query rows

use crate::id::{AstId, FileId, ProjectId};
use serde::{Deserialize, Serialize};

/// Root entity, owns zero or more files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: ProjectId,
    pub project_name: String,
}

/// A source file recorded under exactly one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub file_id: FileId,
    pub file_name: String,
    pub project_id: ProjectId,
}

/// Serialized AST owned by one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAst {
    pub ast_id: AstId,
    pub file_id: FileId,
    pub ast: String,
}

/// Row returned by `get_project_files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_id: FileId,
    pub file_name: String,
}

/// Row returned by `get_project_asts`: the AST annotated with its file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAst {
    pub ast_id: AstId,
    pub ast: String,
    pub file_name: String,
}
