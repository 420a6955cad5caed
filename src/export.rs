//! Project AST export

use crate::id::ProjectId;
use crate::model::ProjectAst;
use crate::storage::SqliteStore;
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    database: String,
    total_files: usize,
    files: &'a [ProjectAst],
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub total_files: usize,
    pub output_path: PathBuf,
}

/// Write every AST of a project into a single pretty-printed JSON file,
/// labelled with the store it came from.
pub fn export_project(store: &SqliteStore, project_id: &ProjectId, output_path: &Path) -> Result<ExportSummary> {
    let rows = store.get_project_asts(project_id)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let database = store
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());
    let document = ExportDocument {
        database,
        total_files: rows.len(),
        files: &rows,
    };
    std::fs::write(output_path, serde_json::to_string_pretty(&document)?)?;
    tracing::info!("Exported {} ASTs of project {} to {}", rows.len(), project_id, output_path.display());

    Ok(ExportSummary {
        total_files: rows.len(),
        output_path: output_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_writes_all_asts() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::open(&db_path).unwrap();
        let project = store.insert_project("demo").unwrap();
        for name in ["a.ts", "b.ts"] {
            let file = store.insert_file(&project, name).unwrap();
            store.insert_ast(&file, "{\"ok\":true}").unwrap();
        }

        let out = dir.path().join("results/export.json");
        let summary = export_project(&store, &project, &out).unwrap();
        assert_eq!(summary.total_files, 2);

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["database"], db_path.display().to_string());
        assert_eq!(written["total_files"], 2);
        assert_eq!(written["files"].as_array().unwrap().len(), 2);
        assert!(written["files"][0].get("astId").is_some());
        assert!(written["files"][0].get("fileName").is_some());
    }

    #[test]
    fn test_export_unknown_project_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.json");

        let summary = export_project(&store, &ProjectId::from("missing"), &out).unwrap();
        assert_eq!(summary.total_files, 0);

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["database"], ":memory:");
    }
}
