//! SQLite storage implementation

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error};
use crate::id::{AstId, FileId, ProjectId};
use crate::model::{FileAst, FileEntry, Project, ProjectAst, ProjectFile};
use super::schema;

/// SQLite-backed storage for projects, files and their ASTs
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open a database file, creating it and its tables if absent.
    /// Existing rows are left untouched.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn, path: Some(path.to_path_buf()) };
        store.configure()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.configure()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Destroy whatever store lives at `path` and create an empty one.
    ///
    /// There is no backup and no confirmation; callers own that decision.
    pub fn rebuild(path: &Path) -> Result<(Self, RebuildReport)> {
        let removed_existing = Self::destroy(path)?;
        if removed_existing {
            tracing::info!("Removed existing database at {}", path.display());
        }

        let store = Self::open(path)?;
        let report = RebuildReport {
            path: path.to_path_buf(),
            removed_existing,
            journal_mode: store.journal_mode()?,
        };
        tracing::info!("Created schema at {} (journal mode: {})", path.display(), report.journal_mode);
        Ok((store, report))
    }

    /// Remove the database file and its WAL sidecars.
    /// Returns whether a database file was present.
    pub fn destroy(path: &Path) -> Result<bool> {
        let existed = path.exists();
        for candidate in std::iter::once(path.to_path_buf()).chain(sidecar_paths(path)) {
            match std::fs::remove_file(&candidate) {
                Ok(()) => tracing::debug!("Removed {}", candidate.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(existed)
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Enable foreign keys and write-ahead logging on this connection
    fn configure(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        let mode: String = self.conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!("journal_mode = {}", mode);
        Ok(())
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Current journal mode, lower case (`wal`, or `memory` for in-memory stores)
    pub fn journal_mode(&self) -> Result<String> {
        let mode: String = self.conn.pragma_query_value(None, "journal_mode", |row| row.get(0))?;
        Ok(mode.to_lowercase())
    }

    /// Whether foreign key enforcement is active on this connection
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let enabled: i64 = self.conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
        Ok(enabled == 1)
    }

    // ========== Project Operations ==========

    /// Insert a project and return its generated id
    pub fn insert_project(&self, name: &str) -> Result<ProjectId> {
        let id = ProjectId::generate();
        self.conn.execute(
            "INSERT INTO project (projectId, projectName) VALUES (?1, ?2)",
            params![id, name],
        )?;
        tracing::debug!("Inserted project {} ({})", id, name);
        Ok(id)
    }

    /// Get a project by id
    pub fn get_project(&self, project_id: &ProjectId) -> Result<Option<Project>> {
        self.conn
            .query_row(
                "SELECT projectId, projectName FROM project WHERE projectId = ?1",
                [project_id],
                |row| {
                    Ok(Project {
                        project_id: row.get(0)?,
                        project_name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// All projects in storage order
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare("SELECT projectId, projectName FROM project")?;
        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    project_id: row.get(0)?,
                    project_name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    /// Delete a project together with its files and their ASTs.
    /// Unknown ids are a no-op; returns whether a project row was removed.
    pub fn delete_project(&self, project_id: &ProjectId) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM project WHERE projectId = ?1", [project_id])?;
        tracing::debug!("Deleted project {} ({} row)", project_id, deleted);
        Ok(deleted > 0)
    }

    // ========== File Operations ==========

    /// Record a file under a project and return its generated id
    pub fn insert_file(&self, project_id: &ProjectId, file_name: &str) -> Result<FileId> {
        let id = FileId::generate();
        self.conn
            .execute(
                "INSERT INTO projectFile (fileId, fileName, projectId) VALUES (?1, ?2, ?3)",
                params![id, file_name, project_id],
            )
            .map_err(|e| constraint_error(e, || format!("project {} does not exist", project_id)))?;
        tracing::debug!("Inserted file {} ({}) under project {}", id, file_name, project_id);
        Ok(id)
    }

    /// Get a file by id
    pub fn get_file(&self, file_id: &FileId) -> Result<Option<ProjectFile>> {
        self.conn
            .query_row(
                "SELECT fileId, fileName, projectId FROM projectFile WHERE fileId = ?1",
                [file_id],
                |row| {
                    Ok(ProjectFile {
                        file_id: row.get(0)?,
                        file_name: row.get(1)?,
                        project_id: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Files belonging to a project; empty for unknown projects
    pub fn get_project_files(&self, project_id: &ProjectId) -> Result<Vec<FileEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT fileId, fileName FROM projectFile WHERE projectId = ?1"
        )?;

        let files = stmt
            .query_map([project_id], |row| {
                Ok(FileEntry {
                    file_id: row.get(0)?,
                    file_name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(files)
    }

    // ========== AST Operations ==========

    /// Store AST text for a file. The text is kept verbatim and is not
    /// checked for being JSON.
    pub fn insert_ast(&self, file_id: &FileId, ast_json: &str) -> Result<AstId> {
        let id = AstId::generate();
        self.conn
            .execute(
                "INSERT INTO fileAST (astId, fileId, ast) VALUES (?1, ?2, ?3)",
                params![id, file_id, ast_json],
            )
            .map_err(|e| constraint_error(e, || format!("file {} does not exist", file_id)))?;
        tracing::debug!("Inserted AST {} for file {} ({} bytes)", id, file_id, ast_json.len());
        Ok(id)
    }

    /// Get an AST row by id
    pub fn get_ast(&self, ast_id: &AstId) -> Result<Option<FileAst>> {
        self.conn
            .query_row(
                "SELECT astId, fileId, ast FROM fileAST WHERE astId = ?1",
                [ast_id],
                |row| {
                    Ok(FileAst {
                        ast_id: row.get(0)?,
                        file_id: row.get(1)?,
                        ast: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Every AST stored under any file of the project, with the file name
    pub fn get_project_asts(&self, project_id: &ProjectId) -> Result<Vec<ProjectAst>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT fileAST.astId, fileAST.ast, projectFile.fileName
            FROM fileAST
            JOIN projectFile ON fileAST.fileId = projectFile.fileId
            WHERE projectFile.projectId = ?1
            "#,
        )?;

        let asts = stmt
            .query_map([project_id], |row| {
                Ok(ProjectAst {
                    ast_id: row.get(0)?,
                    ast: row.get(1)?,
                    file_name: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(asts)
    }

    // ========== Bulk Operations ==========

    /// Delete all rows from every table, keeping the schema
    pub fn clear_all(&self) -> Result<()> {
        for table in schema::TABLES {
            self.conn.execute(&format!("DELETE FROM {}", table), [])?;
        }
        Ok(())
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            projects: self.count("project")?,
            files: self.count("projectFile")?,
            asts: self.count("fileAST")?,
        })
    }
}

/// Outcome of a forced rebuild
#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub path: PathBuf,
    pub removed_existing: bool,
    pub journal_mode: String,
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbStats {
    pub projects: usize,
    pub files: usize,
    pub asts: usize,
}

fn sidecar_paths(path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    ["-wal", "-shm"].into_iter().map(move |suffix| {
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    })
}

/// Turn constraint failures into `Error::Constraint`, pass everything else through
fn constraint_error(err: rusqlite::Error, describe: impl FnOnce() -> String) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                Error::Constraint(describe())
            } else {
                Error::Constraint(msg.unwrap_or_else(|| e.to_string()))
            }
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_has_no_files() {
        let store = SqliteStore::open_in_memory().unwrap();
        let project = store.insert_project("demo").unwrap();

        assert!(store.get_project_files(&project).unwrap().is_empty());
        assert!(store.get_project_asts(&project).unwrap().is_empty());
    }

    #[test]
    fn test_project_file_ast_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let project = store.insert_project("demo").unwrap();
        let file = store.insert_file(&project, "a.ts").unwrap();
        let ast = store.insert_ast(&file, "{\"type\":\"Module\"}").unwrap();

        let files = store.get_project_files(&project).unwrap();
        assert_eq!(files, vec![FileEntry { file_id: file.clone(), file_name: "a.ts".into() }]);

        let asts = store.get_project_asts(&project).unwrap();
        assert_eq!(asts.len(), 1);
        assert_eq!(asts[0].ast_id, ast);
        assert_eq!(asts[0].ast, "{\"type\":\"Module\"}");
        assert_eq!(asts[0].file_name, "a.ts");
    }

    #[test]
    fn test_ast_text_is_stored_verbatim() {
        let store = SqliteStore::open_in_memory().unwrap();
        let project = store.insert_project("demo").unwrap();
        let file = store.insert_file(&project, "broken.js").unwrap();

        let ast = store.insert_ast(&file, "not json at all").unwrap();
        let row = store.get_ast(&ast).unwrap().unwrap();
        assert_eq!(row.ast, "not json at all");
        assert_eq!(row.file_id, file);
    }

    #[test]
    fn test_delete_project_cascades() {
        let store = SqliteStore::open_in_memory().unwrap();

        let project = store.insert_project("demo").unwrap();
        let other = store.insert_project("other").unwrap();
        let file = store.insert_file(&project, "a.ts").unwrap();
        let ast = store.insert_ast(&file, "{}").unwrap();
        let kept_file = store.insert_file(&other, "b.ts").unwrap();
        store.insert_ast(&kept_file, "{}").unwrap();

        assert!(store.delete_project(&project).unwrap());

        assert!(store.get_project(&project).unwrap().is_none());
        assert!(store.get_project_files(&project).unwrap().is_empty());
        assert!(store.get_project_asts(&project).unwrap().is_empty());
        assert!(store.get_file(&file).unwrap().is_none());
        assert!(store.get_ast(&ast).unwrap().is_none());

        assert_eq!(store.stats().unwrap(), DbStats { projects: 1, files: 1, asts: 1 });
    }

    #[test]
    fn test_delete_unknown_project_is_noop() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_project("demo").unwrap();

        assert!(!store.delete_project(&ProjectId::from("missing")).unwrap());
        assert_eq!(store.stats().unwrap().projects, 1);
    }

    #[test]
    fn test_insert_file_requires_project() {
        let store = SqliteStore::open_in_memory().unwrap();

        let err = store.insert_file(&ProjectId::from("missing"), "a.ts").unwrap_err();
        assert!(matches!(err, Error::Constraint(_)), "unexpected error: {err}");
        assert_eq!(store.stats().unwrap().files, 0);
    }

    #[test]
    fn test_insert_ast_requires_file() {
        let store = SqliteStore::open_in_memory().unwrap();

        let err = store.insert_ast(&FileId::from("missing"), "{}").unwrap_err();
        assert!(matches!(err, Error::Constraint(_)));
        assert_eq!(store.stats().unwrap().asts, 0);
    }

    #[test]
    fn test_same_name_projects_are_distinct() {
        let store = SqliteStore::open_in_memory().unwrap();

        let a = store.insert_project("demo").unwrap();
        let b = store.insert_project("demo").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list_projects().unwrap().len(), 2);
    }

    #[test]
    fn test_clear_all_keeps_schema() {
        let store = SqliteStore::open_in_memory().unwrap();
        let project = store.insert_project("demo").unwrap();
        let file = store.insert_file(&project, "a.ts").unwrap();
        store.insert_ast(&file, "{}").unwrap();

        store.clear_all().unwrap();
        assert_eq!(store.stats().unwrap(), DbStats { projects: 0, files: 0, asts: 0 });

        store.insert_project("again").unwrap();
        assert!(store.foreign_keys_enabled().unwrap());
    }

    #[test]
    fn test_open_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        let project = {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_project("demo").unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let found = store.get_project(&project).unwrap().unwrap();
        assert_eq!(found.project_name, "demo");
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_rebuild_replaces_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_project("demo").unwrap();
        }

        let (store, report) = SqliteStore::rebuild(&path).unwrap();
        assert!(report.removed_existing);
        assert_eq!(report.journal_mode, "wal");
        assert!(store.foreign_keys_enabled().unwrap());
        assert_eq!(store.stats().unwrap(), DbStats { projects: 0, files: 0, asts: 0 });
    }

    #[test]
    fn test_rebuild_without_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");

        let (_store, report) = SqliteStore::rebuild(&path).unwrap();
        assert!(!report.removed_existing);
        assert!(path.exists());
    }

    #[test]
    fn test_destroy_removes_database_and_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        std::fs::write(&path, b"db").unwrap();
        let sidecars: Vec<PathBuf> = sidecar_paths(&path).collect();
        for sidecar in &sidecars {
            std::fs::write(sidecar, b"stale").unwrap();
        }

        assert!(SqliteStore::destroy(&path).unwrap());
        assert!(!path.exists());
        for sidecar in &sidecars {
            assert!(!sidecar.exists(), "{} left behind", sidecar.display());
        }

        // Nothing left to remove
        assert!(!SqliteStore::destroy(&path).unwrap());
    }

    #[test]
    fn test_rebuild_discards_stale_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let wal = dir.path().join("store.db-wal");
        let shm = dir.path().join("store.db-shm");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_project("demo").unwrap();
        }
        std::fs::write(&wal, b"stale wal pages").unwrap();
        std::fs::write(&shm, b"stale shm index").unwrap();

        let (store, report) = SqliteStore::rebuild(&path).unwrap();
        assert!(report.removed_existing);
        for (sidecar, stale) in [(&wal, &b"stale wal pages"[..]), (&shm, &b"stale shm index"[..])] {
            if let Ok(content) = std::fs::read(sidecar) {
                assert_ne!(content, stale, "{} survived the rebuild", sidecar.display());
            }
        }
        assert_eq!(store.stats().unwrap(), DbStats { projects: 0, files: 0, asts: 0 });
    }
}
