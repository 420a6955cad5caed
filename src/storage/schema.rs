//! Database schema definitions
//!
//! Table and column names are camelCase so stores written by earlier tooling
//! remain readable.

/// SQL to create the project table
pub const CREATE_PROJECT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS project (
    projectId TEXT PRIMARY KEY,
    projectName TEXT NOT NULL
)
"#;

/// SQL to create the projectFile table
pub const CREATE_PROJECT_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS projectFile (
    fileId TEXT PRIMARY KEY,
    fileName TEXT NOT NULL,
    projectId TEXT NOT NULL,
    FOREIGN KEY (projectId) REFERENCES project(projectId) ON DELETE CASCADE
)
"#;

/// SQL to create the fileAST table
/// `ast` holds JSON text exactly as it was handed in
pub const CREATE_FILE_AST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS fileAST (
    astId TEXT PRIMARY KEY,
    fileId TEXT NOT NULL,
    ast TEXT NOT NULL,
    FOREIGN KEY (fileId) REFERENCES projectFile(fileId) ON DELETE CASCADE
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_project_file_project ON projectFile(projectId)",
    "CREATE INDEX IF NOT EXISTS idx_file_ast_file ON fileAST(fileId)",
];

/// Tables in child-to-parent order, safe for bulk deletes
pub const TABLES: &[&str] = &["fileAST", "projectFile", "project"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PROJECT_TABLE,
        CREATE_PROJECT_FILE_TABLE,
        CREATE_FILE_AST_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
