//! Tables for stored rows

use crate::model::{FileEntry, Project, ProjectAst};
use crate::storage::DbStats;
use std::collections::BTreeMap;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ProjectRow<'a> {
    #[tabled(rename = "Project ID")]
    id: &'a str,
    #[tabled(rename = "Name")]
    name: &'a str,
}

#[derive(Tabled)]
struct FileRow<'a> {
    #[tabled(rename = "File ID")]
    id: &'a str,
    #[tabled(rename = "File")]
    name: &'a str,
}

#[derive(Tabled)]
struct AstRow<'a> {
    #[tabled(rename = "AST ID")]
    id: &'a str,
    #[tabled(rename = "File")]
    file: &'a str,
    #[tabled(rename = "Envelope")]
    status: &'static str,
    #[tabled(rename = "Bytes")]
    bytes: usize,
}

#[derive(Tabled)]
struct StatsRow<'a> {
    #[tabled(rename = "Projects")]
    projects: usize,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "ASTs")]
    asts: usize,
    #[tabled(rename = "Journal")]
    journal_mode: &'a str,
}

#[derive(Tabled)]
struct CategoryRow<'a> {
    #[tabled(rename = "Category")]
    category: &'a str,
    #[tabled(rename = "Files")]
    count: usize,
    #[tabled(rename = "First match")]
    first: &'a str,
}

fn render<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn projects_table(projects: &[Project]) -> String {
    render(projects.iter().map(|p| ProjectRow {
        id: p.project_id.as_str(),
        name: &p.project_name,
    }))
}

pub fn files_table(files: &[FileEntry]) -> String {
    render(files.iter().map(|f| FileRow {
        id: f.file_id.as_str(),
        name: &f.file_name,
    }))
}

/// Stored envelopes with whether they hold a tree or a syntax error
pub fn asts_table(asts: &[ProjectAst]) -> String {
    render(asts.iter().map(|a| AstRow {
        id: a.ast_id.as_str(),
        file: &a.file_name,
        status: if a.ast.starts_with("{\"ok\":true") { "ast" } else { "error" },
        bytes: a.ast.len(),
    }))
}

pub fn stats_table(stats: &DbStats, journal_mode: &str) -> String {
    render([StatsRow {
        projects: stats.projects,
        files: stats.files,
        asts: stats.asts,
        journal_mode,
    }])
}

pub fn categories_table(matches: &BTreeMap<&'static str, Vec<String>>) -> String {
    render(matches.iter().map(|(category, files)| CategoryRow {
        category: *category,
        count: files.len(),
        first: files.first().map(String::as_str).unwrap_or("-"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{AstId, FileId};

    #[test]
    fn test_stats_table_shows_counts() {
        let table = stats_table(&DbStats { projects: 3, files: 12, asts: 11 }, "wal");
        assert!(table.contains("Projects"));
        assert!(table.contains("12"));
        assert!(table.contains("wal"));
    }

    #[test]
    fn test_asts_table_marks_failed_envelopes() {
        let asts = vec![
            ProjectAst {
                ast_id: AstId::from("a1"),
                ast: "{\"ok\":true,\"ast\":{}}".into(),
                file_name: "good.ts".into(),
            },
            ProjectAst {
                ast_id: AstId::from("a2"),
                ast: "{\"ok\":false,\"error\":\"x\"}".into(),
                file_name: "bad.ts".into(),
            },
        ];
        let table = asts_table(&asts);
        let bad_line = table.lines().find(|l| l.contains("bad.ts")).unwrap();
        assert!(bad_line.contains("error"));
        let good_line = table.lines().find(|l| l.contains("good.ts")).unwrap();
        assert!(good_line.contains("ast"));
    }

    #[test]
    fn test_categories_table_lists_every_category() {
        let mut matches = BTreeMap::new();
        matches.insert("hash", vec!["crypto.ts".to_string()]);
        matches.insert("rsa", Vec::new());

        let table = categories_table(&matches);
        assert!(table.contains("crypto.ts"));
        assert!(table.lines().any(|l| l.contains("rsa") && l.contains('-')));
    }

    #[test]
    fn test_files_table_uses_ids() {
        let files = vec![FileEntry { file_id: FileId::from("f1"), file_name: "a.ts".into() }];
        assert!(files_table(&files).contains("f1"));
    }
}
