//! Status lines for store, project and ingest results

use super::{paint, table, Tone};
use crate::ingest::IngestReport;
use crate::storage::{DbStats, RebuildReport};
use std::path::Path;

/// Result of a command, rendered as one status line
#[derive(Debug, Clone)]
pub enum Outcome<'a> {
    StoreReady { path: &'a Path, journal_mode: &'a str },
    StoreRebuilt { report: &'a RebuildReport, foreign_keys: bool },
    StoreCleared(DbStats),
    ConfigWritten(&'a Path),
    ProjectDeleted(&'a str),
    ProjectMissing(&'a str),
    Exported { asts: usize, path: &'a Path },
    Empty(&'a str),
}

impl Outcome<'_> {
    fn icon(&self) -> &'static str {
        match self {
            Outcome::StoreReady { .. } | Outcome::StoreRebuilt { .. } => "🗄️",
            Outcome::StoreCleared(_) | Outcome::ProjectDeleted(_) => "🗑️",
            Outcome::ConfigWritten(_) => "🔧",
            Outcome::Exported { .. } => "📦",
            Outcome::ProjectMissing(_) | Outcome::Empty(_) => "ℹ️",
        }
    }

    fn tone(&self) -> Tone {
        match self {
            Outcome::ProjectMissing(_) | Outcome::Empty(_) => Tone::Detail,
            _ => Tone::Done,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::StoreReady { path, journal_mode } => {
                format!("Database ready at {} ({} journal)", path.display(), journal_mode)
            }
            Outcome::StoreRebuilt { report, foreign_keys } => format!(
                "{} schema at {} ({} journal, foreign keys {})",
                if report.removed_existing { "Replaced" } else { "Created" },
                report.path.display(),
                report.journal_mode,
                if *foreign_keys { "on" } else { "off" },
            ),
            Outcome::StoreCleared(removed) => format!(
                "Cleared {} projects, {} files, {} ASTs",
                removed.projects, removed.files, removed.asts
            ),
            Outcome::ConfigWritten(path) => format!("Config written to {}", path.display()),
            Outcome::ProjectDeleted(id) => format!("Deleted project {} with its files and ASTs", id),
            Outcome::ProjectMissing(id) => format!("No project with id {}", id),
            Outcome::Exported { asts, path } => format!("Exported {} ASTs to {}", asts, path.display()),
            Outcome::Empty(what) => format!("No {} recorded", what),
        }
    }
}

pub fn report(outcome: Outcome<'_>) {
    println!("{} {}", outcome.icon(), paint(&outcome.message(), outcome.tone()));
}

pub fn heading(text: &str) {
    println!("🚀 {}", paint(text, Tone::Heading));
}

/// Counters, crypto categories and unreadable files of an ingest run
pub fn ingest_summary(report: &IngestReport) {
    println!();
    println!("━{}━", paint("Summary", Tone::Heading));
    let rows = [
        ("Project ID:", report.project_id.to_string()),
        ("Files recorded:", report.files_recorded.to_string()),
        ("ASTs stored:", report.asts_stored.to_string()),
        ("Syntax errors:", report.parse_failures.to_string()),
    ];
    for (label, value) in rows {
        println!("  {} {}", paint(label, Tone::Detail), value);
    }
    if report.skipped > 0 {
        println!("  {} {}", paint("Skipped (no crypto match):", Tone::Detail), report.skipped);
    }

    if report.matches_by_category.values().any(|files| !files.is_empty()) {
        println!("{}", table::categories_table(&report.matches_by_category));
    }

    if !report.failures.is_empty() {
        eprintln!(
            "⚠️ {}",
            paint(&format!("{} files could not be read", report.failures.len()), Tone::Caution)
        );
        for failure in &report.failures {
            eprintln!("  {} {}", failure.path, paint(&failure.error, Tone::Quiet));
        }
    }

    println!("✅ {}", paint("Ingest complete!", Tone::Done));
}
