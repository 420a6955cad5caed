//! Directory ingestion
//!
//! Records every source file under a directory as a project file and stores
//! the extraction envelope of each as its AST. A bad file is noted in the
//! report and the run carries on; storage errors abort the run.
//!
//! Every readable file is also classified against the cryptography keyword
//! categories. With `crypto_only`, files without a category are skipped.

use crate::extract::{AstExtractor, Syntax};
use crate::id::ProjectId;
use crate::scan::{self, crypto::CRYPTO_PATTERNS, CryptoMatcher, SourceScanner};
use crate::storage::SqliteStore;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Only record files matching a cryptography keyword category
    pub crypto_only: bool,
    /// Extra gitignore-style exclude patterns
    pub excludes: Vec<String>,
    /// Draw a progress bar on interactive terminals
    pub progress: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub project_id: ProjectId,
    pub files_recorded: usize,
    pub asts_stored: usize,
    /// Files whose envelope was stored with `ok: false`
    pub parse_failures: usize,
    /// Files left out by the crypto filter
    pub skipped: usize,
    pub failures: Vec<IngestFailure>,
    /// Stored file names per crypto category; every category is present
    pub matches_by_category: BTreeMap<&'static str, Vec<String>>,
}

impl IngestReport {
    /// Write the category matches as pretty JSON
    pub fn write_matches(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.matches_by_category)?)?;
        Ok(())
    }
}

pub struct Ingestor<'a> {
    store: &'a SqliteStore,
    extractor: AstExtractor,
    options: IngestOptions,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a SqliteStore, extractor: AstExtractor, options: IngestOptions) -> Self {
        Self { store, extractor, options }
    }

    pub fn run(&self, root: &Path, project_name: &str) -> Result<IngestReport> {
        let files = SourceScanner::new(root, &self.options.excludes).files()?;
        let matcher = CryptoMatcher::new()?;

        let project_id = self.store.insert_project(project_name)?;
        tracing::info!("Ingesting {} files from {} into project {}", files.len(), root.display(), project_id);

        let mut report = IngestReport {
            project_id: project_id.clone(),
            files_recorded: 0,
            asts_stored: 0,
            parse_failures: 0,
            skipped: 0,
            failures: Vec::new(),
            matches_by_category: CRYPTO_PATTERNS.iter().map(|(category, _)| (*category, Vec::new())).collect(),
        };

        let bar = self.progress_bar(files.len());

        for relative in &files {
            let name = scan::display_name(relative);
            bar.set_message(name.clone());
            bar.inc(1);

            let full_path = root.join(relative);
            let bytes = match std::fs::read(&full_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", full_path.display(), e);
                    report.failures.push(IngestFailure { path: name, error: e.to_string() });
                    continue;
                }
            };
            // Legacy encodings still parse; invalid bytes become U+FFFD
            let content = String::from_utf8_lossy(&bytes);

            let categories = matcher.categories(&content);
            if self.options.crypto_only && categories.is_empty() {
                report.skipped += 1;
                continue;
            }
            if !categories.is_empty() {
                tracing::debug!("{} matches {:?}", name, categories);
            }
            for category in categories {
                report.matches_by_category.entry(category).or_default().push(name.clone());
            }

            let file_id = self.store.insert_file(&project_id, &name)?;
            report.files_recorded += 1;

            let extraction = self
                .extractor
                .extract_source(Syntax::for_path(relative), &content)?;
            if let Some(error) = extraction.error() {
                tracing::warn!("Syntax error in {}: {}", name, error);
                report.parse_failures += 1;
            }

            self.store.insert_ast(&file_id, &extraction.to_json_line()?)?;
            report.asts_stored += 1;
        }

        bar.finish_and_clear();
        Ok(report)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.options.progress || !console::Term::stderr().is_term() {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }
}
