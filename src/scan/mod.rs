//! Source discovery
//!
//! Walks a directory tree and returns the JavaScript/TypeScript sources
//! under it. Hidden entries, `.gitignore`/`.ignore` rules, package manager
//! and bundler output, and user excludes are all skipped.

pub mod crypto;

pub use crypto::CryptoMatcher;

use crate::{Error, Result};
use ignore::overrides::{Override, OverrideBuilder};
use std::path::{Path, PathBuf};

/// Extensions treated as source files
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// Installed packages and build output of the JS toolchain
pub const VENDORED_EXCLUDES: &[&str] = &[
    "node_modules/",
    "bower_components/",
    "jspm_packages/",
    "dist/",
    "build/",
    "out/",
    "coverage/",
    "storybook-static/",
    // Bundler artifacts
    "*.min.js",
    "*.bundle.js",
    "*.chunk.js",
];

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub struct SourceScanner {
    root: PathBuf,
    excludes: Vec<String>,
}

impl SourceScanner {
    pub fn new(root: &Path, excludes: &[String]) -> Self {
        Self {
            root: root.to_path_buf(),
            excludes: excludes.to_vec(),
        }
    }

    /// Source files relative to the root, sorted
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", self.root.display()),
            )));
        }

        let walker = ignore::WalkBuilder::new(&self.root)
            .require_git(false)
            .overrides(self.exclude_overrides()?)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) || !is_source_file(path) {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            files.push(relative.to_path_buf());
        }

        files.sort();
        tracing::debug!("Found {} source files under {}", files.len(), self.root.display());
        Ok(files)
    }

    /// Excludes as negated override globs, which the walker skips without
    /// descending into
    fn exclude_overrides(&self) -> Result<Override> {
        let mut builder = OverrideBuilder::new(&self.root);
        let patterns = VENDORED_EXCLUDES
            .iter()
            .map(|p| p.to_string())
            .chain(self.excludes.iter().cloned());

        for pattern in patterns {
            builder
                .add(&format!("!{}", pattern))
                .map_err(|e| Error::Config(format!("invalid exclude pattern {:?}: {}", pattern, e)))?;
        }

        builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build exclude set: {}", e)))
    }
}

/// Stored file name: relative path with `/` separators
pub fn display_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
