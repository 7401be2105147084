//! Scenario catalog - loads scenario documents from a directory
//!
//! The catalog scans a directory for `*.json` and `*.toml` files, parses
//! and validates each one, and keeps per-file errors for diagnostics.
//! Entries are ingested into the scenario store at startup.

use std::fs;
use std::path::{Path, PathBuf};

use super::{parse_document, parse_toml_document};
use crate::error::{Error, Result};
use crate::models::ScenarioDocument;

/// A successfully loaded scenario file
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub document: ScenarioDocument,
}

/// Scenario documents discovered on disk
#[derive(Debug)]
pub struct ScenarioCatalog {
    dir: PathBuf,
    entries: Vec<CatalogEntry>,
    load_errors: Vec<(PathBuf, Error)>,
}

impl ScenarioCatalog {
    /// Create an empty catalog
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            entries: Vec::new(),
            load_errors: Vec::new(),
        }
    }

    /// Create and scan a directory for scenarios
    pub fn scan(dir: PathBuf) -> Self {
        let mut catalog = Self::new(dir);
        catalog.rescan();
        catalog
    }

    /// Reload every document in the directory
    pub fn rescan(&mut self) {
        self.entries.clear();
        self.load_errors.clear();

        let paths = match scenario_files(&self.dir) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot read scenario directory");
                self.load_errors.push((self.dir.clone(), e));
                return;
            }
        };

        for path in paths {
            match load_document(&path) {
                Ok(document) => {
                    tracing::info!(path = %path.display(), scenario = %document.name, "Loaded scenario");
                    self.entries.push(CatalogEntry { path, document });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to load scenario");
                    self.load_errors.push((path, e));
                }
            }
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn documents(&self) -> impl Iterator<Item = &ScenarioDocument> {
        self.entries.iter().map(|e| &e.document)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get load errors for diagnostics
    pub fn load_errors(&self) -> &[(PathBuf, Error)] {
        &self.load_errors
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Scenario files in `dir`, sorted by path
fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("toml")
        );
        if path.is_file() && supported {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn load_document(path: &Path) -> Result<ScenarioDocument> {
    let text = fs::read_to_string(path)?;
    let document = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml_document(&text)?,
        _ => parse_document(&text)?,
    };
    document.validate()?;
    Ok(document)
}
