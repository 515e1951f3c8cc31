//! Pattern file loading

use super::{PatternCatalog, PatternLibrary};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads pattern libraries from `.json`, `.toml` and `.yaml`/`.yml` files
pub struct PatternLoader {
    supported_extensions: Vec<String>,
}

impl PatternLoader {
    pub fn new() -> Self {
        Self {
            supported_extensions: vec![
                "json".to_string(),
                "toml".to_string(),
                "yaml".to_string(),
                "yml".to_string(),
            ],
        }
    }

    /// Load one file holding one or more named patterns
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<PatternLibrary> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file: {:?}", path))?;

        let library = match extension_of(path).as_deref() {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON pattern file: {:?}", path))?,
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML pattern file: {:?}", path))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML pattern file: {:?}", path))?,
            _ => bail!("Unsupported pattern file: {:?}", path),
        };

        Ok(library)
    }

    /// Load a single pattern file, or every pattern file below a directory,
    /// keyed by file stem.
    ///
    /// In a directory, files that cannot be read as a pattern library are
    /// skipped with a warning. A single file must load.
    pub fn load_catalog<P: AsRef<Path>>(&self, path: P) -> Result<PatternCatalog> {
        let path = path.as_ref();

        let (files, skip_invalid) = if path.is_dir() {
            let mut files = Vec::new();
            self.collect_files(path, &mut files)?;
            files.sort();
            (files, true)
        } else if path.is_file() && self.is_supported(path) {
            (vec![path.to_path_buf()], false)
        } else {
            bail!("No pattern files found at {:?}", path);
        };

        let mut catalog = PatternCatalog::new();
        for file in files {
            let Some(stem) = file.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };

            let library = match self.load_file(&file) {
                Ok(library) => library,
                Err(e) if skip_invalid => {
                    warn!("Skipping pattern file {:?}: {:#}", file, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if catalog.insert(stem.clone(), library).is_some() {
                warn!("Pattern key '{}' defined more than once, using {:?}", stem, file);
            }
        }

        debug!("{} pattern librar(ies) loaded from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    fn collect_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;

        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                self.collect_files(&path, files)?;
            } else if self.is_supported(&path) {
                files.push(path);
            }
        }

        Ok(())
    }

    fn is_supported(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.supported_extensions.contains(&ext))
    }
}

impl Default for PatternLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}
