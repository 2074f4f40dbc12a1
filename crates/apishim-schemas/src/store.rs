//! File-backed store of named configuration documents
//!
//! One document per file in a flat directory; the identifier is the file
//! stem. Writes go through a temporary file in the same directory followed by
//! a rename so readers never see a half-written document.

use crate::loader::{DocumentParser, Format, LoaderError, LoaderResult};
use crate::model::MappingConfig;
use crate::validation::validate_document;
use serde_json::Value;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of loading one document during a bulk load
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: String,
    pub path: PathBuf,
    pub result: LoaderResult<MappingConfig>,
}

/// Directory of configuration documents keyed by identifier
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    parser: DocumentParser,
}

impl ConfigStore {
    /// Open a store over `dir`, creating the directory if needed
    pub fn open<P: Into<PathBuf>>(dir: P) -> LoaderResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| LoaderError::io_error(dir.clone(), e))?;
        Ok(Self {
            dir,
            parser: DocumentParser::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Identifiers of all documents, sorted
    pub fn list_ids(&self) -> LoaderResult<Vec<String>> {
        let mut ids = BTreeSet::new();
        for path in self.document_paths()? {
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_id(id) {
                    ids.insert(id.to_string());
                }
            }
        }
        Ok(ids.into_iter().collect())
    }

    /// Load and validate one document
    pub fn get(&self, id: &str) -> LoaderResult<MappingConfig> {
        let path = self.locate(id)?.ok_or_else(|| LoaderError::not_found(id))?;
        self.parser.load_config(&path)
    }

    /// Validate `raw` and store it as YAML under `id`
    ///
    /// Nothing is written when validation fails. A document previously stored
    /// under the same id in another format is replaced.
    pub fn put(&self, id: &str, raw: &Value) -> LoaderResult<MappingConfig> {
        check_id(id)?;
        let target = self.dir.join(format!("{}.yaml", id));
        let config =
            validate_document(raw).map_err(|e| LoaderError::validation_error(target.clone(), e))?;

        let yaml = self.to_yaml(id, &config)?;
        self.write_atomic(&target, yaml.as_bytes())?;

        for stale in self.candidates(id) {
            if stale != target && stale.exists() {
                std::fs::remove_file(&stale).map_err(|e| LoaderError::io_error(stale.clone(), e))?;
            }
        }

        debug!(id, path = %target.display(), "Stored configuration");
        Ok(config)
    }

    /// Remove a document
    pub fn delete(&self, id: &str) -> LoaderResult<()> {
        let path = self.locate(id)?.ok_or_else(|| LoaderError::not_found(id))?;
        std::fs::remove_file(&path).map_err(|e| LoaderError::io_error(path.clone(), e))?;
        debug!(id, path = %path.display(), "Deleted configuration");
        Ok(())
    }

    /// Canonical YAML rendering of a stored document
    pub fn export_yaml(&self, id: &str) -> LoaderResult<String> {
        let config = self.get(id)?;
        self.to_yaml(id, &config)
    }

    /// Load every document independently
    ///
    /// Fails only when the directory itself cannot be read; a broken document
    /// shows up as an `Err` outcome next to the others.
    pub fn load_all(&self) -> LoaderResult<Vec<LoadOutcome>> {
        let mut paths = self.document_paths()?;
        paths.sort();

        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            if !is_valid_id(&id) {
                warn!(path = %path.display(), "Skipping configuration file with invalid id");
                continue;
            }
            let result = self.parser.load_config(&path);
            outcomes.push(LoadOutcome { id, path, result });
        }
        Ok(outcomes)
    }

    fn to_yaml(&self, id: &str, config: &MappingConfig) -> LoaderResult<String> {
        serde_yaml::to_string(config).map_err(|source| LoaderError::Serialize {
            id: id.to_string(),
            source,
        })
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> LoaderResult<()> {
        let io = |e| LoaderError::io_error(target.to_path_buf(), e);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io)?;
        tmp.write_all(bytes).map_err(io)?;
        tmp.as_file().sync_all().map_err(io)?;
        tmp.persist(target).map_err(|e| io(e.error))?;
        Ok(())
    }

    fn candidates(&self, id: &str) -> Vec<PathBuf> {
        [Format::Yaml, Format::Json]
            .iter()
            .flat_map(|format| format.extensions())
            .map(|ext| self.dir.join(format!("{}.{}", id, ext)))
            .collect()
    }

    fn locate(&self, id: &str) -> LoaderResult<Option<PathBuf>> {
        check_id(id)?;
        Ok(self.candidates(id).into_iter().find(|p| p.is_file()))
    }

    fn document_paths(&self) -> LoaderResult<Vec<PathBuf>> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| LoaderError::io_error(self.dir.clone(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoaderError::io_error(self.dir.clone(), e))?;
            let path = entry.path();
            if path.is_file() && Format::is_supported(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

/// Whether `id` is a legal document identifier
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn check_id(id: &str) -> LoaderResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(LoaderError::InvalidId { id: id.to_string() })
    }
}
