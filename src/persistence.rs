use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BuilderKind, EditorConfig};
use crate::element::Element;
use crate::util::time;

/// Errors that can occur during document persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize document: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write document: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read snapshot file: {0}")]
    ReadError(String),

    #[error("Snapshot is for the {found:?} builder, expected {expected:?}")]
    WrongBuilder {
        expected: BuilderKind,
        found: BuilderKind,
    },

    #[error("Save rejected: {0}")]
    Rejected(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Receiver of the full document when the user saves. The editor makes no
/// assumption about what happens on the other side.
pub trait SaveSink {
    fn save(&mut self, elements: &[Element]) -> PersistenceResult<()>;
}

impl<F> SaveSink for F
where
    F: FnMut(&[Element]) -> PersistenceResult<()>,
{
    fn save(&mut self, elements: &[Element]) -> PersistenceResult<()> {
        self(elements)
    }
}

/// Serializable copy of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub builder: BuilderKind,
    pub elements: Vec<Element>,
    /// Timestamp of when the snapshot was taken
    pub timestamp: u64,
    /// Version of the application when the snapshot was taken
    pub version: String,
}

impl DocumentSnapshot {
    pub fn new(builder: BuilderKind, elements: &[Element]) -> Self {
        Self {
            builder,
            elements: elements.to_vec(),
            timestamp: time::timestamp_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Unwraps the elements, checking the snapshot belongs to `builder`.
    pub fn into_elements(self, builder: BuilderKind) -> PersistenceResult<Vec<Element>> {
        if self.builder != builder {
            return Err(PersistenceError::WrongBuilder {
                expected: builder,
                found: self.builder,
            });
        }
        if self.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Snapshot version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        Ok(self.elements)
    }
}

/// Stores snapshots as JSON files and rotates autosaves.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    /// Directory where snapshot files are stored
    state_dir: PathBuf,
    builder: BuilderKind,
    /// Maximum number of auto-save files to keep
    max_autosaves: usize,
    /// Interval between auto-saves in seconds
    autosave_interval: u64,
    /// Last auto-save timestamp
    last_autosave: u64,
}

impl StatePersistence {
    pub fn new(state_dir: impl Into<PathBuf>, builder: BuilderKind) -> Self {
        Self {
            state_dir: state_dir.into(),
            builder,
            max_autosaves: 5,
            autosave_interval: 300, // 5 minutes
            last_autosave: 0,
        }
    }

    pub fn from_config(config: &EditorConfig, builder: BuilderKind) -> Self {
        Self {
            max_autosaves: config.max_autosaves,
            autosave_interval: config.autosave_interval_secs,
            ..Self::new(&config.snapshot_dir, builder)
        }
    }

    pub fn builder(&self) -> BuilderKind {
        self.builder
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Save a snapshot of the elements under `name`
    pub fn save_snapshot(&self, name: &str, elements: &[Element]) -> PersistenceResult<()> {
        let snapshot = DocumentSnapshot::new(self.builder, elements);
        let path = self.snapshot_path(name);

        // Create state directory if it doesn't exist
        fs::create_dir_all(&self.state_dir)?;

        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)?;
        log::info!("Saved {} elements to {}", elements.len(), path.display());

        Ok(())
    }

    /// Load a snapshot by name
    pub fn load_snapshot(&self, name: &str) -> PersistenceResult<DocumentSnapshot> {
        let path = self.snapshot_path(name);
        let json = fs::read_to_string(&path)
            .map_err(|e| PersistenceError::ReadError(format!("{}: {}", path.display(), e)))?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Loads the named snapshot's elements for this builder.
    pub fn load_elements(&self, name: &str) -> PersistenceResult<Vec<Element>> {
        self.load_snapshot(name)?.into_elements(self.builder)
    }

    /// Name the main document of this builder is saved under.
    pub fn document_name(&self) -> &'static str {
        match self.builder {
            BuilderKind::Page => "page",
            BuilderKind::Course => "course",
        }
    }

    /// Check if we should auto-save based on the interval
    pub fn should_autosave(&self) -> bool {
        let now = time::timestamp_secs();
        now.saturating_sub(self.last_autosave) >= self.autosave_interval
    }

    /// Perform auto-save if needed. Returns whether a file was written.
    pub fn try_autosave(&mut self, elements: &[Element]) -> PersistenceResult<bool> {
        if !self.should_autosave() {
            return Ok(false);
        }
        let now = time::timestamp_secs();

        // Save with timestamp
        self.save_snapshot(&format!("{}{}", self.autosave_prefix(), now), elements)?;
        self.last_autosave = now;

        // Cleanup old autosaves
        self.cleanup_old_autosaves()?;
        Ok(true)
    }

    /// Find the most recent auto-save, by name without extension
    pub fn find_latest_autosave(&self) -> PersistenceResult<Option<String>> {
        Ok(self.autosaves()?.pop().map(|(_, name)| name))
    }

    /// Clean up old auto-save files
    fn cleanup_old_autosaves(&self) -> PersistenceResult<()> {
        let mut autosaves = self.autosaves()?;

        // Remove oldest files if we have too many
        while autosaves.len() > self.max_autosaves {
            let (path, _) = autosaves.remove(0);
            fs::remove_file(path)?;
        }

        Ok(())
    }

    /// Autosave files oldest first: by modification time, then by name.
    fn autosaves(&self) -> PersistenceResult<Vec<(PathBuf, String)>> {
        if !self.state_dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = self.autosave_prefix();
        let mut autosaves = Vec::new();
        for entry in fs::read_dir(&self.state_dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(stem) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
                continue;
            };
            if !stem.starts_with(&prefix) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            autosaves.push((modified, path, stem));
        }

        autosaves.sort_by(|a, b| (a.0, &a.2).cmp(&(b.0, &b.2)));
        Ok(autosaves
            .into_iter()
            .map(|(_, path, name)| (path, name))
            .collect())
    }

    fn autosave_prefix(&self) -> String {
        format!("autosave_{}_", self.document_name())
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", name))
    }
}

impl SaveSink for StatePersistence {
    fn save(&mut self, elements: &[Element]) -> PersistenceResult<()> {
        self.save_snapshot(self.document_name(), elements)
    }
}
