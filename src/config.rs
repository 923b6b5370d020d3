use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::DEFAULT_HISTORY_LIMIT;
use crate::registry::{ElementRegistry, RegistryError};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "funnel_builder.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Which builder the editor is driving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderKind {
    #[default]
    Page,
    Course,
}

impl BuilderKind {
    pub const ALL: [BuilderKind; 2] = [BuilderKind::Page, BuilderKind::Course];

    pub fn label(self) -> &'static str {
        match self {
            Self::Page => "Page Builder",
            Self::Course => "Course Builder",
        }
    }

    pub fn built_in_registry(self) -> ElementRegistry {
        match self {
            Self::Page => ElementRegistry::page_blocks(),
            Self::Course => ElementRegistry::course_outline(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing keys fall back to the defaults below
pub struct EditorConfig {
    pub builder: BuilderKind,
    /// JSON catalog replacing the page builder's built-in blocks.
    pub page_catalog: Option<PathBuf>,
    /// JSON catalog replacing the course builder's built-in outline types.
    pub course_catalog: Option<PathBuf>,
    /// Directory for saved and autosaved snapshots.
    pub snapshot_dir: PathBuf,
    pub autosave_interval_secs: u64,
    pub max_autosaves: usize,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            builder: BuilderKind::Page,
            page_catalog: None,
            course_catalog: None,
            snapshot_dir: PathBuf::from("snapshots"),
            autosave_interval_secs: 300, // 5 minutes
            max_autosaves: 5,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Loads `path` when given, otherwise the default file if it exists,
    /// otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Registry for a builder: the configured catalog file or the built-in one.
    pub fn registry_for(&self, builder: BuilderKind) -> Result<ElementRegistry, ConfigError> {
        let catalog = match builder {
            BuilderKind::Page => self.page_catalog.as_ref(),
            BuilderKind::Course => self.course_catalog.as_ref(),
        };
        match catalog {
            Some(path) => {
                log::info!("Loading {} catalog from {}", builder.label(), path.display());
                Ok(ElementRegistry::load(path)?)
            }
            None => Ok(builder.built_in_registry()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "builder": "course", "max_autosaves": 2 }"#).unwrap();
        assert_eq!(config.builder, BuilderKind::Course);
        assert_eq!(config.max_autosaves, 2);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.snapshot_dir, PathBuf::from("snapshots"));
    }

    #[test]
    fn rejects_unknown_builder() {
        assert!(matches!(
            EditorConfig::from_json(r#"{ "builder": "webinar" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_catalog_file_is_a_registry_error() {
        let config = EditorConfig {
            page_catalog: Some(PathBuf::from("/definitely/not/here.json")),
            ..EditorConfig::default()
        };
        assert!(matches!(
            config.registry_for(BuilderKind::Page),
            Err(ConfigError::Registry(RegistryError::Io(_)))
        ));
        assert!(config.registry_for(BuilderKind::Course).is_ok());
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = EditorConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
