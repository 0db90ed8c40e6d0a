//! Layered settings
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tagtree/tagtree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `TAGTREE_*`, nested keys split by `__`
//!    (e.g. `TAGTREE_CHILD__NAME`)

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::editor::ChildTemplate;
use crate::error::{ConfigError, StarterError};
use crate::export;
use crate::model::{self, Tree};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding saved trees
    pub store_dir: PathBuf,
    /// Default child created by add-child
    pub child: ChildTemplate,
    /// JSON document replacing the built-in starter tree
    pub starter: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            child: ChildTemplate::default(),
            starter: None,
        }
    }
}

fn default_store_dir() -> PathBuf {
    ProjectDirs::from("", "", "tagtree")
        .map(|dirs| dirs.data_dir().join("trees"))
        .unwrap_or_else(|| PathBuf::from("tagtree-trees"))
}

/// Get the XDG config directory for tagtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tagtree").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("tagtree.toml"))
}

impl Settings {
    /// Load defaults, global file, `explicit` file and environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("store_dir", defaults.store_dir.to_string_lossy().to_string())?
            .set_default("child.name", defaults.child.name.clone())?
            .set_default("child.data", defaults.child.data.clone())?;

        if let Some(global_path) = global_config_path()
            && global_path.exists()
        {
            debug!(path = %global_path.display(), "global config");
            builder = builder.add_source(File::from(global_path).required(false));
        }
        if let Some(path) = explicit {
            debug!(path = %path.display(), "explicit config");
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("TAGTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// The tree used when no document is supplied.
    pub fn starter_tree(&self) -> Result<Tree, ConfigError> {
        let Some(path) = &self.starter else {
            return Ok(model::starter_tree());
        };
        let load = || -> Result<Tree, StarterError> {
            let text = fs::read_to_string(path)?;
            Ok(export::tree_from_json(&text)?)
        };
        load().map_err(|source| ConfigError::Starter {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_then_child_template_matches_builtin() {
        let s = Settings::default();
        assert_eq!(s.child.name, "New Child");
        assert_eq!(s.child.data, "Data");
        assert!(s.starter.is_none());
    }

    #[test]
    fn given_explicit_file_when_loading_then_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("tagtree.toml");
        fs::write(
            &p,
            "store_dir = \"/tmp/somewhere\"\n[child]\nname = \"Item\"\n",
        )
        .unwrap();
        let s = Settings::load(Some(p.as_path())).expect("load");
        assert_eq!(s.store_dir, PathBuf::from("/tmp/somewhere"));
        assert_eq!(s.child.name, "Item");
        assert_eq!(s.child.data, "Data");
    }

    #[test]
    fn given_missing_explicit_file_when_loading_then_fails() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nope.toml");
        assert!(Settings::load(Some(p.as_path())).is_err());
    }

    #[test]
    fn given_starter_path_then_tree_is_read_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("starter.json");
        fs::write(&p, r#"{"name":"base","children":[{"name":"x","data":"1"}]}"#).unwrap();
        let s = Settings {
            starter: Some(p),
            ..Settings::default()
        };
        let tree = s.starter_tree().unwrap();
        assert_eq!(tree.name(), "base");
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn given_broken_starter_then_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("starter.json");
        fs::write(&p, "{").unwrap();
        let s = Settings {
            starter: Some(p),
            ..Settings::default()
        };
        let err = s.starter_tree().unwrap_err().to_string();
        assert!(err.contains("starter.json"), "{}", err);
    }
}
