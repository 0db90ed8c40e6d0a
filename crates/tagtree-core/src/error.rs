use std::io;

use thiserror::Error;

use crate::model::NodePath;

/// Rejection of a single edit. The caller's tree is never touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("invalid path {path}: no node at index {index} (level {level})")]
    InvalidPath {
        path: NodePath,
        level: usize,
        index: usize,
    },

    #[error("invalid name: must not be empty")]
    InvalidName,
}

/// Failure to rebuild a tree from a [`crate::export::Document`].
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("invalid document json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node at {path} has an empty name")]
    EmptyName { path: NodePath },

    #[error("node at {path} has both children and data")]
    ConflictingPayload { path: NodePath },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("tree {0} not found")]
    NotFound(u64),

    #[error("store io: {0}")]
    Io(#[from] io::Error),

    #[error("store record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored tree is malformed: {0}")]
    Document(#[from] DocumentError),

    #[error("writing backup archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("starter tree {path}: {source}")]
    Starter {
        path: std::path::PathBuf,
        #[source]
        source: StarterError,
    },
}

#[derive(Error, Debug)]
pub enum StarterError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
