// src/core/manifest.rs

//! Command definitions read from TOML manifests.
//!
//! A manifest is a list of `[[commands]]` tables, each one a
//! [`CommandDefinition`] with its `[[commands.arguments]]`. Manifests carry no
//! code: the host binds an action to every definition when registering.

use crate::constants::MANIFEST_EXTENSION;
use crate::core::handler::Action;
use crate::core::registry::CommandRegistry;
use crate::core::validator_registry::RegistryError;
use crate::models::CommandDefinition;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

/// Failures reading or parsing manifest files.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The file could not be read.
    #[error("Could not read manifest '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid manifest.
    #[error("Could not parse manifest '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// The directory could not be traversed.
    #[error("Could not scan manifest directory '{path}': {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

/// The deserialized content of one or more manifest files.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Definitions in declaration order.
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
}

impl Manifest {
    /// Appends the commands of `other`, keeping their order.
    pub fn merge(&mut self, other: Self) {
        self.commands.extend(other.commands);
    }

    /// Registers every command, binding each to the action `bind` returns
    /// for it. Stops at the first command that fails to register.
    pub fn register_all<F>(self, registry: &mut CommandRegistry, bind: F) -> Result<usize, RegistryError>
    where
        F: Fn(&CommandDefinition) -> Action,
    {
        let count = self.commands.len();
        for definition in self.commands {
            let action = bind(&definition);
            registry.register(definition, action)?;
        }
        Ok(count)
    }
}

/// Parses manifest text; `origin` only appears in error messages.
pub fn parse_manifest(content: &str, origin: &str) -> Result<Manifest, ManifestError> {
    toml::from_str(content).map_err(|source| ManifestError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Reads and parses a single manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    log::debug!("Loading command manifest: {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_manifest(&content, &path.display().to_string())
}

/// Loads every `*.toml` file below `dir`, in file name order, into one manifest.
pub fn load_manifest_dir(dir: &Path) -> Result<Manifest, ManifestError> {
    let mut manifest = Manifest::default();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| ManifestError::Walk {
            path: dir.display().to_string(),
            source,
        })?;
        let is_manifest = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == MANIFEST_EXTENSION);
        if is_manifest {
            manifest.merge(load_manifest(entry.path())?);
        }
    }
    Ok(manifest)
}

/// Loads `path` as a single manifest file or, if it is a directory, as a tree of them.
pub fn load_manifests(path: &Path) -> Result<Manifest, ManifestError> {
    if path.is_dir() {
        load_manifest_dir(path)
    } else {
        load_manifest(path)
    }
}
