//! Per-project container configuration.
//!
//! A project is described by an `ahab.json` file. The file is looked up in
//! the working directory and then in each ancestor, unless a path is given
//! explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_FILE_NAME, CONTAINER_NAME_PREFIX};
use crate::error::{AhabError, Result};
use crate::types::{ContainerIdentity, PermissionPolicy};

/// Contents of an `ahab.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerConfig {
    /// Explicit container name.
    pub name: Option<String>,
    /// Image the container is built from.
    pub image: Option<String>,
    /// User to run interactive sessions as.
    pub user: Option<String>,
    /// Default-user injection settings.
    pub permissions: Permissions,
}

/// The `permissions` section of `ahab.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    /// Disables injection of the default container user.
    pub disable: bool,
}

/// A configuration together with the file it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path of the configuration file.
    pub path: PathBuf,
    /// Parsed configuration.
    pub config: ContainerConfig,
}

impl LoadedConfig {
    /// Resolves the container this configuration targets.
    ///
    /// Uses `name` when set, otherwise derives one from the directory that
    /// holds the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`AhabError::Config`] if no non-empty name can be produced.
    pub fn identity(&self) -> Result<ContainerIdentity> {
        if let Some(name) = self.config.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return ContainerIdentity::new(name);
        }

        let dir_name = self
            .path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if dir_name.is_empty() {
            return Err(AhabError::Config {
                message: format!(
                    "cannot derive a container name from {}; set \"name\"",
                    self.path.display()
                ),
            });
        }
        ContainerIdentity::new(format!("{CONTAINER_NAME_PREFIX}{}", sanitize(&dir_name)))
    }

    /// Returns the permission policy for interactive sessions.
    #[must_use]
    pub fn policy(&self) -> PermissionPolicy {
        PermissionPolicy {
            override_user: self.config.user.clone(),
            disable_default_user: self.config.permissions.disable,
        }
    }
}

/// Replaces characters the runtime rejects in container names.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Finds the nearest `ahab.json` at or above `start`.
#[must_use]
pub fn discover(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns [`AhabError::Io`] if the file cannot be read, or
/// [`AhabError::Config`] if it is not valid configuration JSON.
pub fn load_from(path: &Path) -> Result<LoadedConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AhabError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: ContainerConfig =
        serde_json::from_str(&content).map_err(|e| AhabError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
    tracing::debug!(path = %path.display(), image = ?config.image, "loaded configuration");
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config,
    })
}

/// Loads the explicit configuration file, or discovers one from the
/// current working directory.
///
/// # Errors
///
/// Returns [`AhabError::Config`] if no configuration file exists, and any
/// error from [`load_from`].
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return load_from(path);
    }
    let cwd = std::env::current_dir().map_err(|e| AhabError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    let path = discover(&cwd).ok_or_else(|| AhabError::Config {
        message: format!(
            "no {CONFIG_FILE_NAME} found in {} or any parent directory",
            cwd.display()
        ),
    })?;
    load_from(&path)
}
