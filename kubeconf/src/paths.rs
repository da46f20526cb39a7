//! Where kubeconfig files live.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ConfigError, Result};

pub const KUBECONFIG: &str = "KUBECONFIG";

/// File names starting with this are picked up by [`discover`].
const CONFIG_PREFIX: &str = "config";

pub fn kube_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
    Ok(home.join(".kube"))
}

pub fn default_kubeconfig() -> Result<PathBuf> {
    Ok(kube_dir()?.join("config"))
}

/// The files to read, in merge order: `explicit` if any were given, else the
/// entries of `kubeconfig_env` (the value of `$KUBECONFIG`), else the default
/// location.
pub fn resolve_sources(
    explicit: &[PathBuf],
    kubeconfig_env: Option<&OsStr>,
) -> Result<Vec<PathBuf>> {
    match configured_sources(explicit, kubeconfig_env) {
        Some(sources) => Ok(sources),
        None => Ok(vec![default_kubeconfig()?]),
    }
}

/// Like [`resolve_sources`] without the default location: `None` when
/// neither `explicit` nor `kubeconfig_env` names a file.
pub fn configured_sources(
    explicit: &[PathBuf],
    kubeconfig_env: Option<&OsStr>,
) -> Option<Vec<PathBuf>> {
    if !explicit.is_empty() {
        return Some(explicit.to_vec());
    }

    let from_env: Vec<PathBuf> = env::split_paths(kubeconfig_env?)
        .filter(|path| !path.as_os_str().is_empty())
        .collect();
    if from_env.is_empty() {
        return None;
    }

    debug!(count = from_env.len(), "using {KUBECONFIG}");
    Some(from_env)
}

/// Every file below `dir` whose name starts with `config`, sorted. Symlinks
/// to files count as files; directories reached through a link are not
/// descended into.
pub fn discover(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| ConfigError::Discover {
            path: dir.to_owned(),
            source,
        })?;
        if entry.path().is_file()
            && entry.file_name().to_string_lossy().starts_with(CONFIG_PREFIX)
        {
            found.push(entry.into_path());
        }
    }

    debug!(dir = %dir.display(), count = found.len(), "discovered kubeconfig files");

    Ok(found)
}
