use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::clean::KubeConfig;
use crate::direct;
use crate::error::{ConfigError, Result};

/// Read and validate a single kubeconfig file.
pub fn load(path: impl AsRef<Path>) -> Result<KubeConfig> {
    let path = path.as_ref();

    let content = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_owned(),
        },
        _ => ConfigError::Read {
            path: path.to_owned(),
            source,
        },
    })?;

    let raw: direct::KubeConfig =
        serde_yaml::from_slice(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

    let kc = KubeConfig::try_from(raw).map_err(|source| ConfigError::Schema {
        path: path.to_owned(),
        source,
    })?;

    debug!(
        path = %path.display(),
        clusters = kc.clusters.len(),
        users = kc.users.len(),
        contexts = kc.contexts.len(),
        "loaded kubeconfig"
    );

    Ok(kc)
}

/// Load every path in order, stopping at the first failure.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<KubeConfig>> {
    paths.iter().map(load).collect()
}

/// Write `kc` to `path`, readable by the owner only.
///
/// The document is written to a temporary file next to `path` and renamed
/// over it, so readers see either the old file or the new one.
pub fn save(kc: &KubeConfig, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_owned(),
        source,
    };

    let raw: direct::KubeConfig = kc.clone().into();
    let data = serde_yaml::to_string(&raw).map_err(|source| ConfigError::Serialize {
        path: path.to_owned(),
        source,
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(write_err)?;
    }
    tmp.write_all(data.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;

    debug!(path = %path.display(), bytes = data.len(), "saved kubeconfig");

    Ok(())
}

/// Copy an existing file to `<path>_<timestamp>`. Returns `None` when there
/// is nothing to back up.
///
/// An existing backup is never overwritten: if the name is taken, a `-N`
/// suffix is appended.
pub fn backup(path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    let mut source = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            })
        }
    };

    let now = Local::now().format("%Y%m%dT%H%M%S%.3f").to_string();
    let mut attempt = 0u32;
    let (target, mut copy) = loop {
        let mut name = OsString::from(path.as_os_str());
        name.push(format!("_{now}"));
        if attempt > 0 {
            name.push(format!("-{attempt}"));
        }
        let target = PathBuf::from(name);

        match create_owner_only(&target) {
            Ok(file) => break (target, file),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(ConfigError::Write { path: target, source }),
        }
    };

    io::copy(&mut source, &mut copy)
        .and_then(|_| copy.sync_all())
        .map_err(|source| ConfigError::Write {
            path: target.clone(),
            source,
        })?;

    debug!(from = %path.display(), to = %target.display(), "backed up kubeconfig");

    Ok(Some(target))
}

fn create_owner_only(path: &Path) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
