//! Configuration for one synchronisation target, read from
//! `.sync_repo.conf` at the repository root. Flat key/value file:
//!
//! ```yaml
//! hostname: build-box.example.net
//! username: kai
//! port: 22
//! keyfile: ~/.ssh/id_ed25519
//! remotepath: /data/mirrors/myrepo
//! localpath: ~/src/myrepo
//! ```
//!
//! `keyfile` is optional (agent or password authentication otherwise), as
//! is `check_host_key` (defaults to on).

use std::env;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SyncError, SyncResult};
use crate::fs::GIT_DIR;
use crate::util::expand_tilde;

pub const CONFIG_FILE: &str = ".sync_repo.conf";

#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    pub hostname: String,
    pub username: String,
    pub port: u16,
    #[serde(default)]
    pub keyfile: Option<PathBuf>,
    pub remotepath: PathBuf,
    pub localpath: PathBuf,
    #[serde(default = "default_check_host_key")]
    pub check_host_key: bool,
}

fn default_check_host_key() -> bool {
    true
}

impl SyncConfig {
    /// Reads the given config file, or discovers one from the current
    /// directory when none is given.
    pub fn load(explicit: Option<PathBuf>) -> SyncResult<Self> {
        let path = match explicit {
            Some(path) => path,
            None => Self::discover(&env::current_dir()?)?,
        };

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => SyncError::ConfigMissing {
                path: path.to_path_buf(),
            },
            _ => SyncError::Io(err),
        })?;

        let mut config: SyncConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|err| {
                SyncError::ConfigInvalid {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }
            })?;

        config.localpath = expand_tilde(&config.localpath);
        config.keyfile = config.keyfile.as_deref().map(expand_tilde);
        config.validate()?;

        Ok(config)
    }

    /// Walks upward from `start` to the nearest directory containing
    /// `.git` and expects the config file there.
    pub fn discover(start: &Path) -> SyncResult<PathBuf> {
        let mut dir = start;
        loop {
            if dir.join(GIT_DIR).exists() {
                let config_path = dir.join(CONFIG_FILE);
                if config_path.exists() {
                    return Ok(config_path);
                }
                return Err(SyncError::ConfigMissing { path: config_path });
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => {
                    return Err(SyncError::NotARepository {
                        path: start.to_path_buf(),
                    })
                }
            }
        }
    }

    /// Local-side fail-fast checks; the remote base is checked once a
    /// session exists.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.localpath.exists() {
            return Err(SyncError::PathNotFound {
                path: self.localpath.clone(),
            });
        }
        if !self.localpath.join(GIT_DIR).exists() {
            return Err(SyncError::NotARepository {
                path: self.localpath.clone(),
            });
        }

        Ok(())
    }
}
