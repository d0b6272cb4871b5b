use std::path::PathBuf;

use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("config file not found: {path}")]
    ConfigMissing { path: PathBuf },

    #[error("invalid config file {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("{path} is not a git repository")]
    NotARepository { path: PathBuf },

    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("{path} is not inside the repository {root}")]
    NotInRepository { path: PathBuf, root: PathBuf },

    #[error("{path} does not lie under {root}")]
    InvalidRoot { path: PathBuf, root: PathBuf },

    #[error("invalid ignore pattern '{pattern}': {message}")]
    IgnorePattern { pattern: String, message: String },

    #[error("could not connect to {host}: {message}")]
    Connection { host: String, message: String },

    #[error("host key verification failed for {host}")]
    HostKeyMismatch { host: String },

    #[error("remote operation failed on {path}: {message}")]
    RemoteIo { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
