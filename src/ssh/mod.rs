use std::fs::File;
use std::io;
use std::path::Path;

use ssh2::{ErrorCode, Session, Sftp};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteStore;

mod connect;

/// SFTP status `SSH_FX_NO_SUCH_FILE` — the one stat failure that means a
/// plain "absent" instead of an error.
const SFTP_NO_SUCH_FILE: i32 = 2;

/// An authenticated session. Connecting is an explicit step so callers
/// decide when the network round-trips happen; the connection is closed on
/// drop on every exit path.
pub struct SshSession {
    host: String,
    session: Session,
}

impl SshSession {
    pub fn connect(config: &SyncConfig) -> SyncResult<Self> {
        let stream = connect::try_connection(&config.hostname, config.port)?;

        let mut session = Session::new().map_err(|err| SyncError::Connection {
            host: config.hostname.clone(),
            message: err.to_string(),
        })?;
        session.set_tcp_stream(stream);
        session.handshake().map_err(|err| SyncError::Connection {
            host: config.hostname.clone(),
            message: format!("handshake failed: {err}"),
        })?;

        if config.check_host_key {
            connect::verify_host_key(&session, &config.hostname, config.port)?;
        }

        connect::authenticate(&session, config)?;

        Ok(Self {
            host: config.hostname.clone(),
            session,
        })
    }

    pub fn sftp(&self) -> SyncResult<SftpStore> {
        let sftp = self.session.sftp().map_err(|err| SyncError::Connection {
            host: self.host.clone(),
            message: format!("could not open sftp channel: {err}"),
        })?;

        Ok(SftpStore { sftp })
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        let _ = self.session.disconnect(None, "done", None);
    }
}

pub struct SftpStore {
    sftp: Sftp,
}

impl RemoteStore for SftpStore {
    fn exists(&self, path: &Path) -> SyncResult<bool> {
        match self.sftp.stat(path) {
            Ok(_) => Ok(true),
            Err(err) if err.code() == ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => Ok(false),
            Err(err) => Err(remote_io(path, err.to_string())),
        }
    }

    fn mkdir(&self, path: &Path) -> SyncResult<()> {
        self.sftp
            .mkdir(path, 0o755)
            .map_err(|err| remote_io(path, err.to_string()))
    }

    fn put(&self, local: &Path, remote: &Path) -> SyncResult<()> {
        let mut source = File::open(local)?;
        let mut dest = self
            .sftp
            .create(remote)
            .map_err(|err| remote_io(remote, err.to_string()))?;

        io::copy(&mut source, &mut dest).map_err(|err| remote_io(remote, err.to_string()))?;

        Ok(())
    }
}

fn remote_io(path: &Path, message: String) -> SyncError {
    SyncError::RemoteIo {
        path: path.to_path_buf(),
        message,
    }
}
