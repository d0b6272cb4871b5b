use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::{CheckResult, KnownHostFileKind, Session};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::util::read_from_stdin;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub(super) fn try_connection(hostname: &str, port: u16) -> SyncResult<TcpStream> {
    let host = format!("{hostname}:{port}");
    let addrs = host.to_socket_addrs().map_err(|err| SyncError::Connection {
        host: host.clone(),
        message: err.to_string(),
    })?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }

    Err(SyncError::Connection {
        host,
        message: last_err
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string()),
    })
}

/// Checks the server key against `~/.ssh/known_hosts`. An unknown or
/// changed key is rejected; there is no auto-accept path.
pub(super) fn verify_host_key(session: &Session, hostname: &str, port: u16) -> SyncResult<()> {
    let connection_err = |message: String| SyncError::Connection {
        host: hostname.to_string(),
        message,
    };

    let mut known_hosts = session
        .known_hosts()
        .map_err(|err| connection_err(err.to_string()))?;

    let file = dirs::home_dir()
        .map(|home| home.join(".ssh/known_hosts"))
        .filter(|file| file.exists())
        .ok_or_else(|| SyncError::HostKeyMismatch {
            host: hostname.to_string(),
        })?;
    known_hosts
        .read_file(&file, KnownHostFileKind::OpenSSH)
        .map_err(|err| connection_err(format!("could not read {}: {err}", file.display())))?;

    let (key, _) = session
        .host_key()
        .ok_or_else(|| connection_err("no host key exchanged".to_string()))?;

    match known_hosts.check_port(hostname, port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound | CheckResult::Mismatch | CheckResult::Failure => {
            Err(SyncError::HostKeyMismatch {
                host: hostname.to_string(),
            })
        }
    }
}

/// Authentication ladder: configured key file, then the ssh agent, then a
/// hidden password prompt.
pub(super) fn authenticate(session: &Session, config: &SyncConfig) -> SyncResult<()> {
    if let Some(keyfile) = &config.keyfile {
        return session
            .userauth_pubkey_file(&config.username, None, keyfile, None)
            .map_err(|err| SyncError::Connection {
                host: config.hostname.clone(),
                message: format!("public key authentication failed: {err}"),
            });
    }

    if session.userauth_agent(&config.username).is_ok() {
        return Ok(());
    }

    let password = read_from_stdin(
        true,
        &format!("[{}@{}] password: ", config.username, config.hostname),
    )?;
    session
        .userauth_password(&config.username, &password)
        .map_err(|err| SyncError::Connection {
            host: config.hostname.clone(),
            message: format!("authentication failed: {err}"),
        })
}
