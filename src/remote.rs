use std::path::Path;

use crate::error::SyncResult;

/// The remote filesystem surface the synchroniser runs against. The
/// production implementation is [`crate::ssh::SftpStore`]; tests substitute
/// an in-memory fake.
pub trait RemoteStore {
    /// `Ok(false)` only for confirmed non-existence; every other stat
    /// failure (permissions, dropped channel, ...) is an error.
    fn exists(&self, path: &Path) -> SyncResult<bool>;

    /// Single-level directory creation; the parent must already exist.
    fn mkdir(&self, path: &Path) -> SyncResult<()>;

    /// Uploads one regular file, replacing any previous remote content.
    fn put(&self, local: &Path, remote: &Path) -> SyncResult<()>;
}

impl<S: RemoteStore + ?Sized> RemoteStore for &S {
    fn exists(&self, path: &Path) -> SyncResult<bool> {
        (**self).exists(path)
    }

    fn mkdir(&self, path: &Path) -> SyncResult<()> {
        (**self).mkdir(path)
    }

    fn put(&self, local: &Path, remote: &Path) -> SyncResult<()> {
        (**self).put(local, remote)
    }
}
