use std::path::Path;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::fs::{rebase, EntryKind, TransferList};
use crate::progress::ProgressView;
use crate::remote::RemoteStore;

/// Pushes a repository (or one file of it) to a remote store. Holds no
/// state between calls; every invocation recomputes its listing.
pub struct Synchronizer<'c, S: RemoteStore> {
    config: &'c SyncConfig,
    store: S,
}

impl<'c, S: RemoteStore> Synchronizer<'c, S> {
    /// Fails fast when the remote base path is missing, before anything is
    /// transferred.
    pub fn new(config: &'c SyncConfig, store: S) -> SyncResult<Self> {
        if !store.exists(&config.remotepath)? {
            return Err(SyncError::PathNotFound {
                path: config.remotepath.clone(),
            });
        }

        Ok(Self { config, store })
    }

    /// Full sync: every directory that passed the filter is created when
    /// absent, every file is uploaded unconditionally. The first failure
    /// aborts the remaining batch.
    pub fn sync_repo(&self) -> SyncResult<()> {
        let list = TransferList::new(&self.config.localpath, &self.config.remotepath)?;
        let total = list.entries().len();

        let mut progress = ProgressView::start("Synchronising repository");
        for (done, entry) in list.entries().iter().enumerate() {
            let result = match entry.kind {
                // walk order guarantees the parent was created earlier in
                // this same pass, so one level is enough
                EntryKind::Dir => self.mkdir_if_absent(&entry.remote_dest),
                EntryKind::File => self.store.put(&entry.local_source, &entry.remote_dest),
            };

            if let Err(err) = result {
                progress.failure(&entry.local_source.display().to_string());
                return Err(err);
            }

            progress.step(done + 1, total, &entry.local_source.display().to_string());
        }
        progress.success(&format!("{total} entries"));

        Ok(())
    }

    /// Single-file sync: the target must exist inside the configured local
    /// root; missing remote parent directories are created first.
    pub fn sync_file(&self, local: &Path) -> SyncResult<()> {
        let local = std::path::absolute(local)?;
        if !local.starts_with(&self.config.localpath) {
            return Err(SyncError::NotInRepository {
                path: local,
                root: self.config.localpath.clone(),
            });
        }
        if !local.exists() {
            return Err(SyncError::PathNotFound { path: local });
        }

        let remote = rebase(&local, &self.config.localpath, &self.config.remotepath)?;
        if let Some(parent) = remote.parent() {
            self.ensure_remote_dir(parent)?;
        }

        self.store.put(&local, &remote)
    }

    fn mkdir_if_absent(&self, dir: &Path) -> SyncResult<()> {
        if !self.store.exists(dir)? {
            self.store.mkdir(dir)?;
        }

        Ok(())
    }

    /// Creates `dir` and any missing ancestors. Scans upward until an
    /// existing ancestor is found, then creates the collected chain
    /// nearest-to-root first.
    fn ensure_remote_dir(&self, dir: &Path) -> SyncResult<()> {
        let mut missing = Vec::new();
        let mut cursor = dir;

        while !self.store.exists(cursor)? {
            missing.push(cursor.to_path_buf());
            match cursor.parent() {
                Some(parent) => cursor = parent,
                None => break,
            }
        }

        for dir in missing.iter().rev() {
            self.store.mkdir(dir)?;
        }

        Ok(())
    }
}
