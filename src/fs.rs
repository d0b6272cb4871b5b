use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::{SyncError, SyncResult};

pub const IGNORE_FILE: &str = ".gitignore";
pub const GIT_DIR: &str = ".git";

/// Coarse exclusion for version-control metadata directories. Matched
/// against directory names, so anything named like `.git` is pruned with
/// its whole subtree.
const VCS_META_GLOB: &str = "*.git*";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Reads `<root>/.gitignore` into a pattern list, in file order. An absent
/// file is an empty list, not an error. Blank lines and `#` comments are
/// dropped, surrounding whitespace is trimmed.
pub fn load_ignore_patterns(root: &Path) -> SyncResult<Vec<String>> {
    let ignore_file = root.join(IGNORE_FILE);
    if !ignore_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&ignore_file)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Enumerates every file and directory under `root` (excluding `root`
/// itself), depth-first with parents before their children. Directories
/// matching [`VCS_META_GLOB`] are pruned together with their subtrees;
/// ignore patterns are applied in a separate pass.
pub fn walk_tree(root: &Path) -> SyncResult<Vec<FileEntry>> {
    let vcs_meta = Pattern::new(VCS_META_GLOB).expect("literal glob");

    let mut entries = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).into_iter();
    for entry in walker.filter_entry(|entry| {
        !(entry.file_type().is_dir() && vcs_meta.matches(&entry.file_name().to_string_lossy()))
    }) {
        let entry = entry.map_err(|err| SyncError::Io(err.into()))?;
        let kind = if entry.file_type().is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        entries.push(FileEntry {
            path: entry.into_path(),
            kind,
        });
    }

    Ok(entries)
}

/// Applies the ignore patterns to a listing rooted at `root`. A pattern
/// with a trailing slash excludes the directory entry and everything below
/// it; any other pattern excludes whole-path glob matches only. Exclusion
/// is monotonic: patterns only ever remove entries.
pub fn filter_ignored(
    entries: Vec<FileEntry>,
    root: &Path,
    patterns: &[String],
) -> SyncResult<Vec<FileEntry>> {
    let root = root.to_string_lossy();
    let root = root.trim_end_matches('/');
    let mut entries = entries;

    for raw in patterns {
        if let Some(dir) = raw.strip_suffix('/') {
            let base = compile(&format!("{root}/{dir}"), raw)?;
            let subtree = compile(&format!("{root}/{dir}/*"), raw)?;
            entries.retain(|entry| {
                let path = entry.path.to_string_lossy();
                !base.matches(&path) && !subtree.matches(&path)
            });
        } else {
            let exact = compile(&format!("{root}/{raw}"), raw)?;
            entries.retain(|entry| !exact.matches(&entry.path.to_string_lossy()));
        }
    }

    Ok(entries)
}

fn compile(glob: &str, origin: &str) -> SyncResult<Pattern> {
    Pattern::new(glob).map_err(|err| SyncError::IgnorePattern {
        pattern: origin.to_string(),
        message: err.msg.to_string(),
    })
}

/// Re-roots `path` from `old_root` onto `new_root`, preserving the relative
/// position. Inputs outside `old_root` are rejected.
pub fn rebase(path: &Path, old_root: &Path, new_root: &Path) -> SyncResult<PathBuf> {
    let rel = path
        .strip_prefix(old_root)
        .map_err(|_| SyncError::InvalidRoot {
            path: path.to_path_buf(),
            root: old_root.to_path_buf(),
        })?;

    Ok(new_root.join(rel))
}

/// [`rebase`] over a listing; same length, same order.
pub fn replace_root(
    paths: &[PathBuf],
    old_root: &Path,
    new_root: &Path,
) -> SyncResult<Vec<PathBuf>> {
    paths
        .iter()
        .map(|path| rebase(path, old_root, new_root))
        .collect()
}

/// One entry of the push plan: a local path paired with where it lands on
/// the remote.
#[derive(Clone, Debug)]
pub struct TransferEntry {
    pub kind: EntryKind,
    pub local_source: PathBuf,
    pub remote_dest: PathBuf,
}

/// The filtered, remapped listing of a repository, in walk order.
pub struct TransferList {
    entries: Vec<TransferEntry>,
}

impl TransferList {
    pub fn new(local_root: &Path, remote_root: &Path) -> SyncResult<Self> {
        let patterns = load_ignore_patterns(local_root)?;
        let kept = filter_ignored(walk_tree(local_root)?, local_root, &patterns)?;

        let locals: Vec<PathBuf> = kept.iter().map(|entry| entry.path.clone()).collect();
        let remotes = replace_root(&locals, local_root, remote_root)?;

        let entries = kept
            .into_iter()
            .zip(remotes)
            .map(|(entry, remote_dest)| TransferEntry {
                kind: entry.kind,
                local_source: entry.path,
                remote_dest,
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TransferEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn paths(entries: &[FileEntry]) -> Vec<PathBuf> {
        entries.iter().map(|entry| entry.path.clone()).collect()
    }

    #[test]
    fn walk_prunes_git_dirs_at_any_depth() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join(".git/HEAD"));
        touch(&root.join("src/lib.rs"));
        touch(&root.join("src/vendored/.git/config"));

        let listed = paths(&walk_tree(root).unwrap());

        assert!(listed.contains(&root.join("src/lib.rs")));
        assert!(listed.contains(&root.join("src/vendored")));
        assert!(!listed.iter().any(|p| p.to_string_lossy().contains("/.git")));
    }

    #[test]
    fn walk_emits_parents_before_children() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a/b/c.txt"));

        let entries = walk_tree(root).unwrap();
        let pos = |p: PathBuf| entries.iter().position(|e| e.path == p).unwrap();

        assert!(pos(root.join("a")) < pos(root.join("a/b")));
        assert!(pos(root.join("a/b")) < pos(root.join("a/b/c.txt")));
    }

    #[test]
    fn gitignored_directory_is_dropped_with_contents() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        touch(&root.join("a.txt"));
        touch(&root.join("b/c.txt"));
        fs::write(root.join(".gitignore"), "b/\n").unwrap();

        let patterns = load_ignore_patterns(root).unwrap();
        let kept = paths(&filter_ignored(walk_tree(root).unwrap(), root, &patterns).unwrap());

        assert!(kept.contains(&root.join("a.txt")));
        assert!(!kept.contains(&root.join("b")));
        assert!(!kept.contains(&root.join("b/c.txt")));
    }

    #[test]
    fn dir_pattern_excludes_arbitrary_depth() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("target/debug/deps/libx.rlib"));
        touch(&root.join("src/main.rs"));

        let patterns = vec!["target/".to_string()];
        let kept = paths(&filter_ignored(walk_tree(root).unwrap(), root, &patterns).unwrap());

        assert!(kept.contains(&root.join("src/main.rs")));
        assert!(!kept.iter().any(|p| p.starts_with(root.join("target"))));
    }

    #[test]
    fn plain_pattern_drops_exact_matches_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("build/out/a.o"));
        touch(&root.join("build.rs"));

        let patterns = vec!["build".to_string()];
        let kept = paths(&filter_ignored(walk_tree(root).unwrap(), root, &patterns).unwrap());

        // only the directory entry itself matches the glob; the similarly
        // named sibling and the children stay
        assert!(!kept.contains(&root.join("build")));
        assert!(kept.contains(&root.join("build.rs")));
        assert!(kept.contains(&root.join("build/out/a.o")));
    }

    #[test]
    fn star_crosses_path_separators() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("x.log"));
        touch(&root.join("sub/y.log"));
        touch(&root.join("sub/keep.txt"));

        let patterns = vec!["*.log".to_string()];
        let kept = paths(&filter_ignored(walk_tree(root).unwrap(), root, &patterns).unwrap());

        assert!(!kept.contains(&root.join("x.log")));
        assert!(!kept.contains(&root.join("sub/y.log")));
        assert!(kept.contains(&root.join("sub/keep.txt")));
    }

    #[test]
    fn invalid_glob_line_surfaces_as_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("a.txt"));

        let patterns = vec!["[".to_string()];
        let err = filter_ignored(walk_tree(root).unwrap(), root, &patterns).unwrap_err();

        assert!(matches!(err, SyncError::IgnorePattern { pattern, .. } if pattern == "["));
    }

    #[test]
    fn load_skips_blanks_and_comments_and_trims() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join(".gitignore"),
            "# build artefacts\n\n  target/  \n*.log\n",
        )
        .unwrap();

        assert_eq!(
            load_ignore_patterns(root).unwrap(),
            vec!["target/".to_string(), "*.log".to_string()]
        );
    }

    #[test]
    fn load_without_ignore_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_ignore_patterns(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn rebase_preserves_relative_position() {
        let remapped = rebase(
            Path::new("/old/a/b.txt"),
            Path::new("/old"),
            Path::new("/new"),
        )
        .unwrap();

        assert_eq!(remapped, PathBuf::from("/new/a/b.txt"));
        assert_eq!(
            remapped.strip_prefix("/new").unwrap(),
            Path::new("/old/a/b.txt").strip_prefix("/old").unwrap()
        );
    }

    #[test]
    fn rebase_rejects_paths_outside_the_root() {
        let err = rebase(
            Path::new("/elsewhere/b.txt"),
            Path::new("/old"),
            Path::new("/new"),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::InvalidRoot { .. }));
    }

    #[test]
    fn replace_root_keeps_length_and_order() {
        let inputs = vec![
            PathBuf::from("/old/z.txt"),
            PathBuf::from("/old/a"),
            PathBuf::from("/old/a/m.txt"),
        ];
        let outputs = replace_root(&inputs, Path::new("/old"), Path::new("/new")).unwrap();

        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/new/z.txt"),
                PathBuf::from("/new/a"),
                PathBuf::from("/new/a/m.txt"),
            ]
        );
    }

    #[test]
    fn transfer_list_pairs_local_and_remote() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        touch(&root.join("a.txt"));
        touch(&root.join("b/c.txt"));

        let list = TransferList::new(root, Path::new("/srv/mirror")).unwrap();

        for entry in list.entries() {
            assert!(entry.remote_dest.starts_with("/srv/mirror"));
            assert_eq!(
                entry.local_source.strip_prefix(root).unwrap(),
                entry.remote_dest.strip_prefix("/srv/mirror").unwrap()
            );
        }
        let dirs: Vec<_> = list
            .entries()
            .iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .map(|e| e.remote_dest.clone())
            .collect();
        assert_eq!(dirs, vec![PathBuf::from("/srv/mirror/b")]);
    }
}
