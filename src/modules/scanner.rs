use crate::modules::gitignore::Gitignore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Depth-first walk of a directory tree collecting files strictly larger than
/// the threshold, honoring the root `.gitignore` and always pruning `.git`.
pub struct Scanner {
    root: PathBuf,
    threshold_bytes: u64,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, threshold_bytes: u64) -> Self {
        Scanner {
            root: root.into(),
            threshold_bytes,
        }
    }

    /// Run the scan. Returns root-relative paths with `/` separators, in
    /// traversal order (entries sorted by name at each level, so a repeat scan
    /// of an unchanged tree yields the identical sequence).
    pub fn scan(&self) -> Result<Vec<String>> {
        let rules = Gitignore::load(&self.root)?;
        let mut found = Vec::new();
        self.walk(&self.root, &rules, &mut found, true)?;
        Ok(found)
    }

    fn walk(
        &self,
        dir: &Path,
        rules: &Gitignore,
        found: &mut Vec<String>,
        is_root: bool,
    ) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if is_root => {
                return Err(e).with_context(|| format!("cannot read directory {}", dir.display()));
            }
            Err(e) => {
                // A nested directory that turned unreadable mid-scan is skipped
                // with its subtree; the scan still completes with partial results.
                debug!("skipping unreadable directory {}: {e}", dir.display());
                return Ok(());
            }
        };

        let mut entries: Vec<fs::DirEntry> = entries.filter_map(|e| e.ok()).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    debug!("skipping {}: {e}", path.display());
                    continue;
                }
            };

            let Some(rel) = relative_slash_path(&path, &self.root) else {
                continue;
            };

            if file_type.is_dir() {
                // Repository metadata is never descended, independent of any
                // ignore rule (a negation cannot re-include it).
                if entry.file_name() == ".git" {
                    continue;
                }
                if rules.should_prune(&rel) {
                    debug!("pruning ignored directory {rel}");
                    continue;
                }
                self.walk(&path, rules, found, false)?;
                continue;
            }

            if rules.is_ignored(&rel, false) {
                continue;
            }

            // Stat through symlinks so a link to a regular file is measured by
            // its target; a vanished or unreadable entry is skipped, never fatal.
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    debug!("skipping {rel}: {e}");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            if meta.len() > self.threshold_bytes {
                found.push(rel);
            }
        }

        Ok(())
    }
}

/// Root-relative path with forward slashes, for portable output.
fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_file(path: &Path, len: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; len]).unwrap();
    }

    #[test]
    fn test_collects_only_files_over_threshold() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("big.bin"), 2048);
        write_file(&dir.path().join("small.txt"), 16);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["big.bin"]);
    }

    #[test]
    fn test_threshold_is_strictly_greater_than() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("exact.bin"), 100);
        write_file(&dir.path().join("over.bin"), 101);

        let found = Scanner::new(dir.path(), 100).scan().unwrap();
        assert_eq!(
            found,
            vec!["over.bin"],
            "a file of exactly the threshold is excluded"
        );
    }

    #[test]
    fn test_ignored_files_skipped_regardless_of_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        write_file(&dir.path().join("debug.log"), 4096);
        write_file(&dir.path().join("data.bin"), 4096);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["data.bin"]);
    }

    #[test]
    fn test_negation_overrides_directory_exclusion() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n!build/keep.bin\n").unwrap();
        write_file(&dir.path().join("build/keep.bin"), 2048);
        write_file(&dir.path().join("build/drop.bin"), 2048);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["build/keep.bin"]);
    }

    #[test]
    fn test_ignored_directory_is_pruned() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
        write_file(&dir.path().join("target/huge.rlib"), 8192);
        write_file(&dir.path().join("src/huge.rs"), 8192);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["src/huge.rs"]);
    }

    #[test]
    fn test_git_directory_never_reported() {
        let dir = tempfile::tempdir().unwrap();
        // Even an explicit negation cannot re-include repository metadata.
        fs::write(dir.path().join(".gitignore"), "!.git\n").unwrap();
        write_file(&dir.path().join(".git/objects/pack/pack-1.pack"), 8192);
        write_file(&dir.path().join("sub/.git/objects/big.pack"), 8192);
        write_file(&dir.path().join("sub/real.bin"), 8192);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["sub/real.bin"]);
    }

    #[test]
    fn test_relative_paths_use_forward_slashes() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a/b/c/deep.bin"), 4096);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["a/b/c/deep.bin"]);
    }

    #[test]
    fn test_traversal_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("zeta.bin"), 2048);
        write_file(&dir.path().join("alpha.bin"), 2048);
        write_file(&dir.path().join("mid/beta.bin"), 2048);

        let scanner = Scanner::new(dir.path(), 1024);
        let first = scanner.scan().unwrap();
        let second = scanner.scan().unwrap();
        assert_eq!(first, second, "repeat scans of an unchanged tree must agree");
        assert_eq!(first, vec!["alpha.bin", "mid/beta.bin", "zeta.bin"]);
    }

    #[test]
    fn test_each_match_appears_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("one.bin"), 2048);
        write_file(&dir.path().join("sub/two.bin"), 2048);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        let mut deduped = found.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(found.len(), deduped.len());
    }

    #[test]
    fn test_missing_gitignore_scans_everything() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("big.bin"), 2048);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["big.bin"]);
    }

    #[test]
    fn test_unreadable_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(Scanner::new(&missing, 1024).scan().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("link")).unwrap();
        write_file(&dir.path().join("real.bin"), 2048);

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["real.bin"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_large_file_measured_by_target() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("data/huge.bin"), 4096);
        std::os::unix::fs::symlink(
            dir.path().join("data/huge.bin"),
            dir.path().join("alias.bin"),
        )
        .unwrap();

        let found = Scanner::new(dir.path(), 1024).scan().unwrap();
        assert_eq!(found, vec!["alias.bin", "data/huge.bin"]);
    }
}
