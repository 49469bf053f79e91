use std::path::PathBuf;
use std::process::{Command, Output};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LfsError {
    #[error("failed to run `git {args}`: {source} (is git on PATH?)")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git-lfs installation failed: {stderr}")]
    InstallFailed { stderr: String },

    #[error("failed to track {path} with git-lfs: {stderr}")]
    TrackFailed { path: String, stderr: String },

    #[error("failed to stage {path}: {stderr}")]
    StageFailed { path: String, stderr: String },
}

/// Capability boundary around the git-lfs tooling. Implemented over real
/// subprocesses by [`GitLfsCli`]; tests substitute a double with no process
/// execution.
pub trait LfsGateway {
    /// Idempotent: a no-op when the extension is already present, otherwise
    /// installs it.
    fn ensure_installed(&self) -> Result<(), LfsError>;

    /// Register each path for large-file handling and stage it for commit, in
    /// order. The first failure aborts the whole batch; on success the number
    /// of files registered is returned.
    fn track(&self, paths: &[String]) -> Result<usize, LfsError>;
}

/// Verify the extension, then hand the batch over.
pub fn register(gateway: &impl LfsGateway, paths: &[String]) -> Result<usize, LfsError> {
    gateway.ensure_installed()?;
    gateway.track(paths)
}

/// Gateway implementation shelling out to `git` in a fixed working directory.
pub struct GitLfsCli {
    workdir: PathBuf,
}

impl GitLfsCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        GitLfsCli {
            workdir: workdir.into(),
        }
    }

    fn run_git(&self, args: &[&str]) -> Result<Output, LfsError> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| LfsError::Spawn {
                args: args.join(" "),
                source,
            })
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

impl LfsGateway for GitLfsCli {
    fn ensure_installed(&self) -> Result<(), LfsError> {
        let probe = self.run_git(&["lfs", "version"])?;
        if probe.status.success() {
            debug!("git-lfs already installed");
            return Ok(());
        }

        info!("git-lfs not found, running `git lfs install`");
        let install = self.run_git(&["lfs", "install"])?;
        if install.status.success() {
            info!("git-lfs installed");
            Ok(())
        } else {
            Err(LfsError::InstallFailed {
                stderr: stderr_text(&install),
            })
        }
    }

    fn track(&self, paths: &[String]) -> Result<usize, LfsError> {
        for path in paths {
            let track = self.run_git(&["lfs", "track", path])?;
            if !track.status.success() {
                return Err(LfsError::TrackFailed {
                    path: path.clone(),
                    stderr: stderr_text(&track),
                });
            }

            let stage = self.run_git(&["add", path])?;
            if !stage.status.success() {
                return Err(LfsError::StageFailed {
                    path: path.clone(),
                    stderr: stderr_text(&stage),
                });
            }

            debug!("added to git-lfs: {path}");
        }

        info!("total files added to git-lfs: {}", paths.len());
        Ok(paths.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
