//! GitHub release publishing.
//!
//! Releases are created through the `gh` CLI. The tool must be installed
//! and logged in; [`ReleasePublisher::ensure_ready`] checks both before any
//! other work starts.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{captured_output, PackError, Result};
use crate::metadata::ModuleMetadata;
use crate::naming::release_tag;
use crate::preflight::GH_TOOL;
use crate::process::CommandRunner;

/// Everything needed to create one tagged release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub tag: String,
    pub title: String,
    pub notes: String,
    pub asset: PathBuf,
}

impl ReleaseRequest {
    /// Tag `v<version>`, title `<name> <tag>`, notes from `description`.
    pub fn from_metadata(meta: &ModuleMetadata, asset: &Path) -> Self {
        let tag = release_tag(meta.version());
        Self {
            title: format!("{} {}", meta.name(), tag),
            notes: meta.description().to_string(),
            asset: asset.to_path_buf(),
            tag,
        }
    }
}

/// Creates releases on a remote host.
pub trait ReleasePublisher {
    /// Fail with [`PackError::ToolMissing`], [`PackError::ToolFailed`] or
    /// [`PackError::AuthFailure`] when releases cannot be created.
    fn ensure_ready(&self) -> Result<()>;

    /// Create `request.tag` with `request.asset` attached.
    fn create_release(&self, request: &ReleaseRequest) -> Result<()>;
}

/// Publisher backed by the GitHub CLI.
#[derive(Debug, Clone)]
pub struct GhCli<R> {
    runner: R,
    workdir: PathBuf,
}

impl<R: CommandRunner> GhCli<R> {
    /// `workdir` is the repository checkout `gh` resolves the remote from.
    pub fn new(runner: R, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
        }
    }

    fn gh(&self, args: &[&str]) -> Result<std::process::Output> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        debug!("running gh {}", args.join(" "));
        self.runner
            .run(GH_TOOL.0, &args, &self.workdir)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => PackError::tool_missing(GH_TOOL.0, GH_TOOL.1),
                _ => PackError::ToolFailed {
                    tool: GH_TOOL.0.to_string(),
                    reason: e.to_string(),
                },
            })
    }
}

impl<R: CommandRunner> ReleasePublisher for GhCli<R> {
    fn ensure_ready(&self) -> Result<()> {
        let version = self.gh(&["--version"])?;
        if !version.status.success() {
            return Err(PackError::tool_missing(GH_TOOL.0, GH_TOOL.1));
        }

        let auth = self.gh(&["auth", "status"])?;
        if !auth.status.success() {
            debug!("gh auth status: {}", captured_output(&auth));
            return Err(PackError::AuthFailure {
                tool: GH_TOOL.0.to_string(),
                hint: "gh auth login".to_string(),
            });
        }
        Ok(())
    }

    fn create_release(&self, request: &ReleaseRequest) -> Result<()> {
        let asset = request.asset.display().to_string();
        let output = self
            .gh(&[
                "release",
                "create",
                request.tag.as_str(),
                asset.as_str(),
                "--title",
                request.title.as_str(),
                "--notes",
                request.notes.as_str(),
            ])
            .map_err(|e| match e {
                PackError::ToolFailed { tool, reason } => PackError::Publish {
                    tag: request.tag.clone(),
                    reason: format!("spawning {tool}: {reason}"),
                },
                other => other,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(PackError::Publish {
            tag: request.tag.clone(),
            reason: captured_output(&output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{parse_descriptor, KeyPolicy};
    use crate::process::{fake_output, MockCommandRunner};
    use mockall::Sequence;

    fn request() -> ReleaseRequest {
        let meta = parse_descriptor(
            "id=mymod\nname=My Mod\nversion=v1.2\ndescription=Adds = signs\n",
            &KeyPolicy::none(),
        )
        .unwrap();
        ReleaseRequest::from_metadata(&meta, Path::new("/repo/releases/mymod-v1.2.zip"))
    }

    #[test]
    fn test_request_from_metadata() {
        let req = request();
        assert_eq!(req.tag, "v1.2");
        assert_eq!(req.title, "My Mod v1.2");
        assert_eq!(req.notes, "Adds = signs");
        assert_eq!(req.asset, PathBuf::from("/repo/releases/mymod-v1.2.zip"));
    }

    #[test]
    fn test_ready_when_installed_and_authenticated() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        runner
            .expect_run()
            .withf(|program, args, _| program == "gh" && args == ["--version"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(fake_output(0, "gh version 2.40.0", "")));
        runner
            .expect_run()
            .withf(|program, args, _| program == "gh" && args == ["auth", "status"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(fake_output(0, "", "Logged in to github.com")));

        GhCli::new(runner, "/repo").ensure_ready().unwrap();
    }

    #[test]
    fn test_not_installed_is_tool_missing() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _, _| Err(io::Error::from(io::ErrorKind::NotFound)));

        let err = GhCli::new(runner, "/repo").ensure_ready().unwrap_err();
        assert!(matches!(err, PackError::ToolMissing { .. }));
    }

    #[test]
    fn test_spawn_failure_during_readiness_names_gh() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _, _| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let err = GhCli::new(runner, "/repo").ensure_ready().unwrap_err();
        assert!(matches!(err, PackError::ToolFailed { ref tool, .. } if tool == "gh"));
        assert!(!err.to_string().contains("release"));
    }

    #[test]
    fn test_spawn_failure_during_release_keeps_tag() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _, _| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let err = GhCli::new(runner, "/repo").create_release(&request()).unwrap_err();
        match err {
            PackError::Publish { tag, reason } => {
                assert_eq!(tag, "v1.2");
                assert!(reason.starts_with("spawning gh:"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unauthenticated_is_auth_failure() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, args, _| args == ["--version"])
            .returning(|_, _, _| Ok(fake_output(0, "gh version 2.40.0", "")));
        runner
            .expect_run()
            .withf(|_, args, _| args == ["auth", "status"])
            .returning(|_, _, _| {
                Ok(fake_output(1, "", "You are not logged into any GitHub hosts"))
            });

        let err = GhCli::new(runner, "/repo").ensure_ready().unwrap_err();
        assert!(matches!(err, PackError::AuthFailure { .. }));
        assert!(err.to_string().contains("gh auth login"));
    }

    #[test]
    fn test_create_release_arguments() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args, cwd| {
                program == "gh"
                    && args
                        == [
                            "release",
                            "create",
                            "v1.2",
                            "/repo/releases/mymod-v1.2.zip",
                            "--title",
                            "My Mod v1.2",
                            "--notes",
                            "Adds = signs",
                        ]
                    && cwd == Path::new("/repo")
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(fake_output(0, "https://github.com/o/r/releases/tag/v1.2", ""))
            });

        GhCli::new(runner, "/repo").create_release(&request()).unwrap();
    }

    #[test]
    fn test_create_release_failure_carries_stderr() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _, _| {
            Ok(fake_output(1, "", "HTTP 422: Validation Failed (tag already exists)"))
        });

        let err = GhCli::new(runner, "/repo").create_release(&request()).unwrap_err();
        match err {
            PackError::Publish { tag, reason } => {
                assert_eq!(tag, "v1.2");
                assert!(reason.contains("tag already exists"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
