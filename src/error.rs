//! Error taxonomy for packaging and publishing.
//!
//! Every variant is terminal for the invocation that produced it. The
//! binaries wrap these in `anyhow` context and exit non-zero.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors raised while packaging or publishing a module.
#[derive(Debug, Error)]
pub enum PackError {
    /// A required host tool is not installed.
    #[error("missing required host tools:\n{}", format_missing(.tools))]
    ToolMissing {
        /// `(command, install hint)` pairs for every missing tool.
        tools: Vec<(String, String)>,
    },

    /// The release tool is installed but not logged in.
    #[error("{tool} is not authenticated; run `{hint}` first")]
    AuthFailure {
        /// Tool that reported the failure.
        tool: String,
        /// Command the operator should run to authenticate.
        hint: String,
    },

    /// A host tool could not be started.
    #[error("running {tool} failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// The descriptor file could not be read.
    #[error("failed to read descriptor '{}'", .path.display())]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The descriptor lacks keys the strict policy requires.
    #[error("descriptor is missing required keys: {}", .keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    /// Building the staging tree failed.
    #[error("staging failed: {reason}")]
    Staging {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The archiver exited non-zero or produced no output.
    #[error("creating archive '{}' failed: {reason}", .output.display())]
    Archive { output: PathBuf, reason: String },

    /// The release tool exited non-zero.
    #[error("creating release '{tag}' failed: {reason}")]
    Publish { tag: String, reason: String },

    /// `modpack.toml` is unreadable or invalid.
    #[error("invalid configuration '{}': {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl PackError {
    /// Staging failure caused by an I/O error.
    pub(crate) fn staging_io(reason: impl Into<String>, source: std::io::Error) -> Self {
        Self::Staging {
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Single missing tool.
    pub(crate) fn tool_missing(tool: &str, package: &str) -> Self {
        Self::ToolMissing {
            tools: vec![(tool.to_string(), package.to_string())],
        }
    }
}

fn format_missing(tools: &[(String, String)]) -> String {
    tools
        .iter()
        .map(|(t, p)| format!("  {} (install: {})", t, p))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefer stderr from a failed tool, falling back to stdout.
pub(crate) fn captured_output(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return format!("{} ({})", stderr, output.status);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return format!("exited with {}", output.status);
    }
    format!("{} ({})", stdout, output.status)
}
