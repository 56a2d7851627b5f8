//! Preflight checks for packaging and publishing.
//!
//! Validates that the host has the external tools a run needs before any
//! file is read or staged.
//!
//! # Example
//!
//! ```rust
//! use module_packager::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("zip") {
//!     println!("zip not installed");
//! }
//!
//! let tools = &[("zip", "zip"), ("gh", "gh (GitHub CLI)")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use crate::error::{PackError, Result};

/// `zip`, used by the external archiver.
pub const ZIP_TOOL: (&str, &str) = ("zip", "zip");

/// GitHub CLI, used by the publisher.
pub const GH_TOOL: (&str, &str) = ("gh", "gh (GitHub CLI, https://cli.github.com)");

/// Check if a command exists on the host system.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Check that specific tools are available.
///
/// Each tuple is `(command, package)`. Every missing tool is reported in a
/// single [`PackError::ToolMissing`].
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<(String, String)> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .map(|(tool, package)| (tool.to_string(), package.to_string()))
        .collect();

    if !missing.is_empty() {
        return Err(PackError::ToolMissing { tools: missing });
    }

    Ok(())
}
