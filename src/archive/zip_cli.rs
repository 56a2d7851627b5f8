//! External `zip` archiver.

use std::io;
use std::path::Path;

use tracing::debug;

use super::Compressor;
use crate::error::{captured_output, PackError, Result};
use crate::preflight::ZIP_TOOL;
use crate::process::CommandRunner;

/// Runs `zip -r -q <output> <entry>` from the staging root.
#[derive(Debug, Clone, Default)]
pub struct ZipCommand<R> {
    runner: R,
}

impl<R: CommandRunner> ZipCommand<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> Compressor for ZipCommand<R> {
    fn compress(&self, base_dir: &Path, entry: &str, output: &Path) -> Result<()> {
        let args = vec![
            "-r".to_string(),
            "-q".to_string(),
            output.display().to_string(),
            entry.to_string(),
        ];
        debug!("running zip {} in {}", args.join(" "), base_dir.display());

        let result = self
            .runner
            .run(ZIP_TOOL.0, &args, base_dir)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => PackError::tool_missing(ZIP_TOOL.0, ZIP_TOOL.1),
                _ => PackError::Archive {
                    output: output.to_path_buf(),
                    reason: format!("spawning zip: {e}"),
                },
            })?;

        if result.status.success() {
            return Ok(());
        }

        Err(PackError::Archive {
            output: output.to_path_buf(),
            reason: captured_output(&result),
        })
    }

    fn required_tools(&self) -> &'static [(&'static str, &'static str)] {
        &[ZIP_TOOL]
    }
}
