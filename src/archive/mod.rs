//! Archive creation from a staging tree.
//!
//! - [`zip_cli`] - wrapper around the external `zip` tool
//! - [`builtin`] - in-process writer built on the `zip` crate
//! - [`info`] - plain-text build record written next to package archives
//!
//! Both archivers implement [`Compressor`]; callers pick one with
//! [`ArchiverKind`](crate::config::ArchiverKind).

pub mod builtin;
pub mod info;
pub mod zip_cli;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ArchiverKind;
use crate::error::{PackError, Result};
use crate::process::SystemRunner;
use crate::staging::StagingTree;

pub use builtin::BuiltinZip;
pub use info::write_build_info;
pub use zip_cli::ZipCommand;

/// Compresses a directory into a single archive.
pub trait Compressor {
    /// Archive `base_dir/entry` into `output` so that extracting it yields
    /// `entry/...`. `output` is absolute.
    fn compress(&self, base_dir: &Path, entry: &str, output: &Path) -> Result<()>;

    /// Host tools this compressor needs, as `(command, package)` pairs.
    fn required_tools(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

impl<C: Compressor + ?Sized> Compressor for Box<C> {
    fn compress(&self, base_dir: &Path, entry: &str, output: &Path) -> Result<()> {
        (**self).compress(base_dir, entry, output)
    }

    fn required_tools(&self) -> &'static [(&'static str, &'static str)] {
        (**self).required_tools()
    }
}

/// Build the compressor selected by configuration.
pub fn compressor_for(kind: ArchiverKind) -> Box<dyn Compressor> {
    match kind {
        ArchiverKind::Zip => Box::new(ZipCommand::new(SystemRunner)),
        ArchiverKind::Builtin => Box::new(BuiltinZip::default()),
    }
}

/// Archive the staged module into `dest_dir/file_name`.
///
/// `dest_dir` is created when missing and any previous archive with the
/// same name is replaced. Returns the absolute archive path.
pub fn archive_staging(
    tree: &StagingTree,
    dest_dir: &Path,
    file_name: &str,
    compressor: &dyn Compressor,
) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir).map_err(|e| PackError::Archive {
        output: dest_dir.to_path_buf(),
        reason: format!("creating output directory: {e}"),
    })?;
    let dest_dir = fs::canonicalize(dest_dir).map_err(|e| PackError::Archive {
        output: dest_dir.to_path_buf(),
        reason: format!("resolving output directory: {e}"),
    })?;
    let output = dest_dir.join(file_name);

    if output.exists() {
        fs::remove_file(&output).map_err(|e| PackError::Archive {
            output: output.clone(),
            reason: format!("removing previous archive: {e}"),
        })?;
    }

    compressor.compress(tree.root(), tree.module_id(), &output)?;

    if !output.is_file() {
        return Err(PackError::Archive {
            output,
            reason: "archiver finished but produced no file".to_string(),
        });
    }

    Ok(output)
}
