//! In-process zip writer.
//!
//! Used when the host has no `zip` binary or when byte-stable output is
//! wanted: entries are walked in sorted order and directories are recorded
//! explicitly, so an empty `webroot/` survives extraction.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::Compressor;
use crate::error::{PackError, Result};

/// Deflate-compressed archive written with the `zip` crate.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinZip {
    /// Deflate level, 0-9.
    pub level: i64,
}

impl Default for BuiltinZip {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl Compressor for BuiltinZip {
    fn compress(&self, base_dir: &Path, entry: &str, output: &Path) -> Result<()> {
        let fail = |reason: String| PackError::Archive {
            output: output.to_path_buf(),
            reason,
        };

        let file = File::create(output).map_err(|e| fail(format!("creating archive: {e}")))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options_for = |mode: u32| {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.level))
                .unix_permissions(mode & 0o7777)
        };

        for item in WalkDir::new(base_dir.join(entry)).sort_by_file_name() {
            let item = item.map_err(|e| fail(format!("walking staging tree: {e}")))?;
            let rel = item
                .path()
                .strip_prefix(base_dir)
                .map_err(|e| fail(format!("entry outside staging root: {e}")))?;
            let name = archive_name(rel);
            let meta = fs::symlink_metadata(item.path())
                .map_err(|e| fail(format!("reading '{}': {e}", item.path().display())))?;
            let options = options_for(meta.permissions().mode());

            let file_type = item.file_type();
            if file_type.is_dir() {
                zip.add_directory(name, options)
                    .map_err(|e| fail(format!("adding directory: {e}")))?;
            } else if file_type.is_symlink() {
                let target = fs::read_link(item.path()).map_err(|e| {
                    fail(format!("reading symlink '{}': {e}", item.path().display()))
                })?;
                zip.add_symlink(name, target.to_string_lossy().into_owned(), options)
                    .map_err(|e| fail(format!("adding symlink: {e}")))?;
            } else {
                zip.start_file(name, options).map_err(|e| fail(format!("adding file: {e}")))?;
                let mut src = File::open(item.path())
                    .map_err(|e| fail(format!("opening '{}': {e}", item.path().display())))?;
                io::copy(&mut src, &mut zip)
                    .map_err(|e| fail(format!("compressing '{}': {e}", item.path().display())))?;
            }
        }

        zip.finish().map_err(|e| fail(format!("finalizing archive: {e}")))?;
        Ok(())
    }
}

/// Zip entry names always use `/`.
fn archive_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
