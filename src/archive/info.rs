//! Build-info companion file.
//!
//! A human-readable audit record written next to package archives. Nothing
//! reads it back.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{PackError, Result};
use crate::metadata::ModuleMetadata;
use crate::naming::{info_file_name, BuildType};
use crate::stamp::BuildStamp;

/// Write `<name>-<version>-info.txt` into `dest_dir`.
pub fn write_build_info(
    dest_dir: &Path,
    meta: &ModuleMetadata,
    build_type: BuildType,
    stamp: &BuildStamp,
    archive: &Path,
) -> Result<PathBuf> {
    let path = dest_dir.join(info_file_name(meta));
    let fail = |reason: String| PackError::Archive {
        output: path.clone(),
        reason,
    };

    let sha256 = sha256_file(archive)
        .map_err(|e| fail(format!("hashing '{}': {e}", archive.display())))?;
    let content = render_build_info(meta, build_type, stamp, archive, &sha256);
    fs::write(&path, content).map_err(|e| fail(format!("writing build info: {e}")))?;
    Ok(path)
}

fn render_build_info(
    meta: &ModuleMetadata,
    build_type: BuildType,
    stamp: &BuildStamp,
    archive: &Path,
    sha256: &str,
) -> String {
    let archive_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "build type: {}", build_type.label());
    let _ = writeln!(out, "build time: {}", stamp.human());
    let _ = writeln!(out, "archive: {}", archive_name);
    let _ = writeln!(out, "sha256: {}", sha256);
    out.push('\n');
    out.push_str("module info:\n");
    for (key, value) in meta.iter() {
        let _ = writeln!(out, "{}={}", key, value);
    }
    out
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
