//! Copy helpers for populating a staging tree.

use std::fs::{self, FileTimes};
use std::path::Path;

use crate::error::{PackError, Result};

/// Copy one file, keeping its modification and access times.
pub fn copy_file_preserving_times(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| {
        PackError::staging_io(
            format!("copying '{}' to '{}'", src.display(), dst.display()),
            e,
        )
    })?;

    let meta = fs::metadata(src)
        .map_err(|e| PackError::staging_io(format!("reading metadata of '{}'", src.display()), e))?;
    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }

    fs::File::options()
        .write(true)
        .open(dst)
        .and_then(|file| file.set_times(times))
        .map_err(|e| PackError::staging_io(format!("setting times on '{}'", dst.display()), e))
}

/// Recursively mirror `src` into `dst`.
///
/// - Nested directories are recreated
/// - Symbolic links are preserved, not followed
/// - Regular files keep their timestamps
///
/// `dst` is created if it doesn't exist. Entries already present in `dst`
/// are overwritten.
pub fn mirror_tree(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst).map_err(|e| {
            PackError::staging_io(format!("creating directory '{}'", dst.display()), e)
        })?;
    }

    let entries = fs::read_dir(src)
        .map_err(|e| PackError::staging_io(format!("reading directory '{}'", src.display()), e))?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            PackError::staging_io(format!("iterating directory '{}'", src.display()), e)
        })?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| {
            PackError::staging_io(format!("inspecting '{}'", src_path.display()), e)
        })?;

        if file_type.is_symlink() {
            let target = fs::read_link(&src_path).map_err(|e| {
                PackError::staging_io(format!("reading symlink '{}'", src_path.display()), e)
            })?;
            if dst_path.exists() || dst_path.is_symlink() {
                fs::remove_file(&dst_path).map_err(|e| {
                    PackError::staging_io(format!("replacing '{}'", dst_path.display()), e)
                })?;
            }
            std::os::unix::fs::symlink(&target, &dst_path).map_err(|e| {
                PackError::staging_io(format!("creating symlink '{}'", dst_path.display()), e)
            })?;
        } else if file_type.is_dir() {
            mirror_tree(&src_path, &dst_path)?;
        } else {
            copy_file_preserving_times(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
