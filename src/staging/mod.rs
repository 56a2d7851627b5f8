//! Staging tree assembly.
//!
//! A module is staged into a fresh temporary directory shaped the way it
//! lands on the device:
//!
//! ```text
//! <tmp>/
//! └── <id>/
//!     ├── module.prop
//!     ├── README.md        (optional)
//!     ├── customize.sh     (device-module plan)
//!     ├── service.sh       (device-module plan)
//!     ├── update.json      (device-module plan)
//!     ├── .debug           (debug builds)
//!     └── webroot/
//! ```
//!
//! The temporary directory belongs to the returned [`StagingTree`] and is
//! removed when it is dropped, whichever way the caller exits.

pub mod copy;

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::config::PackagerConfig;
use crate::error::{PackError, Result};
use crate::metadata::ModuleMetadata;
use crate::naming::BuildType;
use crate::stamp::BuildStamp;

pub use copy::{copy_file_preserving_times, mirror_tree};

/// Name of the marker file written into debug builds.
pub const DEBUG_MARKER: &str = ".debug";

/// Appended to the staged service script in debug builds.
pub const DEBUG_TOGGLE: &str = "\n# debug output\nset -x\n";

const STAGING_PREFIX: &str = "modpack-";

/// Which source files end up in the staging tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPlan {
    /// Descriptor file, always required.
    pub descriptor: PathBuf,
    /// Files that must exist.
    pub required: Vec<PathBuf>,
    /// Files copied only when present.
    pub optional: Vec<PathBuf>,
    /// Source directory mirrored into `<id>/webroot/` when present.
    pub webroot: PathBuf,
    /// Script that receives [`DEBUG_TOGGLE`] in debug builds.
    pub service_script: Option<PathBuf>,
}

impl StagingPlan {
    /// Descriptor plus optional README.
    pub fn publish(config: &PackagerConfig) -> Self {
        Self {
            descriptor: config.descriptor.clone(),
            required: Vec::new(),
            optional: vec![config.readme.clone()],
            webroot: config.webroot.clone(),
            service_script: None,
        }
    }

    /// Descriptor, device scripts and update descriptor, plus optional README.
    pub fn device_module(config: &PackagerConfig) -> Self {
        Self {
            descriptor: config.descriptor.clone(),
            required: config.device_files.clone(),
            optional: vec![config.readme.clone()],
            webroot: config.webroot.clone(),
            service_script: Some(config.service_script.clone()),
        }
    }
}

/// A populated staging directory.
///
/// Dropping the tree deletes it.
#[derive(Debug)]
pub struct StagingTree {
    dir: TempDir,
    module_id: String,
}

impl StagingTree {
    /// Temporary root that contains `<id>/`.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `<root>/<id>`
    pub fn module_dir(&self) -> PathBuf {
        self.dir.path().join(&self.module_id)
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Remove the tree now, reporting any failure.
    pub fn close(self) -> Result<()> {
        let root = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| {
            PackError::staging_io(format!("removing staging directory '{}'", root.display()), e)
        })
    }
}

/// Assemble a staging tree for `meta` from files under `source_dir`.
pub fn stage_module(
    source_dir: &Path,
    meta: &ModuleMetadata,
    plan: &StagingPlan,
    build_type: BuildType,
    stamp: &BuildStamp,
) -> Result<StagingTree> {
    let module_id = validate_module_id(meta.id())?;

    let dir = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir()
        .map_err(|e| PackError::staging_io("creating temporary staging directory", e))?;
    let tree = StagingTree {
        dir,
        module_id: module_id.to_string(),
    };

    let module_dir = tree.module_dir();
    let webroot_dir = module_dir.join("webroot");
    fs::create_dir_all(&webroot_dir).map_err(|e| {
        PackError::staging_io(format!("creating '{}'", webroot_dir.display()), e)
    })?;

    debug!("staging '{}' into {}", module_id, tree.root().display());

    let mut claimed = HashSet::new();
    for file in std::iter::once(&plan.descriptor).chain(plan.required.iter()) {
        let src = source_dir.join(file);
        if !src.is_file() {
            return Err(PackError::Staging {
                reason: format!("required file not found: {}", src.display()),
                source: None,
            });
        }
        let dest = claim_staged_path(&module_dir, file, &mut claimed)?;
        copy_file_preserving_times(&src, &dest)?;
    }

    for file in &plan.optional {
        let src = source_dir.join(file);
        if !src.is_file() {
            debug!("optional file {} not present; skipping", src.display());
            continue;
        }
        let dest = claim_staged_path(&module_dir, file, &mut claimed)?;
        copy_file_preserving_times(&src, &dest)?;
    }

    let webroot_src = source_dir.join(&plan.webroot);
    if webroot_src.is_dir() {
        mirror_tree(&webroot_src, &webroot_dir)?;
    } else {
        debug!("no webroot at {}; staging empty webroot", webroot_src.display());
    }

    if build_type == BuildType::Debug {
        write_debug_marker(&module_dir, stamp)?;
        if let Some(script) = &plan.service_script {
            append_debug_toggle(&staged_path(&module_dir, script)?)?;
        }
    }

    Ok(tree)
}

/// Write `<module_dir>/.debug` recording when the build was made.
pub fn write_debug_marker(module_dir: &Path, stamp: &BuildStamp) -> Result<()> {
    let marker = module_dir.join(DEBUG_MARKER);
    fs::write(&marker, format!("Debug build created at {}\n", stamp.compact()))
        .map_err(|e| PackError::staging_io(format!("writing '{}'", marker.display()), e))
}

/// Append [`DEBUG_TOGGLE`] to `script` unless it already ends with it.
///
/// Returns whether the script was modified. A missing script is left alone.
pub fn append_debug_toggle(script: &Path) -> Result<bool> {
    if !script.is_file() {
        return Ok(false);
    }
    // Scripts are not required to be UTF-8.
    let content = fs::read(script)
        .map_err(|e| PackError::staging_io(format!("reading '{}'", script.display()), e))?;
    if content.ends_with(DEBUG_TOGGLE.as_bytes()) {
        return Ok(false);
    }

    fs::OpenOptions::new()
        .append(true)
        .open(script)
        .and_then(|mut file| file.write_all(DEBUG_TOGGLE.as_bytes()))
        .map_err(|e| PackError::staging_io(format!("appending to '{}'", script.display()), e))?;
    Ok(true)
}

fn staged_path(module_dir: &Path, file: &Path) -> Result<PathBuf> {
    let name = file.file_name().ok_or_else(|| PackError::Staging {
        reason: format!("'{}' does not name a file", file.display()),
        source: None,
    })?;
    Ok(module_dir.join(name))
}

/// Like [`staged_path`], but fails when another file already took the name.
fn claim_staged_path(
    module_dir: &Path,
    file: &Path,
    claimed: &mut HashSet<OsString>,
) -> Result<PathBuf> {
    let dest = staged_path(module_dir, file)?;
    let name = file.file_name().map(OsString::from).unwrap_or_default();
    if !claimed.insert(name) {
        return Err(PackError::Staging {
            reason: format!(
                "'{}' would overwrite another staged file at '{}'",
                file.display(),
                dest.display()
            ),
            source: None,
        });
    }
    Ok(dest)
}

/// The id names the archive's top directory and is handed to `zip`, so it
/// must be a single plain component that cannot be read as an option.
fn validate_module_id(id: &str) -> Result<&str> {
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !id.starts_with('-') => Ok(id),
        _ => Err(PackError::Staging {
            reason: format!("module id '{}' is not a valid directory name", id),
            source: None,
        }),
    }
}
