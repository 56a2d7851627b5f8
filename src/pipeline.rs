//! Package and publish workflows.
//!
//! ```text
//! package:  read (lenient) → stage (device module) → zip → info file
//! publish:  gh ready? → read (strict) → stage (publish) → zip → gh release
//! ```
//!
//! The staging tree is dropped before either workflow returns, so no
//! temporary directory outlives the call whether it succeeds or fails.

use std::path::{Path, PathBuf};

use crate::archive::{archive_staging, write_build_info, Compressor};
use crate::config::PackagerConfig;
use crate::error::Result;
use crate::metadata::{
    read_descriptor, KeyPolicy, ModuleMetadata, PUBLISH_KEYS, RECOGNIZED_KEYS,
};
use crate::naming::{package_archive_name, publish_archive_name, BuildType};
use crate::publish::{ReleasePublisher, ReleaseRequest};
use crate::staging::{stage_module, StagingPlan};
use crate::stamp::BuildStamp;

/// A module source directory and its configuration.
#[derive(Debug, Clone)]
pub struct ModuleProject {
    pub root: PathBuf,
    pub config: PackagerConfig,
}

impl ModuleProject {
    /// Open `root`, loading `modpack.toml` if present.
    pub fn open(root: &Path) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            config: PackagerConfig::load(root)?,
        })
    }

    pub fn with_config(root: &Path, config: PackagerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(&self.config.descriptor)
    }
}

/// Result of [`package`].
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub metadata: ModuleMetadata,
    pub archive: PathBuf,
    pub info_file: PathBuf,
}

/// Result of [`publish`].
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub metadata: ModuleMetadata,
    pub archive: PathBuf,
    pub release: ReleaseRequest,
}

/// Build `<root>/<buildType>/<name>-<version>-<versionCode>-<buildType>.zip`
/// and its info file.
pub fn package(
    project: &ModuleProject,
    build_type: BuildType,
    compressor: &dyn Compressor,
    stamp: &BuildStamp,
) -> Result<PackageOutcome> {
    let tag = format!("[package:{}]", build_type);

    let metadata = read_descriptor(
        &project.descriptor_path(),
        &KeyPolicy::lenient(RECOGNIZED_KEYS),
    )?;
    println!(
        "{tag} module: id={}, name={}, version={}, versionCode={}",
        metadata.id(),
        metadata.name(),
        metadata.version(),
        metadata.version_code()
    );

    let dest_dir = project.root.join(build_type.as_str());
    let file_name = package_archive_name(&metadata, build_type);

    let archive = {
        let tree = stage_module(
            &project.root,
            &metadata,
            &StagingPlan::device_module(&project.config),
            build_type,
            stamp,
        )?;
        println!("{tag} staged files in {}", tree.root().display());
        println!(
            "{tag} creating {} archive {}",
            build_type.label(),
            dest_dir.join(&file_name).display()
        );
        let archive = archive_staging(&tree, &dest_dir, &file_name, compressor)?;
        tree.close()?;
        archive
    };
    println!("{tag} archive created: {}", archive.display());

    let info_dir = archive.parent().unwrap_or(&dest_dir).to_path_buf();
    let info_file = write_build_info(&info_dir, &metadata, build_type, stamp, &archive)?;
    println!("{tag} build info written: {}", info_file.display());

    Ok(PackageOutcome {
        metadata,
        archive,
        info_file,
    })
}

/// Build `<root>/releases/<id>-<version>.zip` and publish it.
pub fn publish(
    project: &ModuleProject,
    compressor: &dyn Compressor,
    publisher: &dyn ReleasePublisher,
    stamp: &BuildStamp,
) -> Result<PublishOutcome> {
    publisher.ensure_ready()?;

    let metadata = read_descriptor(&project.descriptor_path(), &KeyPolicy::strict(PUBLISH_KEYS))?;
    println!(
        "[publish] module: id={}, name={}, version={}",
        metadata.id(),
        metadata.name(),
        metadata.version()
    );

    let dest_dir = project.root.join(&project.config.releases_dir);
    let file_name = publish_archive_name(&metadata);

    let archive = {
        let tree = stage_module(
            &project.root,
            &metadata,
            &StagingPlan::publish(&project.config),
            BuildType::Release,
            stamp,
        )?;
        println!("[publish] staged files in {}", tree.root().display());
        let archive = archive_staging(&tree, &dest_dir, &file_name, compressor)?;
        tree.close()?;
        archive
    };
    println!("[publish] archive created: {}", archive.display());

    let release = ReleaseRequest::from_metadata(&metadata, &archive);
    println!("[publish] creating release {}", release.tag);
    publisher.create_release(&release)?;
    println!("[publish] release created: {}", release.tag);

    Ok(PublishOutcome {
        metadata,
        archive,
        release,
    })
}
