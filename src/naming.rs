//! Deterministic artifact names derived from descriptor fields.

use std::fmt;

use crate::metadata::ModuleMetadata;

/// Default output directory of the publish utility.
pub const RELEASES_DIR: &str = "releases";

/// Which flavour of archive the package utility builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    #[default]
    Debug,
    Release,
}

impl BuildType {
    /// Interpret an optional CLI argument.
    ///
    /// Only `release` (any case) selects a release build; anything else,
    /// including no argument, falls back to debug.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(value) if value.eq_ignore_ascii_case("release") => Self::Release,
            _ => Self::Debug,
        }
    }

    /// Lowercase name, also used as the output directory.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Release => "RELEASE",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<id>-<version>.zip`
pub fn publish_archive_name(meta: &ModuleMetadata) -> String {
    format!("{}-{}.zip", meta.id(), meta.version())
}

/// `<name>-<version>-<versionCode>-<buildType>.zip`
pub fn package_archive_name(meta: &ModuleMetadata, build_type: BuildType) -> String {
    format!(
        "{}-{}-{}-{}.zip",
        meta.name(),
        meta.version(),
        meta.version_code(),
        build_type
    )
}

/// `<name>-<version>-info.txt`
pub fn info_file_name(meta: &ModuleMetadata) -> String {
    format!("{}-{}-info.txt", meta.name(), meta.version())
}

/// Release tag with exactly one leading `v`.
pub fn release_tag(version: &str) -> String {
    format!("v{}", version.trim_start_matches('v'))
}
