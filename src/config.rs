//! Optional `modpack.toml` next to the descriptor.
//!
//! Every field is optional; an absent file means all defaults:
//!
//! ```toml
//! descriptor = "module.prop"
//! readme = "README.md"
//! webroot = "webroot"
//! device_files = ["customize.sh", "service.sh", "update.json"]
//! service_script = "service.sh"
//! releases_dir = "releases"
//! archiver = "zip"
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{PackError, Result};

pub const CONFIG_FILENAME: &str = "modpack.toml";

/// Overrides `archiver` when set.
pub const ARCHIVER_ENV: &str = "MODPACK_ARCHIVER";

/// Which [`Compressor`](crate::archive::Compressor) to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiverKind {
    /// External `zip -r`.
    #[default]
    Zip,
    /// In-process writer.
    Builtin,
}

impl ArchiverKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "builtin" => Some(Self::Builtin),
            _ => None,
        }
    }
}

/// Resolved packaging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerConfig {
    pub descriptor: PathBuf,
    pub readme: PathBuf,
    pub webroot: PathBuf,
    pub device_files: Vec<PathBuf>,
    pub service_script: PathBuf,
    pub releases_dir: PathBuf,
    pub archiver: ArchiverKind,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            descriptor: PathBuf::from("module.prop"),
            readme: PathBuf::from("README.md"),
            webroot: PathBuf::from("webroot"),
            device_files: vec![
                PathBuf::from("customize.sh"),
                PathBuf::from("service.sh"),
                PathBuf::from("update.json"),
            ],
            service_script: PathBuf::from("service.sh"),
            releases_dir: PathBuf::from(crate::naming::RELEASES_DIR),
            archiver: ArchiverKind::Zip,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackagerToml {
    descriptor: Option<String>,
    readme: Option<String>,
    webroot: Option<String>,
    device_files: Option<Vec<String>>,
    service_script: Option<String>,
    releases_dir: Option<String>,
    archiver: Option<ArchiverKind>,
}

impl PackagerConfig {
    /// Load `modpack.toml` from `module_dir`, falling back to defaults.
    pub fn load(module_dir: &Path) -> Result<Self> {
        let path = module_dir.join(CONFIG_FILENAME);
        let mut config = if path.is_file() {
            let content = fs::read_to_string(&path).map_err(|e| PackError::Config {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            Self::from_toml(&content, &path)?
        } else {
            Self::default()
        };

        config.apply_archiver_override(std::env::var(ARCHIVER_ENV).ok())?;
        Ok(config)
    }

    /// Apply the value of [`ARCHIVER_ENV`], if it was set.
    fn apply_archiver_override(&mut self, raw: Option<String>) -> Result<()> {
        let Some(raw) = raw else {
            return Ok(());
        };
        self.archiver = ArchiverKind::parse(&raw).ok_or_else(|| PackError::Config {
            path: PathBuf::from(format!("${}", ARCHIVER_ENV)),
            reason: format!("unsupported archiver '{}' (expected 'zip' or 'builtin')", raw),
        })?;
        Ok(())
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let parsed: PackagerToml = toml::from_str(content).map_err(|e| PackError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let defaults = Self::default();
        let rel = |raw: Option<String>, field: &str, default: PathBuf| -> Result<PathBuf> {
            match raw {
                Some(raw) => parse_relative_path(&raw, field, path),
                None => Ok(default),
            }
        };

        let device_files = match parsed.device_files {
            Some(files) => files
                .iter()
                .map(|raw| parse_relative_path(raw, "device_files", path))
                .collect::<Result<Vec<_>>>()?,
            None => defaults.device_files,
        };

        Ok(Self {
            descriptor: rel(parsed.descriptor, "descriptor", defaults.descriptor)?,
            readme: rel(parsed.readme, "readme", defaults.readme)?,
            webroot: rel(parsed.webroot, "webroot", defaults.webroot)?,
            device_files,
            service_script: rel(
                parsed.service_script,
                "service_script",
                defaults.service_script,
            )?,
            releases_dir: rel(parsed.releases_dir, "releases_dir", defaults.releases_dir)?,
            archiver: parsed.archiver.unwrap_or_default(),
        })
    }
}

fn parse_relative_path(raw: &str, field: &str, config_path: &Path) -> Result<PathBuf> {
    let invalid = |reason: String| PackError::Config {
        path: config_path.to_path_buf(),
        reason,
    };

    let candidate = Path::new(raw.trim());
    if candidate.as_os_str().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    if candidate.is_absolute() {
        return Err(invalid(format!(
            "{field} must be relative, got absolute path '{raw}'"
        )));
    }
    for component in candidate.components() {
        if matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return Err(invalid(format!(
                "{field} contains invalid traversal/root component in '{raw}'"
            )));
        }
    }
    Ok(candidate.to_path_buf())
}
