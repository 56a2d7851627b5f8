//! Packaging and publishing for device modules.
//!
//! A module is a directory with a `module.prop` descriptor, optional
//! `README.md` and `webroot/`, and (for device installs) `customize.sh`,
//! `service.sh` and `update.json`. This crate turns it into a versioned zip
//! and optionally a GitHub release:
//!
//! - **Metadata** - `module.prop` parsing with lenient or strict key checks
//! - **Staging** - a scoped temporary tree shaped like the on-device layout
//! - **Archive** - external `zip` or in-process writer, plus a build record
//! - **Publish** - `gh release create` behind a mockable trait
//!
//! # Architecture
//!
//! ```text
//! module-package [debug|release]          module-publish
//!     │                                       │
//!     │                                       ├── preflight: zip, gh, gh auth
//!     ├── metadata (lenient)                  ├── metadata (strict)
//!     ├── staging  (device module)            ├── staging  (publish)
//!     ├── archive  → <buildType>/...zip       ├── archive  → releases/<id>-<version>.zip
//!     └── info     → <name>-<version>-info.txt└── publish  → gh release create v<version>
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use module_packager::archive::BuiltinZip;
//! use module_packager::pipeline::{package, ModuleProject};
//! use module_packager::{BuildStamp, BuildType};
//! use std::path::Path;
//!
//! let project = ModuleProject::open(Path::new("."))?;
//! let outcome = package(&project, BuildType::Release, &BuiltinZip::default(), &BuildStamp::now())?;
//! println!("{}", outcome.archive.display());
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod publish;
pub mod stamp;
pub mod staging;

pub use error::{PackError, Result};
pub use metadata::{KeyPolicy, ModuleMetadata};
pub use naming::BuildType;
pub use stamp::BuildStamp;

/// Install the stderr `tracing` subscriber used by the binaries.
///
/// `RUST_LOG` overrides the default `warn` filter.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .try_init();
}
