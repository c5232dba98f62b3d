//! Output directory and artifact naming.
//!
//! Every path handed to an external program is relative to the source root
//! (processes run with the source root as their working directory), which
//! keeps invocations readable: `dist/1.2.0/svc` rather than an absolute path.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::BasicConfig;

/// Environment variable that overrides the target OS.
pub const TARGET_OS_ENV: &str = "GOOS";

/// Identifier of the Windows target.
pub const WINDOWS: &str = "windows";

/// Resolve the target OS from an override value, falling back to the host.
pub fn resolve_target_os(override_value: Option<&str>) -> String {
    match override_value.map(str::trim) {
        Some(os) if !os.is_empty() => os.to_string(),
        _ => env::consts::OS.to_string(),
    }
}

/// Resolve the target OS from [`TARGET_OS_ENV`].
pub fn target_os_from_env() -> String {
    resolve_target_os(env::var(TARGET_OS_ENV).ok().as_deref())
}

/// Derives every path and name of one build from `basic`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    output_dir: PathBuf,
    name: String,
    version: String,
    dockerfile: PathBuf,
    target_os: String,
}

impl PathResolver {
    pub fn new(root: &Path, basic: &BasicConfig, target_os: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            output_dir: basic.save_dir.join(&basic.version),
            name: basic.name.clone(),
            version: basic.version.clone(),
            dockerfile: basic.dockerfile_path.clone(),
            target_os: target_os.into(),
        }
    }

    /// Source root all relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `save-dir/version`, relative to the source root.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the versioned output directory (and parents) if missing.
    ///
    /// An existing directory is not an error.
    pub fn ensure_output_dir(&self) -> Result<&Path> {
        let dir = self.root.join(&self.output_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(&self.output_dir)
    }

    pub fn target_os(&self) -> &str {
        &self.target_os
    }

    pub fn is_windows_target(&self) -> bool {
        self.target_os == WINDOWS
    }

    /// `output_dir/name`, with `.exe` for Windows targets.
    pub fn binary_path(&self) -> PathBuf {
        let file = if self.is_windows_target() {
            format!("{}.exe", self.name)
        } else {
            self.name.clone()
        };
        self.output_dir.join(file)
    }

    /// Descriptor path relative to the source root.
    pub fn source_dockerfile(&self) -> &Path {
        &self.dockerfile
    }

    /// Descriptor path once copied into the output directory.
    pub fn staged_dockerfile(&self) -> PathBuf {
        self.output_dir.join(&self.dockerfile)
    }

    /// `name:version`
    pub fn image_tag(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }

    /// `output_dir/name_version.tar`
    pub fn image_tarball(&self) -> PathBuf {
        self.output_dir.join(format!("{}_{}.tar", self.name, self.version))
    }

    /// Resolve a relative path against the source root for filesystem access.
    pub fn on_disk(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
