//! Build configuration.
//!
//! Decoded once from `docker-image-build.yaml` (kebab-case keys) and never
//! mutated afterwards. Unknown keys are ignored. Optional sections
//! (`toolchain`, `log`, `pipeline`) have defaults so a file with only
//! `basic`, `copy-file` and `copy-dir` stays valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::copy_rule::CopyRule;

/// Default configuration file name, looked up in the source root.
pub const DEFAULT_CONFIG_FILE: &str = "docker-image-build.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    pub basic: BasicConfig,
    #[serde(default)]
    pub copy_file: Vec<CopyRule>,
    #[serde(default)]
    pub copy_dir: Vec<CopyRule>,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BasicConfig {
    /// Base output directory, relative to the source root.
    pub save_dir: PathBuf,
    /// Artifact and image base name.
    pub name: String,
    /// Version segment of the output path and image tag.
    pub version: String,
    /// Build descriptor, relative to the source root.
    #[serde(rename = "dockerfile")]
    pub dockerfile_path: PathBuf,
    /// Gate for the SaveImage stage.
    #[serde(rename = "auto-save-file", default)]
    pub auto_persist_image: bool,
    /// Gate for the CleanupImage stage.
    #[serde(default)]
    pub auto_delete_image: bool,
}

/// External programs driven by the pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainConfig {
    #[serde(default = "default_compiler")]
    pub compiler: String,
    #[serde(default = "default_engine")]
    pub engine: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            engine: default_engine(),
        }
    }
}

fn default_compiler() -> String {
    "go".to_string()
}

fn default_engine() -> String {
    "docker".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}

fn default_true() -> bool {
    true
}

/// What the driver does when a stage fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and run every remaining stage.
    #[default]
    Continue,
    /// Stop after the first failed stage.
    Halt,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Exit non-zero when any stage failed.
    #[serde(default)]
    pub strict_exit: bool,
}

impl BuildConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let basic = &self.basic;

        for (key, value) in [("name", &basic.name), ("version", &basic.version)] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("basic.{} must not be empty", key)));
            }
        }
        // `name:version` is the image tag; a ':' in either half makes it ambiguous.
        // `name` may carry a namespace (`myorg/svc`), `version` is one path segment.
        if basic.name.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "basic.name '{}' must not contain ':'",
                basic.name
            )));
        }
        if basic.version.contains(['/', '\\', ':']) {
            return Err(ConfigError::Invalid(format!(
                "basic.version '{}' must not contain '/', '\\' or ':'",
                basic.version
            )));
        }
        if basic.save_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("basic.save-dir must not be empty".into()));
        }
        if basic.dockerfile_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("basic.dockerfile must not be empty".into()));
        }
        if self.toolchain.compiler.trim().is_empty() || self.toolchain.engine.trim().is_empty() {
            return Err(ConfigError::Invalid("toolchain programs must not be empty".into()));
        }
        Ok(())
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        let basic = &self.basic;
        println!("Configuration:");
        println!("  save-dir:          {}", basic.save_dir.display());
        println!("  name:              {}", basic.name);
        println!("  version:           {}", basic.version);
        println!("  dockerfile:        {}", basic.dockerfile_path.display());
        println!("  auto-save-file:    {}", basic.auto_persist_image);
        println!("  auto-delete-image: {}", basic.auto_delete_image);
        println!("  compiler:          {}", self.toolchain.compiler);
        println!("  engine:            {}", self.toolchain.engine);
        println!("  on-failure:        {:?}", self.pipeline.on_failure);
        println!("  strict-exit:       {}", self.pipeline.strict_exit);
        if self.copy_file.is_empty() {
            println!("  copy-file:         (none)");
        } else {
            println!("  copy-file:");
            for rule in &self.copy_file {
                println!("    - {}", rule);
            }
        }
        if self.copy_dir.is_empty() {
            println!("  copy-dir:          (none)");
        } else {
            println!("  copy-dir:");
            for rule in &self.copy_dir {
                println!("    - {}", rule);
            }
        }
    }
}
