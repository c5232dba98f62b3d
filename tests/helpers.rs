//! Shared test utilities for shipyard tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use shipyard::config::BuildConfig;
use shipyard::paths::PathResolver;
use shipyard::process::{Cmd, CommandResult, ProcessError, ProcessRunner};
use tempfile::TempDir;

/// Configuration used by most tests.
pub const SVC_CONFIG: &str = r#"
basic:
  save-dir: dist
  name: svc
  version: 1.2.0
  dockerfile: Dockerfile
  auto-save-file: true
  auto-delete-image: true
copy-file:
  - README.md
copy-dir:
  - configs => conf
"#;

/// Test environment: a temporary source root with a config and sources.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Source root
    pub root: PathBuf,
}

impl TestEnv {
    /// Create an empty source root.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Create a source root holding everything [`SVC_CONFIG`] copies.
    pub fn with_sources() -> Self {
        let env = Self::new();
        env.write("Dockerfile", "FROM scratch\nCOPY svc /svc\n");
        env.write("README.md", "# svc\n");
        env.write("configs/app.yaml", "port: 8080\n");
        env.write(shipyard::config::DEFAULT_CONFIG_FILE, SVC_CONFIG);
        env
    }

    /// Write a file relative to the root, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn config(&self, yaml: &str) -> BuildConfig {
        BuildConfig::from_yaml(yaml).expect("test config should parse")
    }

    pub fn paths(&self, config: &BuildConfig) -> PathResolver {
        PathResolver::new(&self.root, &config.basic, "linux")
    }
}

/// Records every command instead of running it.
///
/// Commands whose argv starts with one of the configured prefixes fail with
/// exit code 1 and a canned stderr.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Vec<String>>>,
    failing: Vec<Vec<String>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command whose argv starts with `prefix`.
    pub fn fail_on(mut self, prefix: &[&str]) -> Self {
        self.failing.push(prefix.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Program names in call order.
    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|argv| argv[0].clone()).collect()
    }

    /// Index of the first call whose argv starts with `prefix`.
    pub fn position(&self, prefix: &[&str]) -> Option<usize> {
        self.calls
            .borrow()
            .iter()
            .position(|argv| starts_with(argv, prefix))
    }

    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|argv| starts_with(argv, prefix))
            .count()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, cmd: &Cmd) -> Result<CommandResult, ProcessError> {
        let argv = cmd.argv();
        self.calls.borrow_mut().push(argv.clone());

        let fails = self
            .failing
            .iter()
            .any(|prefix| argv.len() >= prefix.len() && argv[..prefix.len()] == prefix[..]);
        let result = if fails {
            CommandResult {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("{}: simulated failure", cmd.program()),
            }
        } else {
            CommandResult {
                code: Some(0),
                ..Default::default()
            }
        };

        if result.success() {
            Ok(result)
        } else {
            Err(cmd.exit_error(&result))
        }
    }
}

fn starts_with(argv: &[String], prefix: &[&str]) -> bool {
    argv.len() >= prefix.len() && argv.iter().zip(prefix).all(|(a, p)| a == p)
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file to exist: {}", path.display());
}

/// Assert that a directory exists.
pub fn assert_dir_exists(path: &Path) {
    assert!(path.is_dir(), "Expected directory to exist: {}", path.display());
}
