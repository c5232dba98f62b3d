//! Stage identities and the per-stage / whole-build report.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::BasicConfig;
use crate::process::ProcessError;

/// The five stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Compile,
    CopyArtifacts,
    BuildImage,
    SaveImage,
    CleanupImage,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Compile,
        Stage::CopyArtifacts,
        Stage::BuildImage,
        Stage::SaveImage,
        Stage::CleanupImage,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Stage::Compile => "Compile",
            Stage::CopyArtifacts => "Copy artifacts",
            Stage::BuildImage => "Build image",
            Stage::SaveImage => "Save image",
            Stage::CleanupImage => "Clean up image",
        }
    }

    /// 1-based position in [`Stage::ALL`].
    pub fn number(self) -> usize {
        match self {
            Stage::Compile => 1,
            Stage::CopyArtifacts => 2,
            Stage::BuildImage => 3,
            Stage::SaveImage => 4,
            Stage::CleanupImage => 5,
        }
    }

    /// Whether the configuration gates let this stage run.
    pub fn enabled(self, basic: &BasicConfig) -> bool {
        match self {
            Stage::SaveImage => basic.auto_persist_image,
            Stage::CleanupImage => basic.auto_delete_image,
            Stage::Compile | Stage::CopyArtifacts | Stage::BuildImage => true,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Gated off by `auto-save-file` / `auto-delete-image`.
    Disabled,
    /// An earlier stage failed under the halt policy.
    Halted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("disabled by config"),
            SkipReason::Halted => f.write_str("halted after earlier failure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Passed,
    Failed,
    Skipped(SkipReason),
}

/// One failed step inside a stage (one process, or one copy rule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub step: String,
    pub error: String,
    /// Captured process output, may be empty.
    pub output: String,
}

impl Failure {
    pub fn new(step: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            step: step.into(),
            error: format!("{:#}", error),
            output: String::new(),
        }
    }

    pub fn from_process(step: impl Into<String>, err: &ProcessError) -> Self {
        Self {
            step: step.into(),
            error: err.to_string(),
            output: err.output().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
    pub failures: Vec<Failure>,
    /// Missing prerequisites noticed before the stage ran.
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl StageReport {
    /// Report for a stage that ran; failed iff any step failed.
    pub fn ran(
        stage: Stage,
        failures: Vec<Failure>,
        warnings: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        let status = if failures.is_empty() {
            StageStatus::Passed
        } else {
            StageStatus::Failed
        };
        Self {
            stage,
            status,
            failures,
            warnings,
            elapsed,
        }
    }

    pub fn skipped(stage: Stage, reason: SkipReason) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped(reason),
            failures: Vec::new(),
            warnings: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn failed(&self) -> bool {
        self.status == StageStatus::Failed
    }

    pub fn was_attempted(&self) -> bool {
        !matches!(self.status, StageStatus::Skipped(_))
    }
}

/// Paths produced by the stages, passed forward instead of re-derived.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub output_dir: Option<PathBuf>,
    /// Set when Compile succeeded.
    pub binary: Option<PathBuf>,
    /// Set when SaveImage succeeded.
    pub tarball: Option<PathBuf>,
}

/// Ordered results of one pipeline run, always one entry per stage.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub stages: Vec<StageReport>,
    pub artifacts: Artifacts,
    pub elapsed: Duration,
}

impl BuildReport {
    /// Returns true if no stage failed.
    pub fn all_passed(&self) -> bool {
        !self.stages.iter().any(StageReport::failed)
    }

    /// Count of failed stages.
    pub fn fail_count(&self) -> usize {
        self.stages.iter().filter(|s| s.failed()).count()
    }

    pub fn get(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Print the summary table to stdout.
    pub fn print(&self) {
        println!("\n=== Build Report ===\n");
        for report in &self.stages {
            let status = match report.status {
                StageStatus::Passed => "PASS".to_string(),
                StageStatus::Failed => "FAIL".to_string(),
                StageStatus::Skipped(reason) => format!("SKIP: {}", reason),
            };
            println!("  [{}] {}", status, report.stage.title());
            for failure in &report.failures {
                println!("      {}: {}", failure.step, failure.error);
            }
            for warning in &report.warnings {
                println!("      warning: {}", warning);
            }
        }

        println!();
        if let Some(binary) = &self.artifacts.binary {
            println!("  Binary:  {}", binary.display());
        }
        if let Some(tarball) = &self.artifacts.tarball {
            println!("  Tarball: {}", tarball.display());
        }
        if let Some(dir) = &self.artifacts.output_dir {
            println!("  Output:  {}", dir.display());
        }
    }
}
