//! The staged release pipeline.
//!
//! Compile, CopyArtifacts and BuildImage always run; SaveImage and
//! CleanupImage are gated by `auto-save-file` and `auto-delete-image`. Order
//! is fixed and every process is waited on before the next one starts.
//!
//! Under [`FailurePolicy::Continue`] a failed stage is recorded and the rest
//! still run; under [`FailurePolicy::Halt`] the stages after the first
//! failure are reported as skipped. Either way the caller gets a
//! [`BuildReport`] with one entry per stage.

mod report;
mod stages;

use std::time::Instant;

pub use crate::config::FailurePolicy;
pub use report::{
    Artifacts, BuildReport, Failure, SkipReason, Stage, StageReport, StageStatus,
};

use crate::config::BuildConfig;
use crate::console::Console;
use crate::paths::PathResolver;
use crate::process::ProcessRunner;
use crate::timing::Timer;

use stages::StageContext;

pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    paths: PathResolver,
    runner: &'a dyn ProcessRunner,
    console: Console,
    policy: FailurePolicy,
}

impl<'a> Pipeline<'a> {
    /// Policy defaults to `pipeline.on-failure` from the config.
    pub fn new(
        config: &'a BuildConfig,
        paths: PathResolver,
        runner: &'a dyn ProcessRunner,
        console: Console,
    ) -> Self {
        Self {
            config,
            paths,
            runner,
            console,
            policy: config.pipeline.on_failure,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run every stage in order and return the report.
    pub fn run(&self) -> BuildReport {
        let start = Instant::now();
        let ctx = StageContext {
            config: self.config,
            paths: &self.paths,
            runner: self.runner,
            console: &self.console,
        };

        self.console
            .header(&format!("Release Build {}", self.paths.image_tag()));
        tracing::info!(
            output_dir = %self.paths.output_dir().display(),
            policy = ?self.policy,
            "starting pipeline"
        );

        let mut report = BuildReport::default();
        let mut halted = false;

        for stage in Stage::ALL {
            let skip = if halted {
                Some(SkipReason::Halted)
            } else if !stage.enabled(&self.config.basic) {
                Some(SkipReason::Disabled)
            } else {
                None
            };
            if let Some(reason) = skip {
                let skipped = StageReport::skipped(stage, reason);
                self.console.stage_end(&skipped);
                report.stages.push(skipped);
                continue;
            }

            self.console
                .stage_start(stage.number(), Stage::ALL.len(), stage.title());
            let warnings = self.check_prerequisites(stage, &report.artifacts);

            let timer = Timer::start(stage.title());
            let failures = match stage {
                Stage::Compile => stages::compile(&ctx, &mut report.artifacts),
                Stage::CopyArtifacts => stages::copy_artifacts(&ctx),
                Stage::BuildImage => stages::build_image(&ctx),
                Stage::SaveImage => stages::save_image(&ctx, &mut report.artifacts),
                Stage::CleanupImage => stages::cleanup_image(&ctx),
            };
            let stage_report = StageReport::ran(stage, failures, warnings, timer.finish());
            self.console.stage_end(&stage_report);

            if stage_report.failed() {
                tracing::info!(
                    stage = %stage,
                    failures = stage_report.failures.len(),
                    "stage failed"
                );
                halted = self.policy == FailurePolicy::Halt;
            }
            report.stages.push(stage_report);
        }

        report.elapsed = start.elapsed();
        self.console.finish(report.elapsed, report.fail_count());
        report
    }

    /// Look for what earlier stages should have left on disk.
    ///
    /// Missing prerequisites are warnings only; the stage still runs.
    fn check_prerequisites(&self, stage: Stage, artifacts: &Artifacts) -> Vec<String> {
        let mut warnings = Vec::new();
        if stage != Stage::BuildImage {
            return warnings;
        }

        match &artifacts.binary {
            Some(binary) if self.paths.on_disk(binary).exists() => {}
            Some(binary) => warnings.push(format!("binary {} not found", binary.display())),
            None => warnings.push("compile did not produce a binary".to_string()),
        }

        let dockerfile = self.paths.staged_dockerfile();
        if !self.paths.on_disk(&dockerfile).is_file() {
            warnings.push(format!("build descriptor {} not found", dockerfile.display()));
        }

        for warning in &warnings {
            tracing::debug!(stage = %stage, "{}", warning);
            self.console.warn(warning);
        }
        warnings
    }
}
