//! The five stages.
//!
//! Each stage runs every one of its steps even when an earlier step failed,
//! and returns the failures it collected. Whether a failed stage stops the
//! build is the driver's decision, not the stage's.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::BuildConfig;
use crate::console::Console;
use crate::paths::PathResolver;
use crate::plan;
use crate::process::{Cmd, ProcessRunner};

use super::report::{Artifacts, Failure};

/// Everything a stage needs; shared by all stages of one run.
pub(crate) struct StageContext<'a> {
    pub config: &'a BuildConfig,
    pub paths: &'a PathResolver,
    pub runner: &'a dyn ProcessRunner,
    pub console: &'a Console,
}

impl StageContext<'_> {
    /// Run one command, recording a failure instead of returning it.
    fn exec(&self, cmd: &Cmd, failures: &mut Vec<Failure>) -> bool {
        match cmd.run_with(self.runner) {
            Ok(result) => {
                let output = result.combined();
                if !output.is_empty() {
                    tracing::debug!(command = %cmd, %output, "command output");
                }
                true
            }
            Err(err) => {
                tracing::debug!(command = %cmd, error = %err, "command failed");
                self.record(Failure::from_process(cmd.to_string(), &err), failures);
                false
            }
        }
    }

    fn record(&self, failure: Failure, failures: &mut Vec<Failure>) {
        self.console.failure(&failure);
        failures.push(failure);
    }

    /// Create the parent directory of an output-relative destination.
    fn ensure_parent(&self, destination: &Path) -> anyhow::Result<()> {
        if let Some(parent) = destination.parent() {
            let parent = self.paths.on_disk(parent);
            fs::create_dir_all(&parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(())
    }

    /// Copy one item: make room for the destination, then run `cp`.
    fn copy(&self, cmd: &Cmd, destination: &Path, failures: &mut Vec<Failure>) {
        if let Err(e) = self.ensure_parent(destination) {
            tracing::debug!(command = %cmd, error = %e, "cannot prepare destination");
            self.record(Failure::new(cmd.to_string(), e), failures);
            return;
        }
        self.exec(cmd, failures);
    }
}

/// Ensure the output directory, then compile the program into it.
pub(crate) fn compile(ctx: &StageContext<'_>, artifacts: &mut Artifacts) -> Vec<Failure> {
    let mut failures = Vec::new();

    match ctx.paths.ensure_output_dir() {
        Ok(dir) => artifacts.output_dir = Some(dir.to_path_buf()),
        Err(e) => ctx.record(Failure::new("create output directory", e), &mut failures),
    }

    let binary = ctx.paths.binary_path();
    ctx.console.step(&format!(
        "Building {} (target os: {})",
        binary.display(),
        ctx.paths.target_os()
    ));
    if ctx.exec(&plan::compile(ctx.paths, &ctx.config.toolchain), &mut failures) {
        artifacts.binary = Some(binary);
    }

    failures
}

/// Stage the descriptor, then every `copy-file` and `copy-dir` rule.
pub(crate) fn copy_artifacts(ctx: &StageContext<'_>) -> Vec<Failure> {
    let mut failures = Vec::new();
    let paths = ctx.paths;

    ctx.console
        .step(&format!("Copying {}", paths.source_dockerfile().display()));
    ctx.copy(
        &plan::copy_dockerfile(paths),
        &paths.staged_dockerfile(),
        &mut failures,
    );

    if !ctx.config.copy_file.is_empty() {
        ctx.console.step("Copying files");
    }
    for rule in &ctx.config.copy_file {
        let destination = paths.output_dir().join(rule.destination());
        ctx.copy(&plan::copy_file(paths, rule), &destination, &mut failures);
    }

    if !ctx.config.copy_dir.is_empty() {
        ctx.console.step("Copying directories");
    }
    for rule in &ctx.config.copy_dir {
        let destination = paths.output_dir().join(rule.destination());
        ctx.copy(&plan::copy_dir(paths, rule), &destination, &mut failures);
    }

    failures
}

pub(crate) fn build_image(ctx: &StageContext<'_>) -> Vec<Failure> {
    let mut failures = Vec::new();
    ctx.console.step(&format!("Tagging {}", ctx.paths.image_tag()));
    ctx.exec(
        &plan::build_image(ctx.paths, &ctx.config.toolchain),
        &mut failures,
    );
    failures
}

pub(crate) fn save_image(ctx: &StageContext<'_>, artifacts: &mut Artifacts) -> Vec<Failure> {
    let mut failures = Vec::new();
    let tarball = ctx.paths.image_tarball();
    let cmd = plan::save_image(ctx.paths, &ctx.config.toolchain);
    ctx.console.step(&format!("Writing {}", tarball.display()));
    // A namespaced name (`myorg/svc`) puts the tarball in a subdirectory.
    if let Err(e) = ctx.ensure_parent(&tarball) {
        ctx.record(Failure::new(cmd.to_string(), e), &mut failures);
        return failures;
    }
    if ctx.exec(&cmd, &mut failures) {
        artifacts.tarball = Some(tarball);
    }
    failures
}

pub(crate) fn cleanup_image(ctx: &StageContext<'_>) -> Vec<Failure> {
    let mut failures = Vec::new();
    ctx.console.step(&format!("Removing {}", ctx.paths.image_tag()));
    ctx.exec(
        &plan::remove_image(ctx.paths, &ctx.config.toolchain),
        &mut failures,
    );
    failures
}
