//! Build command - runs the release pipeline.

use anyhow::{bail, Result};

use shipyard::config::BuildConfig;
use shipyard::console::Console;
use shipyard::paths::PathResolver;
use shipyard::pipeline::{FailurePolicy, Pipeline};
use shipyard::process::SystemRunner;

pub struct BuildOptions {
    /// Halt after the first failed stage instead of continuing.
    pub fail_fast: bool,
    /// Turn stage failures into a non-zero exit.
    pub strict: bool,
}

/// Execute the build command.
///
/// Without `strict` this returns `Ok` even when stages failed; the report
/// printed at the end is the only record of what went wrong.
pub fn cmd_build(
    config: &BuildConfig,
    paths: PathResolver,
    console: Console,
    options: BuildOptions,
) -> Result<()> {
    let runner = SystemRunner;
    let mut pipeline = Pipeline::new(config, paths, &runner, console);
    if options.fail_fast {
        pipeline = pipeline.with_policy(FailurePolicy::Halt);
    }

    let report = pipeline.run();
    if console.is_enabled() {
        report.print();
    }

    if options.strict && !report.all_passed() {
        bail!(
            "Build failed: {} stage(s) failed. See the report above.",
            report.fail_count()
        );
    }
    Ok(())
}
