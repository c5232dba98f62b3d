//! Preflight checks for a release build.
//!
//! Validates host tools and the source tree before starting a build.
//! Run with `shipyard preflight` to check everything is ready.

mod host_tools;
mod sources;
mod types;

use anyhow::{bail, Result};

use crate::config::BuildConfig;
use crate::paths::PathResolver;

pub use types::{Check, PreflightReport, Subject, Tally, Verdict};

/// Run all preflight checks: host tools first, then the source tree.
pub fn run_preflight(config: &BuildConfig, paths: &PathResolver) -> PreflightReport {
    let mut checks = host_tools::check_host_tools(&config.toolchain);
    checks.extend(sources::check_sources(config, paths));
    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &BuildConfig, paths: &PathResolver) -> Result<()> {
    let report = run_preflight(config, paths);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before building.",
            report.tally().failed
        );
    }

    println!("\nAll preflight checks passed.");
    Ok(())
}
