//! Preflight command - runs preflight checks.

use anyhow::Result;

use shipyard::config::BuildConfig;
use shipyard::paths::PathResolver;
use shipyard::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(config: &BuildConfig, paths: &PathResolver, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(config, paths)?;
    } else {
        let report = preflight::run_preflight(config, paths);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail on them.");
        }
    }
    Ok(())
}
