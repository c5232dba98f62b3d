//! Terminal output for the build.
//!
//! The console is constructed with an explicit `enabled` flag instead of
//! reading a process-wide toggle. When disabled nothing is printed; the
//! `tracing` events emitted alongside are unaffected.

use std::time::Duration;

use crate::pipeline::{Failure, StageReport, StageStatus};
use crate::timing::format_elapsed;

#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
}

impl Console {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `=== Title ===`
    pub fn header(&self, title: &str) {
        if self.enabled {
            println!("=== {} ===", title);
        }
    }

    /// `[n/N] Title...`
    pub fn stage_start(&self, number: usize, total: usize, title: &str) {
        if self.enabled {
            println!("\n[{}/{}] {}...", number, total, title);
        }
    }

    pub fn step(&self, message: &str) {
        if self.enabled {
            println!("  {}", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.enabled {
            eprintln!("  [WARN] {}", message);
        }
    }

    pub fn failure(&self, failure: &Failure) {
        if !self.enabled {
            return;
        }
        eprintln!("  [FAIL] {}: {}", failure.step, failure.error);
        for line in failure.output.lines() {
            eprintln!("    {}", line);
        }
    }

    /// Closing line of a stage that ran.
    pub fn stage_end(&self, report: &StageReport) {
        if !self.enabled {
            return;
        }
        let elapsed = format_elapsed(report.elapsed);
        match &report.status {
            StageStatus::Passed => println!("  [OK] {} ({})", report.stage.title(), elapsed),
            StageStatus::Failed => println!(
                "  [FAIL] {} ({}, {} error(s))",
                report.stage.title(),
                elapsed,
                report.failures.len()
            ),
            StageStatus::Skipped(reason) => {
                println!("\n[SKIP] {} ({})", report.stage.title(), reason)
            }
        }
    }

    pub fn finish(&self, total: Duration, failed: usize) {
        if !self.enabled {
            return;
        }
        if failed == 0 {
            println!("\n=== Build Complete ({}) ===", format_elapsed(total));
        } else {
            println!(
                "\n=== Build Finished With {} Failed Stage(s) ({}) ===",
                failed,
                format_elapsed(total)
            );
        }
    }
}
