//! What a preflight check looked at, and what it found.

use std::fmt;
use std::path::PathBuf;

use crate::copy_rule::CopyRule;

/// The thing a check inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A program the stages invoke.
    Tool(String),
    /// The build descriptor, relative to the source root.
    Dockerfile(PathBuf),
    CopyFile(CopyRule),
    CopyDir(CopyRule),
    /// The versioned output directory.
    OutputDir(PathBuf),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Tool(program) => write!(f, "tool {}", program),
            Subject::Dockerfile(path) => write!(f, "dockerfile {}", path.display()),
            Subject::CopyFile(rule) => write!(f, "copy-file {}", rule),
            Subject::CopyDir(rule) => write!(f, "copy-dir {}", rule),
            Subject::OutputDir(path) => write!(f, "output {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Worth knowing, the build can still succeed.
    Warn,
    /// The stage touching this subject will fail.
    Fail,
}

#[derive(Debug, Clone)]
pub struct Check {
    pub subject: Subject,
    pub verdict: Verdict,
    pub note: Option<String>,
}

impl Check {
    pub fn pass(subject: Subject) -> Self {
        Self {
            subject,
            verdict: Verdict::Pass,
            note: None,
        }
    }

    pub fn noted(subject: Subject, verdict: Verdict, note: impl Into<String>) -> Self {
        Self {
            subject,
            verdict,
            note: Some(note.into()),
        }
    }
}

/// Pass/warn/fail counts, gathered in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct PreflightReport {
    pub checks: Vec<Check>,
}

impl PreflightReport {
    pub fn tally(&self) -> Tally {
        self.checks
            .iter()
            .fold(Tally::default(), |mut tally, check| {
                match check.verdict {
                    Verdict::Pass => tally.passed += 1,
                    Verdict::Warn => tally.warned += 1,
                    Verdict::Fail => tally.failed += 1,
                }
                tally
            })
    }

    pub fn all_passed(&self) -> bool {
        self.tally().failed == 0
    }

    /// The check on `subject`, if one ran.
    pub fn find(&self, subject: &Subject) -> Option<&Check> {
        self.checks.iter().find(|c| &c.subject == subject)
    }

    /// Print the summary table to stdout.
    pub fn print(&self) {
        println!("\n=== Preflight Report ===\n");
        for check in &self.checks {
            let verdict = match check.verdict {
                Verdict::Pass => "PASS",
                Verdict::Warn => "WARN",
                Verdict::Fail => "FAIL",
            };
            println!("  [{}] {}", verdict, check.subject);
            if let Some(note) = &check.note {
                println!("      {}", note);
            }
        }

        let tally = self.tally();
        println!(
            "\n  {} passed, {} warning(s), {} failed",
            tally.passed, tally.warned, tally.failed
        );
    }
}
