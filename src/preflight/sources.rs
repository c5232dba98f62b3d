//! Source tree checks: everything the copy stage reads must exist.

use crate::config::BuildConfig;
use crate::paths::PathResolver;

use super::types::{Check, Subject, Verdict};

pub fn check_sources(config: &BuildConfig, paths: &PathResolver) -> Vec<Check> {
    let mut checks = Vec::new();

    let dockerfile = paths.source_dockerfile();
    let subject = Subject::Dockerfile(dockerfile.to_path_buf());
    checks.push(if paths.on_disk(dockerfile).is_file() {
        Check::pass(subject)
    } else {
        Check::noted(subject, Verdict::Fail, "Build descriptor not found")
    });

    for rule in &config.copy_file {
        let src = paths.on_disk(rule.source());
        let subject = Subject::CopyFile(rule.clone());
        checks.push(if src.is_file() {
            Check::pass(subject)
        } else if src.is_dir() {
            Check::noted(subject, Verdict::Fail, "Is a directory; list it under copy-dir")
        } else {
            Check::noted(subject, Verdict::Fail, "Source not found")
        });
    }

    for rule in &config.copy_dir {
        let src = paths.on_disk(rule.source());
        let subject = Subject::CopyDir(rule.clone());
        checks.push(if src.is_dir() {
            Check::pass(subject)
        } else if src.exists() {
            Check::noted(subject, Verdict::Fail, "Not a directory; list it under copy-file")
        } else {
            Check::noted(subject, Verdict::Fail, "Source not found")
        });
    }

    let output_dir = paths.on_disk(paths.output_dir());
    let subject = Subject::OutputDir(paths.output_dir().to_path_buf());
    checks.push(if output_dir.is_dir() {
        Check::noted(
            subject,
            Verdict::Warn,
            "Already exists; files will be overwritten and copy-dir targets nested",
        )
    } else if output_dir.exists() {
        Check::noted(subject, Verdict::Fail, "Exists and is not a directory")
    } else {
        Check::noted(subject, Verdict::Pass, "Will be created")
    });

    checks
}
