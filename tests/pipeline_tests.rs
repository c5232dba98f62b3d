//! Pipeline tests.
//!
//! Most tests drive the pipeline with a recording runner, so no compiler or
//! container engine is needed. The `real_*` tests run actual `cp` with
//! `true`/`false` standing in for the compiler and engine.

mod helpers;

use helpers::{assert_dir_exists, assert_file_exists, RecordingRunner, TestEnv, SVC_CONFIG};
use shipyard::console::Console;
use shipyard::pipeline::{FailurePolicy, Pipeline, SkipReason, Stage, StageStatus};
use shipyard::plan;
use shipyard::process::SystemRunner;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Ordering and gating
// =============================================================================

#[test]
fn test_end_to_end_invocation_order() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_eq!(
        runner.calls(),
        vec![
            argv(&["go", "build", "-o", "dist/1.2.0/svc", "."]),
            argv(&["cp", "Dockerfile", "dist/1.2.0/"]),
            argv(&["cp", "README.md", "dist/1.2.0/README.md"]),
            argv(&["cp", "-R", "configs", "dist/1.2.0/conf"]),
            argv(&[
                "docker",
                "build",
                "-f",
                "dist/1.2.0/Dockerfile",
                "-t",
                "svc:1.2.0",
                "dist/1.2.0",
            ]),
            argv(&["docker", "save", "-o", "dist/1.2.0/svc_1.2.0.tar", "svc:1.2.0"]),
            argv(&["docker", "rmi", "svc:1.2.0"]),
        ]
    );
    assert!(report.all_passed());
    assert_eq!(report.stages.len(), 5);
}

#[test]
fn test_plan_matches_what_the_pipeline_runs() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let paths = env.paths(&config);
    let runner = RecordingRunner::new();

    let planned: Vec<Vec<String>> = plan::plan(&config, &paths)
        .into_iter()
        .map(|(_, cmd)| cmd.argv())
        .collect();
    Pipeline::new(&config, paths, &runner, Console::disabled()).run();

    assert_eq!(runner.calls(), planned);
}

#[test]
fn test_gates_off_never_save_or_remove() {
    let env = TestEnv::new();
    let yaml = SVC_CONFIG
        .replace("auto-save-file: true", "auto-save-file: false")
        .replace("auto-delete-image: true", "auto-delete-image: false");
    let config = env.config(&yaml);
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_eq!(runner.count(&["docker", "save"]), 0);
    assert_eq!(runner.count(&["docker", "rmi"]), 0);
    assert_eq!(runner.count(&["docker", "build"]), 1);
    for stage in [Stage::SaveImage, Stage::CleanupImage] {
        assert_eq!(
            report.get(stage).unwrap().status,
            StageStatus::Skipped(SkipReason::Disabled)
        );
    }
}

#[test]
fn test_both_gates_save_then_remove_after_build() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new();

    Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_eq!(runner.count(&["docker", "save"]), 1);
    assert_eq!(runner.count(&["docker", "rmi"]), 1);
    let build = runner.position(&["docker", "build"]).unwrap();
    let save = runner.position(&["docker", "save"]).unwrap();
    let rmi = runner.position(&["docker", "rmi"]).unwrap();
    assert!(build < save && save < rmi);
}

// =============================================================================
// Failure policy
// =============================================================================

#[test]
fn test_failed_compile_does_not_stop_later_stages() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new().fail_on(&["go"]);

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert!(runner.position(&["cp", "Dockerfile"]).is_some());
    assert!(runner.position(&["docker", "build"]).is_some());
    assert_eq!(runner.calls().len(), 7);

    let compile = report.get(Stage::Compile).unwrap();
    assert_eq!(compile.status, StageStatus::Failed);
    assert_eq!(compile.failures.len(), 1);
    assert!(compile.failures[0].output.contains("simulated failure"));
    assert!(report.artifacts.binary.is_none());
    assert_eq!(report.fail_count(), 1);
    assert!(report
        .stages
        .iter()
        .filter(|s| s.stage != Stage::Compile)
        .all(|s| s.status == StageStatus::Passed));
}

#[test]
fn test_one_failed_copy_does_not_stop_the_others() {
    let env = TestEnv::new();
    let yaml = SVC_CONFIG.replace("  - README.md", "  - README.md\n  - LICENSE => LICENSE.txt");
    let config = env.config(&yaml);
    let runner = RecordingRunner::new().fail_on(&["cp", "README.md"]);

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_eq!(runner.count(&["cp"]), 4);
    assert!(runner.position(&["cp", "LICENSE"]).is_some());
    assert!(runner.position(&["cp", "-R", "configs"]).is_some());

    let copy = report.get(Stage::CopyArtifacts).unwrap();
    assert_eq!(copy.status, StageStatus::Failed);
    assert_eq!(copy.failures.len(), 1);
    assert!(copy.failures[0].step.starts_with("cp README.md"));
}

#[test]
fn test_halt_policy_skips_remaining_stages() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new().fail_on(&["docker", "build"]);

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled())
        .with_policy(FailurePolicy::Halt)
        .run();

    assert_eq!(runner.count(&["docker", "save"]), 0);
    assert_eq!(runner.count(&["docker", "rmi"]), 0);
    assert_eq!(report.stages.len(), 5);
    assert_eq!(report.get(Stage::BuildImage).unwrap().status, StageStatus::Failed);
    for stage in [Stage::SaveImage, Stage::CleanupImage] {
        assert_eq!(
            report.get(stage).unwrap().status,
            StageStatus::Skipped(SkipReason::Halted)
        );
    }
}

#[test]
fn test_halt_policy_from_config() {
    let env = TestEnv::new();
    let yaml = format!("{}pipeline:\n  on-failure: halt\n", SVC_CONFIG);
    let config = env.config(&yaml);
    let runner = RecordingRunner::new().fail_on(&["go"]);

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_eq!(runner.programs(), ["go"]);
    assert!(report.stages[1..].iter().all(|s| !s.was_attempted()));
}

#[test]
fn test_halt_policy_with_all_passing_runs_everything() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled())
        .with_policy(FailurePolicy::Halt)
        .run();

    assert!(report.all_passed());
    assert_eq!(runner.calls().len(), 7);
}

// =============================================================================
// Artifacts and prerequisite checks
// =============================================================================

#[test]
fn test_compile_creates_output_dir_and_reports_binary() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_dir_exists(&env.path("dist/1.2.0"));
    assert_eq!(
        report.artifacts.binary.as_deref(),
        Some(std::path::Path::new("dist/1.2.0/svc"))
    );
    assert_eq!(
        report.artifacts.tarball.as_deref(),
        Some(std::path::Path::new("dist/1.2.0/svc_1.2.0.tar"))
    );
}

#[test]
fn test_namespaced_name_gets_a_tarball_directory() {
    let env = TestEnv::new();
    let config = env.config(&SVC_CONFIG.replace("name: svc", "name: myorg/svc"));
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    assert_eq!(report.get(Stage::SaveImage).unwrap().status, StageStatus::Passed);
    assert_dir_exists(&env.path("dist/1.2.0/myorg"));
    assert!(runner.calls().contains(&argv(&[
        "docker",
        "save",
        "-o",
        "dist/1.2.0/myorg/svc_1.2.0.tar",
        "myorg/svc:1.2.0",
    ])));
}

#[test]
fn test_missing_prerequisites_warn_but_do_not_block() {
    let env = TestEnv::new();
    let config = env.config(SVC_CONFIG);
    let runner = RecordingRunner::new();

    let report = Pipeline::new(&config, env.paths(&config), &runner, Console::disabled()).run();

    // Nothing was really compiled or copied.
    let build = report.get(Stage::BuildImage).unwrap();
    assert_eq!(build.status, StageStatus::Passed);
    assert_eq!(build.warnings.len(), 2);
    assert!(build.warnings.iter().any(|w| w.contains("dist/1.2.0/svc")));
    assert!(build.warnings.iter().any(|w| w.contains("Dockerfile")));
}

// =============================================================================
// Real processes
// =============================================================================

#[cfg(unix)]
#[test]
fn test_real_copy_stage_stages_files() {
    let env = TestEnv::with_sources();
    let yaml = format!("{}toolchain:\n  compiler: \"true\"\n  engine: \"true\"\n", SVC_CONFIG);
    let config = env.config(&yaml);

    let report =
        Pipeline::new(&config, env.paths(&config), &SystemRunner, Console::disabled()).run();

    assert!(report.all_passed(), "{:?}", report.stages);
    assert_file_exists(&env.path("dist/1.2.0/Dockerfile"));
    assert_file_exists(&env.path("dist/1.2.0/README.md"));
    assert_file_exists(&env.path("dist/1.2.0/conf/app.yaml"));

    let build = report.get(Stage::BuildImage).unwrap();
    // `true` produced no binary, the descriptor was staged.
    assert_eq!(build.warnings.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_real_rename_into_missing_subdirectory() {
    let env = TestEnv::with_sources();
    let yaml = format!(
        "{}toolchain:\n  compiler: \"true\"\n  engine: \"true\"\n",
        SVC_CONFIG.replace("  - README.md", "  - README.md => docs/README.txt")
    );
    let config = env.config(&yaml);

    let report =
        Pipeline::new(&config, env.paths(&config), &SystemRunner, Console::disabled()).run();

    assert!(report.all_passed(), "{:?}", report.stages);
    assert_file_exists(&env.path("dist/1.2.0/docs/README.txt"));
}

#[cfg(unix)]
#[test]
fn test_real_missing_sources_and_failing_engine() {
    let env = TestEnv::new();
    let yaml = format!("{}toolchain:\n  compiler: \"true\"\n  engine: \"false\"\n", SVC_CONFIG);
    let config = env.config(&yaml);

    let report =
        Pipeline::new(&config, env.paths(&config), &SystemRunner, Console::disabled()).run();

    assert_eq!(report.get(Stage::Compile).unwrap().status, StageStatus::Passed);
    let copy = report.get(Stage::CopyArtifacts).unwrap();
    assert_eq!(copy.failures.len(), 3);
    for stage in [Stage::BuildImage, Stage::SaveImage, Stage::CleanupImage] {
        assert_eq!(report.get(stage).unwrap().status, StageStatus::Failed);
    }
    assert_eq!(report.fail_count(), 4);
}
