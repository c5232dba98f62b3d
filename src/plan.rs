//! Constructors for every external invocation the pipeline makes.
//!
//! These are pure: they only assemble [`Cmd`]s from the configuration and
//! the [`PathResolver`]. The stages run them; `show plan` prints them.

use std::path::{Component, Path};

use crate::config::{BuildConfig, ToolchainConfig};
use crate::copy_rule::CopyRule;
use crate::paths::PathResolver;
use crate::pipeline::Stage;
use crate::process::Cmd;

/// `<compiler> build -o <output_dir>/<name>[.exe] .`
pub fn compile(paths: &PathResolver, toolchain: &ToolchainConfig) -> Cmd {
    Cmd::new(&toolchain.compiler)
        .args(["build", "-o"])
        .arg_path(&paths.binary_path())
        .arg(".")
        .dir(paths.root())
        .error_msg("Compile failed")
}

/// `cp <dockerfile> <output_dir>/`
///
/// A descriptor in a subdirectory is copied to the same relative path under
/// the output directory, so the image build finds it where it expects.
pub fn copy_dockerfile(paths: &PathResolver) -> Cmd {
    let src = paths.source_dockerfile();
    let cmd = Cmd::new("cp").arg_path(src);
    let cmd = if has_parent(src) {
        cmd.arg_path(&paths.staged_dockerfile())
    } else {
        cmd.arg(dir_arg(paths.output_dir()))
    };
    cmd.dir(paths.root())
        .error_msg(format!("Copying {} failed", src.display()))
}

/// `cp <src> <output_dir>/<dst>`
pub fn copy_file(paths: &PathResolver, rule: &CopyRule) -> Cmd {
    Cmd::new("cp")
        .arg(rule.source())
        .arg_path(&paths.output_dir().join(rule.destination()))
        .dir(paths.root())
        .error_msg(format!("Copying file '{}' failed", rule))
}

/// `cp -R <src> <output_dir>/<dst>`
pub fn copy_dir(paths: &PathResolver, rule: &CopyRule) -> Cmd {
    Cmd::new("cp")
        .arg("-R")
        .arg(rule.source())
        .arg_path(&paths.output_dir().join(rule.destination()))
        .dir(paths.root())
        .error_msg(format!("Copying directory '{}' failed", rule))
}

/// `<engine> build -f <output_dir>/<dockerfile> -t <name>:<version> <output_dir>`
pub fn build_image(paths: &PathResolver, toolchain: &ToolchainConfig) -> Cmd {
    Cmd::new(&toolchain.engine)
        .args(["build", "-f"])
        .arg_path(&paths.staged_dockerfile())
        .arg("-t")
        .arg(paths.image_tag())
        .arg_path(paths.output_dir())
        .dir(paths.root())
        .error_msg("Image build failed")
}

/// `<engine> save -o <output_dir>/<name>_<version>.tar <name>:<version>`
pub fn save_image(paths: &PathResolver, toolchain: &ToolchainConfig) -> Cmd {
    Cmd::new(&toolchain.engine)
        .args(["save", "-o"])
        .arg_path(&paths.image_tarball())
        .arg(paths.image_tag())
        .dir(paths.root())
        .error_msg("Image save failed")
}

/// `<engine> rmi <name>:<version>`
pub fn remove_image(paths: &PathResolver, toolchain: &ToolchainConfig) -> Cmd {
    Cmd::new(&toolchain.engine)
        .arg("rmi")
        .arg(paths.image_tag())
        .dir(paths.root())
        .error_msg("Image removal failed")
}

/// Commands of one stage, in execution order.
pub fn stage_commands(stage: Stage, config: &BuildConfig, paths: &PathResolver) -> Vec<Cmd> {
    let toolchain = &config.toolchain;
    match stage {
        Stage::Compile => vec![compile(paths, toolchain)],
        Stage::CopyArtifacts => std::iter::once(copy_dockerfile(paths))
            .chain(config.copy_file.iter().map(|rule| copy_file(paths, rule)))
            .chain(config.copy_dir.iter().map(|rule| copy_dir(paths, rule)))
            .collect(),
        Stage::BuildImage => vec![build_image(paths, toolchain)],
        Stage::SaveImage => vec![save_image(paths, toolchain)],
        Stage::CleanupImage => vec![remove_image(paths, toolchain)],
    }
}

/// Every invocation a full run would make, skipping gated-off stages.
pub fn plan(config: &BuildConfig, paths: &PathResolver) -> Vec<(Stage, Cmd)> {
    Stage::ALL
        .into_iter()
        .filter(|stage| stage.enabled(&config.basic))
        .flat_map(|stage| {
            stage_commands(stage, config, paths)
                .into_iter()
                .map(move |cmd| (stage, cmd))
        })
        .collect()
}

fn has_parent(path: &Path) -> bool {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .count()
        > 1
}

/// A directory argument with a trailing separator, so `cp` treats it as the
/// target directory.
fn dir_arg(dir: &Path) -> String {
    let s = dir.to_string_lossy();
    if s.ends_with(std::path::MAIN_SEPARATOR) {
        s.into_owned()
    } else {
        format!("{}{}", s, std::path::MAIN_SEPARATOR)
    }
}
