//! Shipyard - release-build orchestrator.
//!
//! Compiles a program into a versioned output directory, stages the files a
//! container image needs next to it, builds the image and optionally saves
//! it to a tarball and removes it from the engine's local store.
//!
//! The modules are public so the integration tests can drive the pipeline
//! with a recording [`process::ProcessRunner`].

pub mod config;
pub mod console;
pub mod copy_rule;
pub mod paths;
pub mod pipeline;
pub mod plan;
pub mod preflight;
pub mod process;
pub mod timing;
