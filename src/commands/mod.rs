//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Run the release pipeline
//! - `show` - Display configuration or the command plan
//! - `preflight` - Run preflight checks

pub mod build;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
