//! Show command - displays information.

use anyhow::Result;

use shipyard::config::BuildConfig;
use shipyard::paths::PathResolver;
use shipyard::plan;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show the ordered command plan
    Plan,
}

/// Execute the show command.
pub fn cmd_show(config: &BuildConfig, paths: &PathResolver, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
            println!();
            println!("Derived:");
            println!("  target os:  {}", paths.target_os());
            println!("  output dir: {}", paths.output_dir().display());
            println!("  binary:     {}", paths.binary_path().display());
            println!("  image tag:  {}", paths.image_tag());
            println!("  tarball:    {}", paths.image_tarball().display());
        }
        ShowTarget::Plan => {
            let mut current = None;
            for (stage, cmd) in plan::plan(config, paths) {
                if current != Some(stage) {
                    println!("[{}] {}", stage.number(), stage.title());
                    current = Some(stage);
                }
                println!("  {}", cmd);
            }
        }
    }
    Ok(())
}
