//! Run pre-flight checks without applying anything.

use applicator_capture_model::scene::TargetNode;
use applicator_common::config::ApplyDefaults;
use applicator_common::error::ApplicatorError;
use applicator_processing_core::pipeline::Applicator;

use super::RunArgs;

pub fn run(args: RunArgs, defaults: &ApplyDefaults) -> anyhow::Result<()> {
    println!("Validating run for scene: {}", args.scene.display());

    let scene = args.load_scene()?;
    let applicator = Applicator::new(args.to_config(defaults));

    match applicator.preflight(&scene) {
        Ok(preflight) => {
            println!("  Target: {}", preflight.root.name());
            println!("  Frame rate: {} fps", preflight.rate);
            println!("  Capture: {}", applicator.config().capture_path.display());
            println!("\nRun is valid.");
            Ok(())
        }
        Err(ApplicatorError::Validation { message }) => {
            let issues: Vec<&str> = message.split("; ").collect();
            println!("\nValidation issues:");
            for issue in &issues {
                println!("  - {issue}");
            }
            anyhow::bail!("{} issue(s) found", issues.len())
        }
        Err(e) => Err(anyhow::anyhow!("Validation failed: {e}")),
    }
}
