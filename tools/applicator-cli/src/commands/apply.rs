//! Apply a capture take to a scene target.

use std::path::PathBuf;

use applicator_capture_model::keyframes::KeyframeLog;
use applicator_common::config::ApplyDefaults;
use applicator_processing_core::pipeline::Applicator;

use super::RunArgs;

pub fn run(
    args: RunArgs,
    defaults: &ApplyDefaults,
    output: Option<PathBuf>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    if !json {
        println!("Applying capture take: {}", args.capture.display());
    }

    let scene = args.load_scene()?;
    let config = args.to_config(defaults);
    tracing::debug!("Run configuration: {:?}", config);
    let applicator = Applicator::new(config);

    if dry_run {
        let planned = applicator
            .plan(&scene)
            .map_err(|e| anyhow::anyhow!("Apply failed: {e}"))?;

        println!("  Target: {} ({})", planned.root_name, planned.outcome.mode);
        println!("  Frame rate: {} fps", planned.rate);
        println!(
            "  Frames: {} capture -> {} output",
            planned.capture_frames, planned.output_frames
        );
        println!("  Bindings applied: {}", planned.outcome.bindings_applied);
        println!("  Keys planned: {}", planned.outcome.plan.len());
        if planned.dropped_rows > 0 {
            println!("  Dropped mapping rows: {}", planned.dropped_rows);
        }
        if let Some(take) = &planned.take {
            println!("  Take: {take}");
        }
        println!("\nDry run; nothing written.");
        return Ok(());
    }

    let output_path = output.unwrap_or_else(|| args.capture.with_extension("keys.json"));

    let mut log = KeyframeLog::new();
    let summary = applicator
        .run(&scene, &mut log)
        .map_err(|e| anyhow::anyhow!("Apply failed: {e}"))?;

    log.save(&output_path)
        .map_err(|e| anyhow::anyhow!("Failed to write keys: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("  Target: {} ({})", summary.root, summary.mode);
    println!("  Frame rate: {} fps", summary.rate);
    println!("  Output frames: {}", summary.output_frames);
    println!("  Bindings applied: {}", summary.bindings_applied);
    println!("  Keys written: {}", summary.keys_written);
    if summary.dropped_rows > 0 {
        println!("  Dropped mapping rows: {}", summary.dropped_rows);
    }
    if let Some(take) = &summary.take {
        let state = if summary.take_created {
            "created"
        } else {
            "existing"
        };
        println!("  Take: {take} ({state})");
    }
    println!("\nKeys written to: {}", output_path.display());

    Ok(())
}
