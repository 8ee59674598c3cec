//! Show capture take information.

use std::path::PathBuf;

use applicator_capture_model::signals::{
    is_blendshape, is_rotation, ARKIT_BLENDSHAPES, ARKIT_ROTATIONS,
};
use applicator_capture_model::take::Take;
use applicator_common::clock::FrameRate;
use applicator_processing_core::cadence::CadencePattern;
use applicator_processing_core::pipeline::file_type_for;

pub fn run(path: PathBuf, fps: f64) -> anyhow::Result<()> {
    let take = Take::read(&path).map_err(|e| anyhow::anyhow!("Failed to read take: {e}"))?;

    let blendshapes = take.signals().iter().filter(|s| is_blendshape(s)).count();
    let rotations = take.signals().iter().filter(|s| is_rotation(s)).count();
    let other: Vec<&str> = take
        .signals()
        .iter()
        .map(String::as_str)
        .filter(|s| !is_blendshape(s) && !is_rotation(s))
        .collect();

    println!("Capture take: {}", path.display());
    match file_type_for(&path) {
        Some(file_type) => println!("  File type: {file_type}"),
        None => println!("  File type: unknown"),
    }
    println!("  Frames: {}", take.len());
    println!();

    println!("Signals:");
    println!("  Blendshapes: {blendshapes}/{}", ARKIT_BLENDSHAPES.len());
    println!("  Rotations: {rotations}/{}", ARKIT_ROTATIONS.len());
    if !other.is_empty() {
        println!("  Other columns: {}", other.join(", "));
    }
    println!();

    let rate = FrameRate::from_fps(fps).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported frame rate {fps}. Supported frame rates: {}",
            FrameRate::supported_list()
        )
    })?;
    let cadence = CadencePattern::for_take(rate, take.len());
    let output_frames = cadence.output_frame_count(take.len(), 0);

    println!("Output at {rate} fps:");
    println!("  Frames: {output_frames}");
    println!("  Duration: {:.2}s", output_frames as f64 / rate.fps());

    Ok(())
}
