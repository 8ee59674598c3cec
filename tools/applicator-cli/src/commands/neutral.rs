//! Show the neutral profile of a calibration take.

use std::path::PathBuf;

use applicator_capture_model::signals::ARKIT_BLENDSHAPES;
use applicator_capture_model::take::Take;
use applicator_processing_core::neutral::NeutralProfile;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let take = Take::read(&path).map_err(|e| anyhow::anyhow!("Failed to read take: {e}"))?;

    let signals: Vec<&str> = ARKIT_BLENDSHAPES
        .iter()
        .copied()
        .filter(|signal| take.has_signal(signal))
        .collect();
    let profile = NeutralProfile::compute(&signals, Some(&take))
        .map_err(|e| anyhow::anyhow!("Failed to compute neutral profile: {e}"))?;

    println!("Neutral profile: {}", path.display());
    println!("  Frames: {}", take.len());
    println!("  Signals: {}/{}", profile.len(), ARKIT_BLENDSHAPES.len());
    println!();

    for (signal, value) in profile.iter() {
        println!("  {signal:<22} {value:.6}");
    }

    Ok(())
}
