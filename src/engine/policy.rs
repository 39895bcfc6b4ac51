// Target bitrate policy

use super::probe::ResolutionClass;

/// Frame rates above this get the high-motion bitrate multiplier.
const HIGH_FPS_THRESHOLD: f64 = 30.0;
const HIGH_FPS_MULTIPLIER: f64 = 1.5;

/// Target video bitrate in kbps for a resolution class and frame rate.
///
/// Pure and deterministic; the orchestrator calls this both to pick encode
/// parameters and to judge whether an existing output's bitrate is sane.
pub fn target_bitrate_kbps(resolution: ResolutionClass, fps: f64) -> u32 {
    let base: u32 = match resolution {
        ResolutionClass::P480 => 2000,
        ResolutionClass::P720 => 5000,
        ResolutionClass::P1080 => 10_000,
        ResolutionClass::K4 => 35_000,
        // Oddball heights still get encoded; assume 1080p-grade content.
        ResolutionClass::Unknown => 10_000,
    };

    if fps > HIGH_FPS_THRESHOLD {
        (base as f64 * HIGH_FPS_MULTIPLIER).floor() as u32
    } else {
        base
    }
}
