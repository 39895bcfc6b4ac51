//! The per-file processing state machine.
//!
//! Each discovered file moves through probe → resume check → encode →
//! outcome, one file at a time; only one encoder process is ever active.
//! No per-file failure aborts the run: probe failures count as skipped,
//! encoder failures count as failed and quarantine the source.

use super::encode;
use super::job::{EncodeJob, OUTPUT_EXTENSION};
use super::policy::target_bitrate_kbps;
use super::probe;
use super::scan::{self, relocate};
use super::validate;
use crate::stats::RunStats;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Failed sources are moved here, under the output root, so later runs do
/// not retry a file known to fail.
pub const QUARANTINE_DIR: &str = "failed";

pub struct Orchestrator {
    input_root: PathBuf,
    output_root: PathBuf,
    extensions: Vec<String>,
}

impl Orchestrator {
    pub fn new(input_root: PathBuf, output_root: PathBuf, extensions: Vec<String>) -> Self {
        Self {
            input_root,
            output_root,
            extensions,
        }
    }

    /// Where the normalized output for `input` belongs.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        relocate(&self.input_root, &self.output_root, input, OUTPUT_EXTENSION)
    }

    /// Process every recognized video under the input root, sequentially.
    /// Returns the run's statistics; per-file outcomes are logged as they
    /// happen.
    pub fn run(&self) -> Result<RunStats> {
        fs::create_dir_all(&self.output_root).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_root.display()
            )
        })?;

        info!("scanning directory: {}", self.input_root.display());
        let mut stats = RunStats::default();
        scan::scan_streaming(&self.input_root, &self.extensions, |path| {
            self.process_file(&path, &mut stats);
        })?;

        info!("transcoding complete. {}", stats.summary());
        Ok(stats)
    }

    /// Run one file through the full state machine.
    pub fn process_file(&self, input: &Path, stats: &mut RunStats) {
        info!("processing {}", input.display());

        // Discovered → Probed, or straight to a skip on any probe failure.
        let probed = match probe::analyze(input) {
            Ok(result) => result,
            Err(e) => {
                warn!("skipping {}: {e}", input.display());
                stats.skipped += 1;
                return;
            }
        };
        info!(
            "detected: resolution={}, fps={:.2}, duration={:.2}s, color={}/{}/{}",
            probed.resolution,
            probed.fps,
            probed.duration_secs,
            probed.color.primaries,
            probed.color.transfer,
            probed.color.matrix,
        );

        let bitrate_kbps = target_bitrate_kbps(probed.resolution, probed.fps);
        let output = self.output_path_for(input);

        if let Some(parent) = output.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("cannot create {}: {e}", parent.display());
                stats.skipped += 1;
                return;
            }
        }

        // Resume check: a valid pre-existing output means the work is done;
        // an invalid one is deleted and we proceed as if it never existed.
        if output.exists() {
            let outcome =
                validate::validate(&output, probed.duration_secs, probed.resolution, probed.fps);
            match outcome {
                validate::ValidationOutcome::Valid => {
                    info!("skipping: output {} is valid and complete", output.display());
                    stats.skipped += 1;
                    return;
                }
                validate::ValidationOutcome::Rejected(reason) => {
                    info!("overwriting {}: {reason}", output.display());
                    if let Err(e) = fs::remove_file(&output) {
                        warn!("could not remove invalid output {}: {e}", output.display());
                    }
                }
            }
        }

        // Probed → Encoding.
        let job = EncodeJob::build(input, &output, bitrate_kbps, &probed.color);
        info!("starting ffmpeg: {} -> {}", input.display(), output.display());
        info!("bitrate: {bitrate_kbps} kbps");

        match encode::run_encoder(&job) {
            Ok(status) if status.success() => {
                info!("finished: {}", output.display());
                stats.processed += 1;
            }
            Ok(status) => {
                error!("ffmpeg failed for {} ({status})", input.display());
                stats.failed += 1;
                self.quarantine(input);
            }
            Err(e) => {
                // The encoder never ran, so the source is not known-bad;
                // leave it in place for the next run.
                error!("could not run ffmpeg for {}: {e:#}", input.display());
                stats.failed += 1;
            }
        }
    }

    fn quarantine(&self, input: &Path) {
        let quarantine_dir = self.output_root.join(QUARANTINE_DIR);
        match quarantine_source(input, &quarantine_dir) {
            Ok(dest) => info!("moved failed file to {}", dest.display()),
            Err(e) => warn!("could not quarantine {}: {e:#}", input.display()),
        }
    }
}

/// Move a failed source into the quarantine directory, creating it if
/// needed. Falls back to copy-and-remove when rename crosses filesystems.
pub fn quarantine_source(input: &Path, quarantine_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(quarantine_dir).with_context(|| {
        format!(
            "Failed to create quarantine directory {}",
            quarantine_dir.display()
        )
    })?;

    let file_name = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let dest = quarantine_dir.join(file_name);

    if fs::rename(input, &dest).is_err() {
        fs::copy(input, &dest)
            .with_context(|| format!("Failed to copy {} into quarantine", input.display()))?;
        fs::remove_file(input)
            .with_context(|| format!("Failed to remove {} after copy", input.display()))?;
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_mirrors_input_tree() {
        let orch = Orchestrator::new(
            PathBuf::from("/videos/in"),
            PathBuf::from("/videos/out"),
            vec!["mov".to_string()],
        );
        assert_eq!(
            orch.output_path_for(Path::new("/videos/in/clips/a.mov")),
            PathBuf::from("/videos/out/clips/a.mp4")
        );
    }

    #[test]
    fn test_quarantine_moves_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("bad.mov");
        fs::write(&source, b"not really a video").unwrap();
        let quarantine = temp.path().join("out").join(QUARANTINE_DIR);

        let dest = quarantine_source(&source, &quarantine).unwrap();

        assert!(!source.exists(), "source must leave its original path");
        assert_eq!(dest, quarantine.join("bad.mov"));
        assert_eq!(fs::read(&dest).unwrap(), b"not really a video");
    }

    #[test]
    fn test_quarantine_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let quarantine = temp.path().join(QUARANTINE_DIR);
        let result = quarantine_source(&temp.path().join("ghost.mov"), &quarantine);
        assert!(result.is_err());
    }

    #[test]
    fn test_tiny_source_counts_as_skipped() {
        let temp = TempDir::new().unwrap();
        let input_root = temp.path().join("in");
        let output_root = temp.path().join("out");
        fs::create_dir_all(&input_root).unwrap();
        let tiny = input_root.join("tiny.mp4");
        fs::write(&tiny, b"too small").unwrap();

        let orch = Orchestrator::new(input_root, output_root.clone(), vec!["mp4".to_string()]);
        let mut stats = RunStats::default();
        orch.process_file(&tiny, &mut stats);

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.failed, 0);
        assert!(tiny.exists(), "a skipped file is never quarantined");
        assert!(!output_root.join("tiny.mp4").exists());
    }
}
