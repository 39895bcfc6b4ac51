//! Resume validation: decide whether a pre-existing output file is good
//! enough to skip re-encoding.

use super::policy::target_bitrate_kbps;
use super::probe::{self, ProbeDoc, ResolutionClass};
use std::fmt;
use std::fs;
use std::path::Path;

/// Outputs smaller than this are never accepted.
pub const MIN_OUTPUT_BYTES: u64 = 100 * 1024;

/// Accepted output duration as a fraction of the source duration.
pub const DURATION_TOLERANCE: f64 = 0.995;

/// An existing output is rejected when its overall bitrate falls below this
/// fraction of the policy target.
pub const MIN_BITRATE_RATIO: f64 = 0.5;

const TARGET_VIDEO_CODEC: &str = "hevc";
const TARGET_AUDIO_CODEC: &str = "aac";

/// Why an existing output was rejected. Logged, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    TooSmall(u64),
    Unprobeable(String),
    MissingStream,
    WrongCodec,
    Truncated { output_secs: f64, input_secs: f64 },
    IncompleteMetadata,
    BitrateTooLow { actual_kbps: u32, expected_kbps: u32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall(bytes) => write!(f, "file is too small ({bytes} bytes)"),
            Self::Unprobeable(err) => write!(f, "output could not be probed: {err}"),
            Self::MissingStream => write!(f, "expected exactly one video and one audio stream"),
            Self::WrongCodec => write!(
                f,
                "codecs are not {TARGET_VIDEO_CODEC}/{TARGET_AUDIO_CODEC}"
            ),
            Self::Truncated {
                output_secs,
                input_secs,
            } => write!(
                f,
                "output runs {output_secs:.2}s against a {input_secs:.2}s source"
            ),
            Self::IncompleteMetadata => write!(f, "essential stream metadata is missing"),
            Self::BitrateTooLow {
                actual_kbps,
                expected_kbps,
            } => write!(
                f,
                "bitrate {actual_kbps} kbps is too low, expected ~{expected_kbps} kbps"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    Rejected(RejectReason),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Validate an existing file at the intended output path.
///
/// Every internal error degrades to a rejection; this function never fails
/// the run, it only decides between "skip" and "re-encode".
pub fn validate(
    output_path: &Path,
    input_duration: f64,
    resolution: ResolutionClass,
    fps: f64,
) -> ValidationOutcome {
    let size = match fs::metadata(output_path) {
        Ok(meta) => meta.len(),
        Err(e) => return ValidationOutcome::Rejected(RejectReason::Unprobeable(e.to_string())),
    };
    if size < MIN_OUTPUT_BYTES {
        return ValidationOutcome::Rejected(RejectReason::TooSmall(size));
    }

    let doc = match probe::run_ffprobe(output_path, false) {
        Ok(doc) => doc,
        Err(e) => return ValidationOutcome::Rejected(RejectReason::Unprobeable(e.to_string())),
    };

    judge(&doc, input_duration, resolution, fps)
}

/// The pure decision over an already-probed output document.
pub fn judge(
    doc: &ProbeDoc,
    input_duration: f64,
    resolution: ResolutionClass,
    fps: f64,
) -> ValidationOutcome {
    use ValidationOutcome::Rejected;

    let videos: Vec<_> = doc.streams.iter().filter(|s| s.is_video()).collect();
    let audios: Vec<_> = doc.streams.iter().filter(|s| s.is_audio()).collect();
    if videos.len() != 1 || audios.len() != 1 {
        return Rejected(RejectReason::MissingStream);
    }
    let (video, audio) = (videos[0], audios[0]);

    if video.codec_name.as_deref() != Some(TARGET_VIDEO_CODEC)
        || audio.codec_name.as_deref() != Some(TARGET_AUDIO_CODEC)
    {
        return Rejected(RejectReason::WrongCodec);
    }

    let output_duration = probe::parse_duration(&doc.format);
    if input_duration > 0.0 && output_duration < input_duration * DURATION_TOLERANCE {
        return Rejected(RejectReason::Truncated {
            output_secs: output_duration,
            input_secs: input_duration,
        });
    }

    let video_complete = video.width.is_some() && video.height.is_some() && video.pix_fmt.is_some();
    let audio_complete = audio.sample_rate.is_some() && audio.channels.is_some();
    if !video_complete || !audio_complete {
        return Rejected(RejectReason::IncompleteMetadata);
    }

    let expected_kbps = target_bitrate_kbps(resolution, fps);
    let actual_kbps = doc
        .format
        .bit_rate
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .map(|bps| (bps / 1000) as u32)
        .unwrap_or(0);
    if (actual_kbps as f64) < expected_kbps as f64 * MIN_BITRATE_RATIO {
        return Rejected(RejectReason::BitrateTooLow {
            actual_kbps,
            expected_kbps,
        });
    }

    ValidationOutcome::Valid
}
