// Source probing and interpretation using ffprobe

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::warn;

/// Sources smaller than this are rejected before ffprobe is even invoked.
pub const MIN_SOURCE_BYTES: u64 = 1024;

/// Frame rate assumed when the stream reports none or reports garbage.
pub const FALLBACK_FPS: f64 = 30.0;

/// Side data types that mark a stream as HDR.
const HDR_SIDE_DATA: &[&str] = &[
    "Mastering display metadata",
    "Content light level metadata",
];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("file is too small to be a video ({0} bytes)")]
    TooSmall(u64),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("ffprobe failed ({status}): {stderr}")]
    Ffprobe { status: String, stderr: String },

    #[error("probe data is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("malformed ffprobe JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse resolution bucket derived from pixel height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionClass {
    P480,
    P720,
    P1080,
    K4,
    Unknown,
}

impl ResolutionClass {
    /// Classify by height with inclusive upper thresholds.
    pub fn from_height(height: u32) -> Self {
        match height {
            0..=480 => Self::P480,
            481..=720 => Self::P720,
            721..=1080 => Self::P1080,
            1081..=2160 => Self::K4,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ResolutionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::K4 => "4k",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Color tags carried through to the encoder verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorInfo {
    pub primaries: String,
    pub transfer: String,
    pub matrix: String,
}

impl Default for ColorInfo {
    fn default() -> Self {
        Self {
            primaries: "bt709".to_string(),
            transfer: "bt709".to_string(),
            matrix: "bt709".to_string(),
        }
    }
}

/// Everything the rest of the pipeline needs to know about one source file.
///
/// Only constructed when a video stream was actually found; a source with no
/// video stream is a probe failure, not a zero-valued result.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub resolution: ResolutionClass,
    pub fps: f64,
    pub color: ColorInfo,
    pub duration_secs: f64,
}

// ffprobe JSON document model. Every field is optional because ffprobe omits
// anything it cannot determine; requiredness is enforced during
// interpretation, not deserialization.

#[derive(Debug, Default, Deserialize)]
pub struct ProbeDoc {
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
    #[serde(default)]
    pub format: FormatInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatInfo {
    pub duration: Option<String>,
    pub bit_rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamInfo {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub r_frame_rate: Option<String>,
    pub pix_fmt: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<u32>,
    pub color_primaries: Option<String>,
    pub color_transfer: Option<String>,
    pub color_space: Option<String>,
    #[serde(default)]
    pub side_data_list: Vec<SideData>,
}

#[derive(Debug, Deserialize)]
pub struct SideData {
    pub side_data_type: Option<String>,
}

impl StreamInfo {
    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type.as_deref() == Some("audio")
    }

    fn has_hdr_side_data(&self) -> bool {
        self.side_data_list.iter().any(|sd| {
            sd.side_data_type
                .as_deref()
                .is_some_and(|t| HDR_SIDE_DATA.contains(&t))
        })
    }
}

/// Run ffprobe over `path`, optionally restricted to the first video stream.
pub fn run_ffprobe(path: &Path, select_video: bool) -> Result<ProbeDoc, ProbeError> {
    let mut cmd = Command::new("ffprobe");
    cmd.args(["-v", "error", "-show_streams", "-show_format"]);
    if select_video {
        cmd.args(["-select_streams", "v:0"]);
    }
    cmd.args(["-print_format", "json"]).arg(path);

    let output = cmd.output()?;
    if !output.status.success() {
        return Err(ProbeError::Ffprobe {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Check if ffprobe is available and return its version line
pub fn ffprobe_version() -> anyhow::Result<String> {
    use anyhow::Context;

    let output = Command::new("ffprobe")
        .arg("-version")
        .output()
        .context("Failed to execute ffprobe. Is ffprobe installed and in PATH?")?;

    if !output.status.success() {
        anyhow::bail!("ffprobe command failed with status: {}", output.status);
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    let first_line = version_output.lines().next().unwrap_or("Unknown version");

    Ok(first_line.to_string())
}

/// Probe a source file and interpret the result.
pub fn analyze(path: &Path) -> Result<ProbeResult, ProbeError> {
    let size = fs::metadata(path)?.len();
    if size < MIN_SOURCE_BYTES {
        return Err(ProbeError::TooSmall(size));
    }

    let mut doc = run_ffprobe(path, true)?;
    if !doc.streams.iter().any(StreamInfo::is_video) {
        // Some containers hide the video stream from the v:0 selector;
        // retry unselected and pick the first video stream ourselves.
        warn!(
            "no video stream under v:0 selector in {}, probing all streams",
            path.display()
        );
        doc = run_ffprobe(path, false)?;
    }

    interpret(&doc)
}

/// Turn a parsed ffprobe document into a `ProbeResult`.
///
/// Pure over the document so it can be exercised without invoking ffprobe.
pub fn interpret(doc: &ProbeDoc) -> Result<ProbeResult, ProbeError> {
    let video = doc
        .streams
        .iter()
        .find(|s| s.is_video())
        .ok_or(ProbeError::NoVideoStream)?;

    video.width.ok_or(ProbeError::MissingField("width"))?;
    let height = video.height.ok_or(ProbeError::MissingField("height"))?;

    let fps_str = video.r_frame_rate.as_deref().unwrap_or("30/1");
    let fps = match parse_rational(fps_str) {
        Some(fps) => fps,
        None => {
            warn!("invalid frame rate {fps_str:?}, defaulting to {FALLBACK_FPS}");
            FALLBACK_FPS
        }
    };

    let defaults = ColorInfo::default();
    let mut color = ColorInfo {
        primaries: video.color_primaries.clone().unwrap_or(defaults.primaries),
        transfer: video.color_transfer.clone().unwrap_or(defaults.transfer),
        matrix: video.color_space.clone().unwrap_or(defaults.matrix),
    };
    if video.has_hdr_side_data() {
        color.transfer = "smpte2084".to_string();
    }

    Ok(ProbeResult {
        resolution: ResolutionClass::from_height(height),
        fps,
        color,
        duration_secs: parse_duration(&doc.format),
    })
}

/// Duration in seconds from the format section, 0 when absent or unparsable.
pub fn parse_duration(format: &FormatInfo) -> f64 {
    format
        .duration
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| *d >= 0.0)
        .unwrap_or(0.0)
}

/// Parse a frame-rate fraction like "30000/1001".
///
/// Deliberately a two-integer split, not an expression evaluator: the string
/// comes from an external process and must never be interpreted as code.
pub fn parse_rational(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: u64 = num.trim().parse().ok()?;
    let den: u64 = den.trim().parse().ok()?;
    if den == 0 || num == 0 {
        return None;
    }
    Some(num as f64 / den as f64)
}
