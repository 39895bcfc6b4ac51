// ffmpeg command assembly for the fixed HEVC/AAC normalization target

use super::probe::ColorInfo;
use std::path::{Path, PathBuf};
use std::process::Command;
use sysinfo::System;

/// Every output lands in this container, whatever the source was.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// x265 never benefits from more worker threads than this here.
const MAX_ENCODER_THREADS: usize = 12;

const AUDIO_BITRATE: &str = "256k";

/// One encoder invocation: built once per file, consumed once. Carries no
/// identity beyond its paths and parameters, and performs no I/O itself.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub bitrate_kbps: u32,
    pub x265_params: String,
}

impl EncodeJob {
    /// Assemble the invocation for one source file.
    pub fn build(input: &Path, output: &Path, bitrate_kbps: u32, color: &ColorInfo) -> Self {
        Self {
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            bitrate_kbps,
            x265_params: x265_params(encoder_threads(), color),
        }
    }

    /// The full ffmpeg command. `-y` so a partially written destination from
    /// an interrupted run gets overwritten rather than aborting the encode.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y")
            .arg("-i")
            .arg(&self.input_path)
            .args(["-c:v", "libx265"])
            .args(["-pix_fmt", "yuv420p10le"])
            .args(["-preset", "medium"])
            .args(["-tune", "fastdecode"])
            .args(["-vtag", "hvc1"])
            .args(["-c:a", "aac"])
            .args(["-b:a", AUDIO_BITRATE])
            .args(["-map", "0:a", "-map", "0:v"])
            .args(["-threads", "0"])
            .args(["-x265-params", &self.x265_params])
            .args(["-b:v", &format!("{}k", self.bitrate_kbps)])
            .arg(&self.output_path);
        cmd
    }

    /// Shell-quoted rendition of the command, for logs and dry runs.
    pub fn display_command(&self) -> String {
        let cmd = self.command();
        let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
        parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
        shlex::try_join(parts.iter().map(String::as_str))
            .unwrap_or_else(|_| parts.join(" "))
    }
}

fn x265_params(threads: usize, color: &ColorInfo) -> String {
    format!(
        "threads={threads}:level=5.1:profile=main10:ctu=64:tu-intra-depth=2:\
         colorprim={}:transfer={}:colormatrix={}",
        color.primaries, color.transfer, color.matrix
    )
}

/// Cap the x265 thread pool at min(12, logical cores).
fn encoder_threads() -> usize {
    let mut sys = System::new();
    sys.refresh_cpu();
    let cores = sys.cpus().len().max(1);
    cores.min(MAX_ENCODER_THREADS)
}
