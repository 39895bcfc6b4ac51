// Running the external encoder and draining its output

use super::job::EncodeJob;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::process::{ExitStatus, Stdio};
use std::thread;
use tracing::info;

/// Spawn ffmpeg for `job`, stream its combined output into the log line by
/// line, and wait for it to finish.
///
/// stderr is drained on its own thread while the main thread reads stdout,
/// so neither pipe can fill up and stall the encoder.
pub fn run_encoder(job: &EncodeJob) -> Result<ExitStatus> {
    let mut cmd = job.command();
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().context("Failed to spawn ffmpeg")?;

    let stderr = child.stderr.take().context("Failed to capture stderr")?;
    let stderr_thread = thread::spawn(move || {
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            log_encoder_line(&line);
        }
    });

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    for line in BufReader::new(stdout).lines().map_while(Result::ok) {
        log_encoder_line(&line);
    }

    let status = child.wait().context("Failed to wait for ffmpeg")?;
    let _ = stderr_thread.join();

    Ok(status)
}

fn log_encoder_line(line: &str) {
    let line = line.trim_end();
    if !line.is_empty() {
        info!(target: "ffmpeg", "{line}");
    }
}

/// Check if ffmpeg is available and return its version line
pub fn ffmpeg_version() -> Result<String> {
    let output = std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .context("Failed to execute ffmpeg. Is ffmpeg installed and in PATH?")?;

    if !output.status.success() {
        anyhow::bail!("ffmpeg command failed with status: {}", output.status);
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    let first_line = version_output.lines().next().unwrap_or("Unknown version");

    Ok(first_line.to_string())
}
