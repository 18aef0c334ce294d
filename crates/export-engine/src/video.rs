//! Session video encoding via an ffmpeg subprocess.
//!
//! Raw RGB24 frames are piped to ffmpeg's stdin at the session's
//! derived average rate. ffmpeg is discovered on PATH; callers should
//! probe [`ffmpeg_available`] before starting an export.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::DatasetItem;

/// Whether the ffmpeg binary is reachable.
pub fn ffmpeg_available() -> bool {
    command_exists("ffmpeg")
}

/// Encode the dataset's frames into an H.264 video at the given rate.
pub fn write_video(path: &Path, items: &[DatasetItem], fps: f64) -> PlaytraceResult<()> {
    let first = items.first().ok_or(PlaytraceError::EmptySession)?;
    let geometry = first.frame.geometry();

    let args = [
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        "rgb24".to_string(),
        "-video_size".to_string(),
        format!("{}x{}", geometry.width, geometry.height),
        "-framerate".to_string(),
        format!("{fps:.6}"),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        path.display().to_string(),
    ];

    tracing::debug!(?args, "Running ffmpeg");
    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PlaytraceError::export(format!("Failed to start ffmpeg: {e}")))?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| PlaytraceError::export("Failed to capture ffmpeg stderr"))?;

    // Drain stderr concurrently so ffmpeg cannot block on a full pipe.
    let stderr_task = std::thread::spawn(move || -> String {
        let mut output = String::new();
        let mut reader = std::io::BufReader::new(stderr);
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    });

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| PlaytraceError::export("Failed to open ffmpeg stdin"))?;
    let feed_result = items
        .iter()
        .try_for_each(|item| stdin.write_all(item.frame.data()));
    drop(stdin);

    let status = child
        .wait()
        .map_err(|e| PlaytraceError::export(format!("Failed to wait on ffmpeg: {e}")))?;
    let stderr_output = stderr_task
        .join()
        .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

    if let Err(e) = feed_result {
        return Err(PlaytraceError::export(format!(
            "Failed feeding frames to ffmpeg: {e}; stderr: {}",
            stderr_output.trim()
        )));
    }

    if !status.success() {
        return Err(PlaytraceError::export(format!(
            "ffmpeg encode failed (status {}): {}",
            status,
            stderr_output.trim()
        )));
    }

    Ok(())
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
