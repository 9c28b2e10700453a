//! System `ffmpeg`/`ffprobe` plumbing shared by the stretch, merge, and audio stages.
//!
//! We intentionally drive the system binaries rather than linking FFmpeg natively, to
//! avoid native dev header/lib requirements. All invocations run to completion before
//! the next stage starts.

pub mod audio;
pub mod merge;
pub mod probe;
pub mod stretch;

use std::{path::Path, process::Command};

use crate::error::{SpritemillError, SpritemillResult};

/// Fixed output codec identifiers. Every encoded output targets these for consistent
/// playback compatibility, even when the source carries no audio stream.
pub const VIDEO_CODEC: &str = "libx264";
pub const AUDIO_CODEC: &str = "aac";

pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg")
}

pub fn is_ffprobe_on_path() -> bool {
    is_tool_on_path("ffprobe")
}

fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SpritemillResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Fail with `MissingFile` unless `path` is a readable regular file.
pub(crate) fn require_readable(path: &Path) -> SpritemillResult<()> {
    if !std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false) {
        return Err(SpritemillError::missing_file(path));
    }
    Ok(())
}

/// Start an `ffmpeg` invocation with quiet logging and overwrite enabled.
pub(crate) fn ffmpeg_base() -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-y"]);
    cmd
}

/// Run a fully-configured `ffmpeg` command to completion, surfacing stderr on failure.
pub(crate) fn run_ffmpeg(mut cmd: Command, what: &str) -> SpritemillResult<()> {
    if !is_ffmpeg_on_path() {
        return Err(SpritemillError::external(format!(
            "ffmpeg is required for {what}, but was not found on PATH"
        )));
    }

    let out = cmd
        .output()
        .map_err(|e| SpritemillError::external(format!("failed to run ffmpeg for {what}: {e}")))?;
    if !out.status.success() {
        return Err(SpritemillError::external(format!(
            "ffmpeg {what} exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}
