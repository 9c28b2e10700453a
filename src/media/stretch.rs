use std::path::Path;

use crate::error::{SpritemillError, SpritemillResult};

use super::{AUDIO_CODEC, VIDEO_CODEC, ensure_parent_dir, ffmpeg_base, probe::probe_video, run_ffmpeg};

/// How many copies of a `source_duration_sec`-long clip are needed to cover
/// `target_duration_sec`, always overshooting so the trim cuts the last copy short
/// rather than the output falling short.
pub(crate) fn repeat_count(
    source_duration_sec: f64,
    target_duration_sec: f64,
) -> SpritemillResult<u64> {
    if !source_duration_sec.is_finite() || source_duration_sec <= 0.0 {
        return Err(SpritemillError::invalid_source_duration(format!(
            "source duration must be a positive number of seconds, got {source_duration_sec}"
        )));
    }
    Ok((target_duration_sec / source_duration_sec).floor() as u64 + 1)
}

/// Repeat `input` until it reaches `target_duration_sec`, trim to exactly that
/// duration, and re-encode as MP4 (libx264 + aac, yuv420p).
///
/// Returns the probed source duration. A source whose container reports a zero or
/// unknown duration fails with `InvalidSourceDuration` before any division happens.
pub fn stretch_to_duration(
    input: &Path,
    output: &Path,
    target_duration_sec: f64,
) -> SpritemillResult<f64> {
    if !target_duration_sec.is_finite() || target_duration_sec <= 0.0 {
        return Err(anyhow::anyhow!(
            "target duration must be a positive number of seconds, got {target_duration_sec}"
        )
        .into());
    }

    let info = probe_video(input)?;
    let repeats = repeat_count(info.duration_sec, target_duration_sec)?;
    ensure_parent_dir(output)?;

    let mut cmd = ffmpeg_base();
    // -stream_loop N replays the input N extra times, so N = repeats - 1 yields
    // `repeats` concatenated copies; -t then trims to [0, target).
    cmd.args(["-stream_loop", &(repeats - 1).to_string(), "-i"])
        .arg(input)
        .args([
            "-t",
            &format!("{target_duration_sec}"),
            // yuv420p needs even dimensions; coerce odd sprite cells down one pixel.
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-c:v",
            VIDEO_CODEC,
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            AUDIO_CODEC,
            "-movflags",
            "+faststart",
        ])
        .arg(output);
    run_ffmpeg(cmd, "duration stretch")?;

    tracing::info!(
        "stretched '{}' ({:.3}s x{repeats}) to '{}' at {target_duration_sec}s",
        input.display(),
        info.duration_sec,
        output.display()
    );
    Ok(info.duration_sec)
}
