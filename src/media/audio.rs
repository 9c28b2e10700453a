use std::path::{Path, PathBuf};

use crate::error::{SpritemillError, SpritemillResult};

use super::{AUDIO_CODEC, ensure_parent_dir, ffmpeg_base, probe::probe_video, require_readable, run_ffmpeg};

/// Opaque chorus-detection seam.
///
/// Implementations hand back a representative clip of the track, written somewhere
/// under `scratch_dir`. `None` means no clip was produced and the full track is looped
/// instead.
pub trait ChorusDetector {
    fn extract_chorus(&self, audio: &Path, scratch_dir: &Path)
    -> SpritemillResult<Option<PathBuf>>;
}

/// Default detector: no analysis, always fall back to the full track.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoChorusDetection;

impl ChorusDetector for NoChorusDetection {
    fn extract_chorus(
        &self,
        _audio: &Path,
        _scratch_dir: &Path,
    ) -> SpritemillResult<Option<PathBuf>> {
        Ok(None)
    }
}

/// Replace `video`'s audio with `audio` looped to the video's exact duration.
///
/// The detector may substitute a chorus clip for the full track; either way the clip
/// loops indefinitely and `-shortest` trims it to the video. The video stream is
/// copied untouched, the audio is re-encoded as aac.
pub fn attach_looped_audio(
    video: &Path,
    audio: &Path,
    output: &Path,
    detector: &dyn ChorusDetector,
    scratch_dir: &Path,
) -> SpritemillResult<()> {
    require_readable(video)?;
    require_readable(audio)?;

    let clip = match detector.extract_chorus(audio, scratch_dir)? {
        Some(chorus) if chorus.is_file() => chorus,
        _ => audio.to_path_buf(),
    };

    ensure_parent_dir(output)?;
    let mut cmd = ffmpeg_base();
    // -map 0:v drops any audio the video already carries.
    cmd.arg("-i")
        .arg(video)
        .args(["-stream_loop", "-1", "-i"])
        .arg(&clip)
        .args([
            "-map",
            "0:v",
            "-map",
            "1:a",
            "-c:v",
            "copy",
            "-c:a",
            AUDIO_CODEC,
            "-shortest",
            "-movflags",
            "+faststart",
        ])
        .arg(output);
    run_ffmpeg(cmd, "audio overlay")?;

    tracing::info!(
        "attached '{}' (looped) to '{}' as '{}'",
        clip.display(),
        video.display(),
        output.display()
    );
    Ok(())
}

/// Demux `video`'s audio track into `output` as PCM WAV.
pub fn extract_audio(video: &Path, output: &Path) -> SpritemillResult<()> {
    let info = probe_video(video)?;
    if !info.has_audio {
        return Err(SpritemillError::external(format!(
            "'{}' has no audio stream to extract",
            video.display()
        )));
    }

    ensure_parent_dir(output)?;
    let mut cmd = ffmpeg_base();
    cmd.arg("-i")
        .arg(video)
        .args(["-vn", "-acodec", "pcm_s16le"])
        .arg(output);
    run_ffmpeg(cmd, "audio extract")
}
