use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use crate::error::SpritemillResult;

use super::{VIDEO_CODEC, ensure_parent_dir, ffmpeg_base, require_readable, run_ffmpeg};

/// Build the filter graph that stretches every input to `width x height` and
/// concatenates them in order. Aspect ratio is intentionally not preserved.
pub(crate) fn concat_filter(input_count: usize, width: u32, height: u32) -> String {
    let mut filter = String::new();
    for idx in 0..input_count {
        let _ = write!(filter, "[{idx}:v]scale={width}:{height},setsar=1[v{idx}];");
    }
    for idx in 0..input_count {
        let _ = write!(filter, "[v{idx}]");
    }
    let _ = write!(filter, "concat=n={input_count}:v=1:a=0[out]");
    filter
}

/// Concatenate `video_paths` in the given order into one MP4, with every input first
/// stretched to exactly `target_width x target_height`.
pub fn merge_and_resize(
    video_paths: &[PathBuf],
    output: &Path,
    target_width: u32,
    target_height: u32,
) -> SpritemillResult<()> {
    if video_paths.is_empty() {
        return Err(anyhow::anyhow!("no videos to merge").into());
    }
    if target_width == 0 || target_height == 0 {
        return Err(anyhow::anyhow!("merge width/height must be non-zero").into());
    }
    if !target_width.is_multiple_of(2) || !target_height.is_multiple_of(2) {
        return Err(anyhow::anyhow!(
            "merge width/height must be even (required for yuv420p mp4 output)"
        )
        .into());
    }

    for path in video_paths {
        require_readable(path)?;
    }
    ensure_parent_dir(output)?;

    let mut cmd = ffmpeg_base();
    for path in video_paths {
        cmd.arg("-i").arg(path);
    }
    cmd.args([
        "-filter_complex",
        &concat_filter(video_paths.len(), target_width, target_height),
        "-map",
        "[out]",
        "-c:v",
        VIDEO_CODEC,
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ])
    .arg(output);
    run_ffmpeg(cmd, "merge")?;

    tracing::info!(
        "merged {} clips into '{}' at {target_width}x{target_height}",
        video_paths.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::SpritemillError;

    use super::*;

    #[test]
    fn filter_scales_each_input_then_concatenates() {
        assert_eq!(
            concat_filter(2, 128, 128),
            "[0:v]scale=128:128,setsar=1[v0];[1:v]scale=128:128,setsar=1[v1];\
             [v0][v1]concat=n=2:v=1:a=0[out]"
        );
    }

    #[test]
    fn missing_input_is_missing_file() {
        let paths = vec![PathBuf::from("definitely/not/here.mp4")];
        let err = merge_and_resize(&paths, Path::new("out.mp4"), 128, 128).unwrap_err();
        assert!(matches!(err, SpritemillError::MissingFile(_)));
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        let paths = vec![PathBuf::from("a.mp4")];
        assert!(merge_and_resize(&paths, Path::new("out.mp4"), 127, 128).is_err());
        assert!(merge_and_resize(&paths, Path::new("out.mp4"), 128, 0).is_err());
    }
}
