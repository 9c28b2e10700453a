//! Integration tests that exercise the stretch/merge/audio stages against the real
//! `ffmpeg`/`ffprobe` binaries. Each test skips itself when the tools are missing.

use std::{path::Path, process::Command};

use spritemill::{
    SpritemillError,
    media::{
        audio::{NoChorusDetection, attach_looped_audio, extract_audio},
        merge::merge_and_resize,
        stretch::stretch_to_duration,
    },
    probe_video,
};

fn ffmpeg_tools_available() -> bool {
    let ffmpeg_ok = Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    let ffprobe_ok = Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    ffmpeg_ok && ffprobe_ok
}

fn synth_clip(path: &Path, seconds: f64, with_audio: bool) -> anyhow::Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args([
        "-v",
        "error",
        "-y",
        "-f",
        "lavfi",
        "-i",
        "testsrc=size=64x64:rate=10",
    ]);
    if with_audio {
        cmd.args(["-f", "lavfi", "-i", "sine=frequency=440:sample_rate=48000"]);
    }
    cmd.args([
        "-t",
        &seconds.to_string(),
        "-pix_fmt",
        "yuv420p",
        "-c:v",
        "libx264",
    ]);
    if with_audio {
        cmd.args(["-c:a", "aac"]);
    }
    let status = cmd.arg(path).status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating {}", path.display());
    Ok(())
}

fn synth_tone(path: &Path, seconds: f64) -> anyhow::Result<()> {
    let status = Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-y",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=220:sample_rate=48000",
            "-t",
            &seconds.to_string(),
            "-c:a",
            "pcm_s16le",
        ])
        .arg(path)
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating {}", path.display());
    Ok(())
}

#[test]
fn stretch_repeats_and_trims_to_the_exact_target() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    synth_clip(&clip, 5.0, false).unwrap();

    let out = dir.path().join("extended.mp4");
    let source_duration = stretch_to_duration(&clip, &out, 20.0).unwrap();
    assert!((source_duration - 5.0).abs() < 0.25);

    let info = probe_video(&out).unwrap();
    assert!(
        (info.duration_sec - 20.0).abs() < 0.25,
        "expected ~20s, got {}",
        info.duration_sec
    );
}

#[test]
fn stretch_accepts_a_target_shorter_than_the_source() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    synth_clip(&clip, 4.0, false).unwrap();

    let out = dir.path().join("short.mp4");
    stretch_to_duration(&clip, &out, 1.5).unwrap();
    let info = probe_video(&out).unwrap();
    assert!((info.duration_sec - 1.5).abs() < 0.25, "got {}", info.duration_sec);
}

#[test]
fn merge_resizes_every_input_and_sums_durations() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = Vec::new();
    for idx in 0..3 {
        let clip = dir.path().join(format!("clip{idx}.mp4"));
        synth_clip(&clip, 2.0, false).unwrap();
        inputs.push(clip);
    }

    let out = dir.path().join("merged.mp4");
    merge_and_resize(&inputs, &out, 128, 128).unwrap();

    let info = probe_video(&out).unwrap();
    assert_eq!((info.width, info.height), (128, 128));
    assert!(
        (info.duration_sec - 6.0).abs() < 0.5,
        "expected ~6s, got {}",
        info.duration_sec
    );
}

#[test]
fn attach_looped_audio_covers_the_whole_video() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("video.mp4");
    synth_clip(&video, 4.0, false).unwrap();
    let tone = dir.path().join("tone.wav");
    synth_tone(&tone, 1.0).unwrap();

    let out = dir.path().join("with_audio.mp4");
    attach_looped_audio(&video, &tone, &out, &NoChorusDetection, dir.path()).unwrap();

    let info = probe_video(&out).unwrap();
    assert!(info.has_audio);
    assert!(
        (info.duration_sec - 4.0).abs() < 0.5,
        "expected ~4s, got {}",
        info.duration_sec
    );
}

#[test]
fn extract_audio_demuxes_a_wav_track() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("video.mp4");
    synth_clip(&video, 2.0, true).unwrap();

    let out = dir.path().join("track.wav");
    extract_audio(&video, &out).unwrap();
    assert!(out.is_file());

    let silent = dir.path().join("silent.mp4");
    synth_clip(&silent, 1.0, false).unwrap();
    let err = extract_audio(&silent, &dir.path().join("none.wav")).unwrap_err();
    assert!(matches!(err, SpritemillError::ExternalService(_)));
}

#[test]
fn gif_input_stretches_to_mp4() {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();

    // Build a small looping GIF the same way the pipeline does.
    let mut img = image::RgbaImage::new(32, 32);
    for y in 0..32 {
        for x in 0..32 {
            img.put_pixel(x, y, image::Rgba([(x * 8) as u8, (y * 8) as u8, 0, 255]));
        }
    }
    let sheet = spritemill::SpriteSheet::new(img);
    let frames = spritemill::slice_grid(&sheet, 2, 2).unwrap();
    let gif = dir.path().join("anim.gif");
    spritemill::Animation::new(frames, 250, 0)
        .unwrap()
        .write_gif(&gif)
        .unwrap();

    let out = dir.path().join("extended.mp4");
    stretch_to_duration(&gif, &out, 5.0).unwrap();
    let info = probe_video(&out).unwrap();
    assert!(
        (info.duration_sec - 5.0).abs() < 0.5,
        "expected ~5s, got {}",
        info.duration_sec
    );
}
