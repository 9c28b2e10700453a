use std::{fs::File, io::BufWriter, path::Path};

use anyhow::Context as _;
use image::{
    Delay, Frame,
    codecs::gif::{GifEncoder, Repeat},
};

use crate::{
    error::{SpritemillError, SpritemillResult},
    media::ensure_parent_dir,
    sheet::slice::SpriteFrame,
};

/// An ordered frame sequence plus playback parameters.
///
/// `loop_count == 0` is the inherited "loop forever" sentinel (GIF convention); it
/// never means zero playbacks.
#[derive(Clone, Debug)]
pub struct Animation {
    frames: Vec<SpriteFrame>,
    frame_duration_ms: u32,
    loop_count: u16,
}

impl Animation {
    pub fn new(
        frames: Vec<SpriteFrame>,
        frame_duration_ms: u32,
        loop_count: u16,
    ) -> SpritemillResult<Self> {
        if frames.is_empty() {
            return Err(SpritemillError::EmptyFrames);
        }
        Ok(Self {
            frames,
            frame_duration_ms,
            loop_count,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_duration_ms(&self) -> u32 {
        self.frame_duration_ms
    }

    pub fn repeat(&self) -> Repeat {
        if self.loop_count == 0 {
            Repeat::Infinite
        } else {
            Repeat::Finite(self.loop_count)
        }
    }

    /// Encode all frames, in order, into a single GIF at `out_path`.
    pub fn write_gif(&self, out_path: &Path) -> SpritemillResult<()> {
        ensure_parent_dir(out_path)?;
        let file = File::create(out_path)
            .with_context(|| format!("create animation '{}'", out_path.display()))?;

        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder.set_repeat(self.repeat()).context("set gif repeat")?;

        for frame in &self.frames {
            let delay = Delay::from_numer_denom_ms(self.frame_duration_ms, 1);
            encoder
                .encode_frame(Frame::from_parts(frame.image.clone(), 0, 0, delay))
                .with_context(|| {
                    format!("encode frame ({}, {}) into gif", frame.row, frame.col)
                })?;
        }

        tracing::info!(
            "wrote {} with {} frames at {}ms each",
            out_path.display(),
            self.frames.len(),
            self.frame_duration_ms
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;

    fn frame(row: u32, col: u32) -> SpriteFrame {
        SpriteFrame {
            row,
            col,
            image: RgbaImage::from_pixel(4, 4, image::Rgba([row as u8, col as u8, 0, 255])),
        }
    }

    #[test]
    fn zero_frames_is_an_error() {
        assert!(matches!(
            Animation::new(Vec::new(), 100, 0),
            Err(SpritemillError::EmptyFrames)
        ));
    }

    #[test]
    fn loop_zero_means_infinite_repeat() {
        let anim = Animation::new(vec![frame(0, 0)], 100, 0).unwrap();
        assert!(matches!(anim.repeat(), Repeat::Infinite));

        let anim = Animation::new(vec![frame(0, 0)], 100, 3).unwrap();
        assert!(matches!(anim.repeat(), Repeat::Finite(3)));
    }

    #[test]
    fn frame_count_matches_input() {
        let anim = Animation::new(vec![frame(0, 0), frame(0, 1), frame(1, 0)], 150, 0).unwrap();
        assert_eq!(anim.frame_count(), 3);
    }
}
