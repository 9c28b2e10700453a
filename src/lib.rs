//! Spritemill turns text prompts into short looping sprite videos.
//!
//! The pipeline is strictly linear per item:
//!
//! 1. **Generate**: prompt -> sprite-sheet PNG (image-generation service + download)
//! 2. **Infer**: sprite-sheet PNG -> `(rows, cols)` grid hint (vision service)
//! 3. **Slice**: sheet + grid -> ordered frames, row-major
//! 4. **Assemble**: frames -> looping GIF
//! 5. **Stretch**: GIF -> fixed-duration MP4 (system `ffmpeg`, libx264 + aac)
//! 6. **Merge** (optional): many MP4s -> one uniformly resized MP4
//! 7. **Audio** (optional): loop a track (or its chorus clip) onto the final video
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Synchronous throughout**: blocking HTTP and blocking `ffmpeg` child processes;
//!   each stage completes fully before the next starts.
//! - **External work is opaque**: generation and inference sit behind traits, codec
//!   operations go through the system `ffmpeg`/`ffprobe` binaries.
#![forbid(unsafe_code)]

pub mod error;
pub mod media;
pub mod pipeline;
pub mod sanitize;
pub mod services;
pub mod sheet;

pub use error::{SpritemillError, SpritemillResult};
pub use media::probe::{VideoSourceInfo, probe_video};
pub use pipeline::{BatchItem, BatchManifest, ItemOutputs, PipelineConfig, SpritePipeline};
pub use sanitize::sanitize;
pub use services::{ImageGenerator, VisionModel, parse_grid_hint};
pub use sheet::animation::Animation;
pub use sheet::slice::{SpriteFrame, SpriteSheet, slice_grid};
