//! Per-item orchestration (generate -> infer -> slice -> assemble -> stretch), the
//! batch driver, and the on-disk output layout.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    error::{SpritemillError, SpritemillResult},
    media::{merge::merge_and_resize, stretch::stretch_to_duration},
    sanitize::sanitize,
    services::{self, ImageGenerator, VisionModel, parse_grid_hint},
    sheet::{
        animation::Animation,
        slice::{SpriteSheet, slice_grid},
    },
};

/// One batch entry: the prompt and the per-frame display duration of its animation.
#[derive(Clone, Debug, Deserialize)]
pub struct BatchItem {
    pub prompt: String,
    pub frame_duration_ms: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BatchManifest {
    pub items: Vec<BatchItem>,
}

impl BatchManifest {
    pub fn from_json_file(path: &Path) -> SpritemillResult<Self> {
        let f = File::open(path).map_err(|_| SpritemillError::missing_file(path))?;
        let manifest: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse batch manifest '{}'", path.display()))?;
        Ok(manifest)
    }
}

/// Pipeline knobs. Defaults: 1024x1024 standard-quality sheets, 20-second extended
/// clips, animations that loop forever.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub save_directory: PathBuf,
    pub image_size: String,
    pub image_quality: String,
    /// Question posed to the vision service to recover the sheet's grid shape.
    pub grid_prompt: String,
    pub max_tries: u32,
    pub retry_delay: Duration,
    /// GIF loop count; 0 is the "loop forever" sentinel.
    pub animation_loop: u16,
    pub target_duration_sec: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            save_directory: PathBuf::from("generated_sprites"),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            grid_prompt: "How many rows and columns are in this sprite sheet? \
                          Answer with only the two numbers, like: [rows] [columns]."
                .to_string(),
            max_tries: 3,
            retry_delay: Duration::from_secs(1),
            animation_loop: 0,
            target_duration_sec: 20.0,
        }
    }
}

/// Output files produced for one item.
#[derive(Clone, Debug)]
pub struct ItemOutputs {
    pub sheet_png: PathBuf,
    pub animation_gif: PathBuf,
    pub extended_mp4: PathBuf,
}

/// Where one item's outputs live: `save_directory/<sanitized>/<sanitized>.png`, the
/// matching `.gif`, and `Extended_<sanitized>.mp4`.
fn item_layout(save_directory: &Path, prompt: &str) -> (String, ItemOutputs) {
    let name = sanitize(prompt);
    let dir = save_directory.join(&name);
    let outputs = ItemOutputs {
        sheet_png: dir.join(format!("{name}.png")),
        animation_gif: dir.join(format!("{name}.gif")),
        extended_mp4: dir.join(format!("Extended_{name}.mp4")),
    };
    (name, outputs)
}

/// The pipeline object: independently testable stages composed over two opaque
/// services, selected through explicit configuration.
pub struct SpritePipeline {
    generator: Box<dyn ImageGenerator>,
    vision: Box<dyn VisionModel>,
    http: reqwest::blocking::Client,
    cfg: PipelineConfig,
}

impl SpritePipeline {
    pub fn new(
        generator: Box<dyn ImageGenerator>,
        vision: Box<dyn VisionModel>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            vision,
            http: reqwest::blocking::Client::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Run the full generate -> infer -> slice -> assemble -> stretch pipeline for one
    /// prompt. Fails fast; files already written for the item are left in place.
    pub fn run_item(&self, item: &BatchItem) -> SpritemillResult<ItemOutputs> {
        let (name, outputs) = item_layout(&self.cfg.save_directory, &item.prompt);
        info!("processing '{name}'");

        let url = services::with_retries(
            "image generation",
            self.cfg.max_tries,
            self.cfg.retry_delay,
            || {
                self.generator
                    .generate(&item.prompt, &self.cfg.image_size, &self.cfg.image_quality)
            },
        )?;
        services::download_image(&self.http, &url, &outputs.sheet_png)?;

        let reply = services::with_retries(
            "grid inference",
            self.cfg.max_tries,
            self.cfg.retry_delay,
            || self.vision.describe(&self.cfg.grid_prompt, &outputs.sheet_png),
        )?;
        let (rows, cols) = parse_grid_hint(&reply);
        info!("inferred a {rows}x{cols} grid for '{name}'");

        let sheet = SpriteSheet::load(&outputs.sheet_png)?;
        let frames = slice_grid(&sheet, rows, cols)?;
        Animation::new(frames, item.frame_duration_ms, self.cfg.animation_loop)?
            .write_gif(&outputs.animation_gif)?;
        stretch_to_duration(
            &outputs.animation_gif,
            &outputs.extended_mp4,
            self.cfg.target_duration_sec,
        )?;

        Ok(outputs)
    }

    /// Process every item, then optionally merge the successes into one resized video.
    ///
    /// A failed item is logged and skipped; it never aborts the rest of the batch.
    pub fn run_batch(
        &self,
        items: &[BatchItem],
        merge_output: Option<(&Path, u32, u32)>,
    ) -> SpritemillResult<Vec<ItemOutputs>> {
        let mut produced = Vec::new();
        for item in items {
            match self.run_item(item) {
                Ok(outputs) => produced.push(outputs),
                Err(err) => error!("item '{}' failed: {err}", item.prompt),
            }
        }

        if let Some((out_path, width, height)) = merge_output {
            let paths: Vec<PathBuf> = produced.iter().map(|o| o.extended_mp4.clone()).collect();
            if paths.is_empty() {
                info!("nothing to merge, every item failed");
            } else {
                merge_and_resize(&paths, out_path, width, height)?;
            }
        }
        Ok(produced)
    }
}
