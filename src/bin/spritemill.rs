use std::path::PathBuf;

use clap::{Parser, Subcommand};

use spritemill::{
    media::{
        audio::{NoChorusDetection, attach_looped_audio, extract_audio},
        merge::merge_and_resize,
        stretch::stretch_to_duration,
    },
    pipeline::{BatchManifest, PipelineConfig, SpritePipeline},
    services::{gemini::GeminiClient, openai::DallEClient},
    sheet::{
        animation::Animation,
        slice::{SpriteSheet, slice_grid},
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "spritemill",
    version,
    about = "Turn text prompts into looping sprite videos"
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full prompt-to-video pipeline over a batch manifest.
    Run(RunArgs),
    /// Slice a local sprite sheet into a looping GIF.
    Gif(GifArgs),
    /// Stretch a short looping clip to an exact duration as MP4.
    Stretch(StretchArgs),
    /// Concatenate videos, uniformly resized, into one MP4.
    Merge(MergeArgs),
    /// Loop an audio track onto a video, replacing its audio.
    AddAudio(AddAudioArgs),
    /// Extract a video's audio track to a WAV file.
    ExtractAudio(ExtractAudioArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Batch manifest JSON: {"items": [{"prompt", "frame_duration_ms"}]}.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for generated sheets, GIFs, and videos.
    #[arg(long, default_value = "generated_sprites")]
    out_dir: PathBuf,

    /// API key for the image-generation service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Optional organization id sent with generation requests.
    #[arg(long, env = "OPENAI_ORGANIZATION", hide_env_values = true)]
    openai_organization: Option<String>,

    /// API key for the vision-inference service.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: String,

    /// Target duration of each extended clip, in seconds.
    #[arg(long, default_value = "20")]
    duration: f64,

    /// Merge all produced clips into this file (relative paths land under --out-dir).
    #[arg(long)]
    merge_into: Option<PathBuf>,

    /// Width of the merged output.
    #[arg(long, default_value = "480")]
    width: u32,

    /// Height of the merged output.
    #[arg(long, default_value = "480")]
    height: u32,

    /// Attempts for each generation/inference call.
    #[arg(long, default_value = "3")]
    max_tries: u32,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Input sprite-sheet image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Grid rows in the sheet.
    #[arg(long)]
    rows: u32,

    /// Grid columns in the sheet.
    #[arg(long)]
    cols: u32,

    /// Display duration of each frame, in milliseconds.
    #[arg(long, default_value = "150")]
    frame_duration_ms: u32,

    /// GIF loop count; 0 loops forever.
    #[arg(long = "loop", default_value = "0")]
    loop_count: u16,
}

#[derive(Parser, Debug)]
struct StretchArgs {
    /// Input clip (GIF or video).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Target duration in seconds (fractional allowed).
    #[arg(long)]
    duration: f64,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Input videos, concatenated in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Width every input is stretched to.
    #[arg(long, default_value = "480")]
    width: u32,

    /// Height every input is stretched to.
    #[arg(long, default_value = "480")]
    height: u32,
}

#[derive(Parser, Debug)]
struct AddAudioArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,

    /// Audio track to loop over the video.
    #[arg(long)]
    audio: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Scratch directory for intermediate audio clips.
    #[arg(long, default_value = "spritemill_tmp")]
    scratch_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractAudioArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,

    /// Output WAV path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Gif(args) => cmd_gif(args),
        Command::Stretch(args) => cmd_stretch(args),
        Command::Merge(args) => cmd_merge(args),
        Command::AddAudio(args) => cmd_add_audio(args),
        Command::ExtractAudio(args) => cmd_extract_audio(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let manifest = BatchManifest::from_json_file(&args.in_path)?;

    let mut generator = DallEClient::new(args.openai_api_key);
    if let Some(org) = args.openai_organization {
        generator = generator.with_organization(org);
    }
    let vision = GeminiClient::new(args.gemini_api_key);

    let cfg = PipelineConfig {
        save_directory: args.out_dir.clone(),
        target_duration_sec: args.duration,
        max_tries: args.max_tries,
        ..PipelineConfig::default()
    };
    let pipeline = SpritePipeline::new(Box::new(generator), Box::new(vision), cfg);

    let merge_path = args.merge_into.map(|p| {
        if p.is_absolute() {
            p
        } else {
            args.out_dir.join(p)
        }
    });
    let merge = merge_path
        .as_deref()
        .map(|p| (p, args.width, args.height));

    let produced = pipeline.run_batch(&manifest.items, merge)?;
    eprintln!(
        "produced {} of {} clips",
        produced.len(),
        manifest.items.len()
    );
    Ok(())
}

fn cmd_gif(args: GifArgs) -> anyhow::Result<()> {
    let sheet = SpriteSheet::load(&args.in_path)?;
    let frames = slice_grid(&sheet, args.rows, args.cols)?;
    Animation::new(frames, args.frame_duration_ms, args.loop_count)?.write_gif(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_stretch(args: StretchArgs) -> anyhow::Result<()> {
    stretch_to_duration(&args.in_path, &args.out, args.duration)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    merge_and_resize(&args.inputs, &args.out, args.width, args.height)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_add_audio(args: AddAudioArgs) -> anyhow::Result<()> {
    attach_looped_audio(
        &args.video,
        &args.audio,
        &args.out,
        &NoChorusDetection,
        &args.scratch_dir,
    )?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_extract_audio(args: ExtractAudioArgs) -> anyhow::Result<()> {
    extract_audio(&args.video, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
