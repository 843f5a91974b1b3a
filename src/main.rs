use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use story_strip::{
    color::get_media_base_color,
    config::Config,
    strip::{StripRequest, VideoStripGenerator},
    video::{Element, FfmpegLoader, Resource, VideoHandle, VideoLoader},
};

#[derive(Parser)]
#[command(
    name = "story-strip",
    version,
    about = "Generate filmstrip thumbnails from videos",
    long_about = "story-strip samples evenly spaced frames across a video, crops each one the way the video element displays it, and lays them out left to right in a single image."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a filmstrip and print it as a data URL or write it to a file
    Strip(StripArgs),

    /// Print the dominant color of an image or video
    BaseColor {
        /// Image or video path/URL
        #[arg(short, long)]
        src: String,

        /// Width the media is shrunk to before sampling
        #[arg(long)]
        sample_width: Option<u32>,
    },
}

#[derive(Args)]
struct StripArgs {
    /// Video path or URL
    #[arg(short, long)]
    src: String,

    /// Element display width
    #[arg(long)]
    element_width: f64,

    /// Element display height
    #[arg(long)]
    element_height: f64,

    /// Element zoom factor
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Horizontal focal point (0-100)
    #[arg(long, default_value_t = 50.0)]
    focal_x: f64,

    /// Vertical focal point (0-100)
    #[arg(long, default_value_t = 50.0)]
    focal_y: f64,

    /// Video length in seconds, probed when omitted
    #[arg(long)]
    length: Option<f64>,

    /// Strip width in pixels (defaults to the configured width)
    #[arg(long)]
    strip_width: Option<u32>,

    /// Strip height in pixels (defaults to the configured height)
    #[arg(long)]
    strip_height: Option<u32>,

    /// Write the strip to this image file instead of printing a data URL
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so a printed data URL stays clean on stdout
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting story-strip v{}", env!("CARGO_PKG_VERSION"));

    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => Config::default(),
    };
    config.validate()?;

    let loader = FfmpegLoader::new(config.decoder.clone());
    if !loader.check_available().await {
        warn!("{} not found, only still images can be read", config.decoder.ffmpeg_path);
    }

    match cli.command {
        Command::Strip(args) => run_strip(args, &config, loader).await,
        Command::BaseColor { src, sample_width } => {
            let sample_width = sample_width.unwrap_or(config.color.sample_width);
            let color = get_media_base_color(&loader, &src, sample_width)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", color);
            Ok(())
        }
    }
}

async fn run_strip(args: StripArgs, config: &Config, loader: FfmpegLoader) -> Result<()> {
    let element = Element::new(args.element_width, args.element_height)
        .with_scale(args.scale)
        .with_focal(args.focal_x, args.focal_y);

    let resource = resolve_resource(&loader, &args.src, args.length).await?;

    let request = StripRequest::new(
        element,
        resource,
        args.strip_width.unwrap_or(config.strip.width),
        args.strip_height.unwrap_or(config.strip.height),
    );

    info!("Video: {} ({:.2}s)", args.src, request.resource.length);
    info!("Strip: {}x{}", request.strip_width, request.strip_height);

    let generator = VideoStripGenerator::with_config(loader, &config.strip);

    match args.output {
        Some(output) => {
            let surface = generator
                .render(&request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            surface
                .save(&output)
                .with_context(|| format!("writing strip to {:?}", output))?;
            info!("Strip saved to: {:?}", output);
        }
        None => {
            let data_url = generator
                .generate(&request.element, &request.resource, request.strip_width, request.strip_height)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", data_url);
        }
    }

    Ok(())
}

/// Resource for `src`, probing the decoder only when no length was given
///
/// A zero native size is filled in by the generator from its own preload.
async fn resolve_resource(loader: &FfmpegLoader, src: &str, length: Option<f64>) -> Result<Resource> {
    if let Some(length) = length {
        return Ok(Resource::new(src, length, 0, 0));
    }

    let probe = loader
        .preload(src)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let (width, height) = probe.native_size();
    Ok(Resource::new(src, probe.duration(), width, height))
}
