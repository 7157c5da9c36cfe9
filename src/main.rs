use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use retro_camcorder::{
    config::Config,
    presets::PresetRegistry,
    rng::{live_source, seeded_source, RandomSource},
    session::LiveSession,
    ticker::FixedRateTicks,
    video::{
        capture::save_still, source::is_image_path, FlashMode, FrameSource, LimitedSource, SequenceSource,
        StillSource,
    },
};

#[derive(Parser)]
#[command(
    name = "retro-camcorder",
    version,
    about = "Run images through a VHS/camcorder effect pipeline",
    long_about = "Retro-Camcorder feeds a still image or a directory of frames through the live camcorder pipeline, as if it were a camera, and writes the rendered frames as PNG."
)]
struct Cli {
    /// Image file (PNG, JPEG) or directory of numbered frames
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for rendered frames
    #[arg(short, long)]
    output: PathBuf,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 24)]
    frames: u32,

    /// Parameter preset (camcorder, classic, worn, clean)
    #[arg(short, long)]
    preset: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override a parameter, e.g. --set noise=60 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Capture a JPEG still after the last frame
    #[arg(long)]
    still: bool,

    /// Flash mode for the still (auto, on, off)
    #[arg(long)]
    flash: Option<FlashMode>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    info!("Starting Retro-Camcorder v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", cli.input);
    info!("Output: {:?}", cli.output);

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(name) = &cli.preset {
        config.params = PresetRegistry::new()
            .resolve(name)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        info!("Using {} preset", name);
    }

    for assignment in &cli.overrides {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected KEY=VALUE, got '{}'", assignment))?;
        config.params.set(key.trim(), value.trim())?;
        debug!("Set {} = {}", key.trim(), value.trim());
    }
    if let Some(flash) = cli.flash {
        config.capture.flash_mode = flash;
    }
    if cli.seed.is_some() {
        config.runtime.seed = cli.seed;
    }
    config.validate()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.runtime.render_threads)
        .build_global()
        .context("Failed to build render thread pool")?;
    debug!("Render pool: {} threads", config.runtime.render_threads);

    let source: Box<dyn FrameSource> = if cli.input.is_dir() {
        Box::new(SequenceSource::open(&cli.input, config.camera.facing, false)?)
    } else if is_image_path(&cli.input) {
        Box::new(StillSource::open(&cli.input, config.camera.facing)?)
    } else {
        anyhow::bail!("Input {:?} is neither a directory nor a PNG/JPEG image", cli.input);
    };
    let source = LimitedSource::new(source, config.camera.source_resolution.dimensions());

    let mut rng: Box<dyn RandomSource> = match config.runtime.seed {
        Some(seed) => {
            info!("Seeded run ({})", seed);
            Box::new(seeded_source(seed))
        }
        None => Box::new(live_source()),
    };

    let damage_seed = config.runtime.damage_seed();
    let mut session = LiveSession::new(source, config.params.clone(), damage_seed)
        .with_device_portrait(config.camera.device_portrait)
        .with_flash_mode(config.capture.flash_mode)
        .with_jpeg_quality(config.capture.jpeg_quality);

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory {:?}", cli.output))?;

    let stats = session.run(&mut FixedRateTicks::display(), cli.frames, rng.as_mut(), |index, frame| {
        let path = cli.output.join(format!("frame_{:05}.png", index));
        frame.frame.save_png(&path)?;
        debug!(
            "Frame {} luma {:.1} motion {:.2}",
            index, frame.analysis.luma, frame.analysis.corner_motion
        );
        Ok(())
    })?;
    if stats.dropped > 0 {
        warn!("Dropped {} frames that failed to load", stats.dropped);
    }
    info!("Rendered {} frames", stats.rendered);

    if cli.still {
        let still = session.capture_still(rng.as_mut())?;
        let path = save_still(&still.jpeg, &config.capture.output_dir, Local::now())?;
        info!("Still saved to {:?}", path);
    }

    Ok(())
}
