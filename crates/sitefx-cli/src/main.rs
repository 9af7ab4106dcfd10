use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitefx_core::transition::MaskDirection;
use sitefx_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "sitefx")]
#[command(author, version, about = "Preview the portfolio site's scroll-lock tabs and page transitions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read configuration from this file instead of ~/.config/sitefx/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a cubic-bezier easing curve
    Bezier {
        #[arg(allow_negative_numbers = true)]
        x1: f64,
        #[arg(allow_negative_numbers = true)]
        y1: f64,
        #[arg(allow_negative_numbers = true)]
        x2: f64,
        #[arg(allow_negative_numbers = true)]
        y2: f64,
        /// Number of intervals to sample
        #[arg(long, default_value_t = 10)]
        steps: usize,
    },
    /// Play one transition mask phase and print every frame
    Mask {
        #[arg(short, long, value_enum, default_value_t = DirectionArg::Cover)]
        direction: DirectionArg,
        /// Viewport width in CSS pixels; selects the timing profile
        #[arg(short, long, default_value_t = 1440.0)]
        width: f64,
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Emit one JSON object per frame
        #[arg(long)]
        json: bool,
    },
    /// Drive the feature-tab scroll lock on a simulated page
    ScrollLock {
        #[arg(short, long, default_value_t = 4)]
        tabs: usize,
        /// Comma separated wheel deltas (or finger travel with --touch)
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        deltas: Vec<f64>,
        /// Feed the deltas as touch moves instead of wheel events
        #[arg(long)]
        touch: bool,
        /// URL fragment the page was loaded with
        #[arg(long)]
        fragment: Option<String>,
    },
    /// Run the animated navigation pipeline against real pages
    Navigate {
        /// URL of the page currently shown
        from: String,
        /// URL to navigate to
        to: String,
        /// Animate on wall-clock frames instead of stepping instantly
        #[arg(long)]
        realtime: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write it to the default config location
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DirectionArg {
    Cover,
    Reveal,
}

impl From<DirectionArg> for MaskDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Cover => MaskDirection::Cover,
            DirectionArg::Reveal => MaskDirection::Reveal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Bezier {
            x1,
            y1,
            x2,
            y2,
            steps,
        } => commands::bezier::run([x1, y1, x2, y2], steps),
        Commands::Mask {
            direction,
            width,
            fps,
            json,
        } => commands::mask::run(&config, direction.into(), width, fps, json).await,
        Commands::ScrollLock {
            tabs,
            deltas,
            touch,
            fragment,
        } => commands::scroll_lock::run(&config, tabs, &deltas, touch, fragment.as_deref()),
        Commands::Navigate { from, to, realtime } => {
            commands::navigate::run(&config, &from, &to, realtime).await
        }
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
