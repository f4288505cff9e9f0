//! air_canvas — interactive entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use air_canvas::app::run;
use air_canvas::config::{load_session_config, AppConfig, SourceChoice};
use air_canvas::session::SessionConfig;

#[derive(Parser, Debug)]
#[command(name = "air_canvas", about = "Draw in the air with hand gestures")]
struct Cli {
    /// Shell command that starts the hand detector (prints READY, then JSON lines)
    #[arg(long, conflicts_with = "stdin")]
    detector: Option<String>,

    /// Read detector JSON lines from stdin instead of launching a process
    #[arg(long)]
    stdin: bool,

    /// JSON file overriding session settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<usize>,

    /// Do not mirror the camera horizontally
    #[arg(long)]
    no_mirror: bool,

    /// Fixed seed for the particle generator
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore detector hands scoring below this
    #[arg(long, default_value_t = 0.5)]
    min_confidence: f32,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let mut session = match &self.config {
            Some(path) => load_session_config(path)?,
            None       => SessionConfig::default(),
        };
        if let Some(w) = self.width  { session.screen_width  = w; }
        if let Some(h) = self.height { session.screen_height = h; }
        if self.no_mirror            { session.mirror = false; }
        if self.seed.is_some()       { session.seed = self.seed; }

        let source = match (self.detector, self.stdin) {
            (Some(cmd), _) => SourceChoice::Detector(cmd),
            (None, true)   => SourceChoice::Stdin,
            (None, false)  => SourceChoice::Sim,
        };

        Ok(AppConfig { session, source, min_confidence: self.min_confidence.clamp(0.0, 1.0) })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "air_canvas=info,hand_pose=info,ink_surface=info".into()),
        )
        .init();

    let cfg = cli.into_config()?;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Air Canvas — draw with your hands                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &cfg.source {
        SourceChoice::Sim           => println!("  Source: keyboard + mouse simulation"),
        SourceChoice::Stdin         => println!("  Source: detector JSON on stdin"),
        SourceChoice::Detector(cmd) => println!("  Source: detector `{cmd}`"),
    }
    println!("  Window: {}×{}  mirror: {}", cfg.session.screen_width, cfg.session.screen_height, cfg.session.mirror);
    println!();

    info!("air_canvas v{} starting", env!("CARGO_PKG_VERSION"));
    run(cfg)
}
