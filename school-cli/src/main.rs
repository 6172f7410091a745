use anyhow::{Context, Result};
use clap::Parser;
use school_cli::{build_school, load_settings, run_interactive, Playback, Simulation};
use school_shared::SchoolSettings;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fish school flocking simulation", long_about = None)]
struct Args {
    /// JSON settings file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of fish in the school (at least 2)
    #[arg(short, long)]
    fish: Option<usize>,

    /// Radius of the bounding sphere
    #[arg(short, long)]
    radius: Option<f32>,

    /// Length of every fish, added to the sphere radius at the boundary
    #[arg(short = 'l', long)]
    fish_length: Option<f32>,

    /// Seed for the initial placement (defaults to the clock)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of frames to run in batch mode
    #[arg(short = 'n', long, default_value_t = 100)]
    frames: u64,

    /// Emit a snapshot every N frames
    #[arg(short, long, default_value_t = 1)]
    every: u64,

    /// Start with playback paused
    #[arg(short, long)]
    paused: bool,

    /// Read commands from stdin instead of running a fixed number of frames
    #[arg(short, long)]
    interactive: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn settings(&self) -> Result<SchoolSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => SchoolSettings::default(),
        };

        if let Some(fish) = self.fish {
            settings.fish_count = fish;
        }
        if let Some(radius) = self.radius {
            settings.sphere_radius = radius;
        }
        if let Some(length) = self.fish_length {
            settings.fish_length = length;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let settings = args.settings()?;
    log::info!("Fish: {}", settings.fish_count);
    log::info!("Sphere radius: {}", settings.sphere_radius);

    let school = build_school(&settings).context("Failed to initialize school")?;
    let mut simulation = Simulation::new(school, Playback::new(!args.paused));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.interactive {
        log::info!("Interactive mode: s=step p=play f [n]=frames c=centre d=dump q=quit");
        run_interactive(&mut simulation, io::stdin().lock(), &mut out)
            .context("Interactive session failed")?;
    } else {
        simulation
            .run_batch(args.frames, args.every, &mut out)
            .context("Simulation run failed")?;
    }

    out.flush()?;
    Ok(())
}
