//! jigtui: drag-and-snap jigsaw puzzle in the terminal.

mod app;
mod canvas;
mod catalog;
mod collab;
mod geom;
mod grid;
mod input;
mod interaction;
mod piece;
mod scatter;
mod session;
mod snap;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use catalog::Catalog;
use clap::Parser;
use grid::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY, MIN_DIFFICULTY};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Starting difficulty; the menu can change it.
    pub difficulty: u32,
    pub seed: u64,
    /// World half-height shown by the board area.
    pub view_size: f32,
    pub no_animation: bool,
    pub no_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_else(|err| {
        warn!(error = %err, "theme not loaded, using One Dark");
        theme::Theme::default()
    });
    let catalog = Catalog::load(&args.images)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, images = catalog.len(), difficulty = args.difficulty, "starting");

    let config = GameConfig {
        difficulty: args.difficulty,
        seed,
        view_size: args.view_size,
        no_animation: args.no_animation,
        no_menu: args.no_menu,
    };
    let mut app = App::new(config, theme, catalog);
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file when asked for.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn parse_view_size(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("view size must be a positive number, got {s}"))
    }
}

/// Drag-and-snap jigsaw puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "jigtui",
    version,
    about = "Drag-and-snap jigsaw puzzle in the terminal. Drag scattered pieces onto the board; close enough and they lock.",
    long_about = "jigtui cuts a picture into a grid of rectangular pieces and scatters them \
        around the board outline. Drag a piece with the left mouse button and drop it near \
        its slot to lock it in place. Lock every piece to solve the puzzle.\n\n\
        Use --image to add your own pictures and --theme to load a btop-style theme (e.g. onedark.theme).",
    after_long_help = input::controls_help()
)]
pub struct Args {
    /// Picture to offer in the menu (PNG, JPEG, ...). Repeat for more; built-in pictures are used when none load.
    #[arg(short, long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Pieces along the image's shorter side.
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DIFFICULTY,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_DIFFICULTY)..=i64::from(MAX_DIFFICULTY)),
        value_name = "N"
    )]
    pub difficulty: u32,

    /// Seed for the scatter; random when not set. Logged so a layout can be replayed.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// World half-height of the board area. Larger values zoom out.
    #[arg(long, default_value_t = 1.0, value_parser = parse_view_size, value_name = "SIZE")]
    pub view_size: f32,

    /// Skip the menu and start with the first picture.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable the border fade when the puzzle is solved.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
