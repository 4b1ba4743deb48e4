use crate::config::load_config;
use crate::dag::DagreEngine;
use crate::graph::{self, RawRelationship, RawResource};
use crate::layout::{LayoutStrategy, Viewport, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::store::{FileStore, PositionStore};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "archflow",
    version,
    about = "Layout engine for cloud architecture diagrams"
)]
pub struct Args {
    /// Input JSON with "resources" and "relationships", or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output JSON file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout strategy
    #[arg(short = 's', long = "strategy", value_enum, default_value = "smart")]
    pub strategy: StrategyArg,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1280.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// State file holding saved positions between runs
    #[arg(long = "state")]
    pub state: Option<PathBuf>,

    /// Turn the flat layout flag on before computing
    #[arg(long = "flat", requires = "state", conflicts_with = "no_flat")]
    pub flat: bool,

    /// Turn the flat layout flag off before computing
    #[arg(long = "no-flat", requires = "state")]
    pub no_flat: bool,

    /// Restore the previous layout snapshot and exit
    #[arg(long = "undo", requires = "state")]
    pub undo: bool,

    /// Clear saved positions and exit
    #[arg(long = "reset", requires = "state")]
    pub reset: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Hierarchical,
    Tiered,
    Layered,
    Smart,
}

impl StrategyArg {
    fn into_strategy(self) -> LayoutStrategy {
        match self {
            StrategyArg::Hierarchical => LayoutStrategy::Hierarchical,
            StrategyArg::Tiered => LayoutStrategy::TieredGrid,
            StrategyArg::Layered => LayoutStrategy::Layered,
            StrategyArg::Smart => LayoutStrategy::Smart,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InputFile {
    resources: Vec<RawResource>,
    relationships: Vec<RawRelationship>,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let mut store = match args.state.as_deref() {
        Some(path) => Some(PositionStore::new(FileStore::open(path)?)),
        None => None,
    };

    if let Some(store) = store.as_mut() {
        if args.reset {
            store.clear();
            return Ok(());
        }
        if args.undo {
            let Some(restored) = store.undo() else {
                return Err(anyhow::anyhow!("no previous layout to restore"));
            };
            let layout = crate::layout::Layout {
                positions: restored,
                containers: Vec::new(),
            };
            return write_layout_dump(args.output.as_deref(), &layout, "restored");
        }
        if args.flat {
            store.set_flat_layout(true);
        }
        if args.no_flat {
            store.set_flat_layout(false);
        }
    }

    let input = read_input(args.input.as_deref())?;
    let payload: InputFile = serde_json::from_str(&input)?;
    let diagram = graph::normalize(&payload.resources, &payload.relationships);

    let flat = store
        .as_ref()
        .map(|store| store.flat_layout_enabled())
        .unwrap_or(false);
    let saved = match &store {
        // The flat flag forces a fresh arrangement even when positions exist.
        Some(store) if !flat => Some(store.load()),
        _ => None,
    };
    let saved = saved.filter(|map| !map.is_empty());

    let strategy = args.strategy.into_strategy();
    let layout = compute_layout(
        &diagram,
        strategy,
        saved.as_ref(),
        Viewport::new(args.width, args.height),
        &DagreEngine,
        &config.layout,
    )?;

    if let Some(store) = store.as_mut() {
        let current = store.load();
        store.save_previous(&current);
        store.save(&layout.positions);
    }

    write_layout_dump(args.output.as_deref(), &layout, strategy.name())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Diagnostics go to stderr so stdout stays a clean JSON stream.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
