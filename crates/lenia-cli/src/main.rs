use anyhow::{Context, Result};
use lenia_core::{EngineConfig, LeniaEngine, Preset};
use tracing::{info, warn};

fn main() -> Result<()> {
    init_tracing();
    let options = RunOptions::from_args()?;
    let mut engine = bootstrap_engine(&options)?;
    info!(
        width = options.width,
        height = options.height,
        steps = options.steps,
        kernel_entries = engine.kernel().len(),
        "starting headless lenia run"
    );

    for _ in 0..options.steps {
        engine.step();
    }

    if let Some(summary) = engine.history().last() {
        info!(
            generation = summary.generation.0,
            step_ms = summary.duration.as_secs_f64() * 1e3,
            quality = summary.quality_percent,
            cell_skip = summary.cell_skip,
            chunks = summary.chunk_count,
            mean_cell = summary.mean_cell_value,
            "run complete"
        );
    } else {
        warn!("run completed without step summaries");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

struct RunOptions {
    width: u32,
    height: u32,
    steps: u64,
}

impl RunOptions {
    /// Usage: `lenia-cli [width] [height] [steps]`, defaulting to a
    /// 128x128 grid for 240 generations.
    fn from_args() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let width = parse_or(args.next(), 128).context("width")?;
        let height = parse_or(args.next(), 128).context("height")?;
        let steps = parse_or(args.next(), 240).context("steps")?;
        Ok(Self {
            width,
            height,
            steps,
        })
    }
}

fn parse_or<T: std::str::FromStr>(arg: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match arg {
        Some(raw) => raw.parse::<T>().map_err(Into::into),
        None => Ok(default),
    }
}

fn bootstrap_engine(options: &RunOptions) -> Result<LeniaEngine> {
    let config = EngineConfig::default();
    let mut engine = LeniaEngine::new(options.width, options.height, config)?;
    engine.apply_preset(Preset::Orbium)?;
    Ok(engine)
}
