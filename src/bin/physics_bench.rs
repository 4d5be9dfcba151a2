use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use pixel_physics::physics::variants;
use pixel_physics::{Boundary, Frame, ParamSet, ParamValue, PhysicsConfig, PhysicsEngine};

const DEFAULT_VARIANT: &str = "liquify";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "physics_bench",
    version,
    about = "Render a synthetic sequence through a displacement effect and report timings"
)]
pub(crate) struct Cli {
    #[arg(long, default_value = DEFAULT_VARIANT)]
    pub(crate) variant: String,

    /// Dispatch through a group façade; `--variant` becomes its mode.
    #[arg(long)]
    pub(crate) group: Option<String>,

    #[arg(long, default_value_t = 320)]
    pub(crate) width: usize,

    #[arg(long, default_value_t = 180)]
    pub(crate) height: usize,

    #[arg(long, default_value_t = 30)]
    pub(crate) frames: usize,

    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,

    #[arg(long, default_value = "clamp")]
    pub(crate) boundary: String,

    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub(crate) params: Vec<String>,

    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub(crate) list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BenchReport {
    pub(crate) frames: usize,
    pub(crate) mean_ms: f64,
    pub(crate) max_ms: f64,
    pub(crate) final_diff: f32,
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width == 0 {
        bail!("--width must be >= 1");
    }
    if args.height == 0 {
        bail!("--height must be >= 1");
    }
    if args.frames == 0 {
        bail!("--frames must be >= 1");
    }
    if Boundary::parse(&args.boundary).is_none() {
        bail!("--boundary must be one of clamp, black, wrap, mirror");
    }
    Ok(())
}

pub(crate) fn parse_param(raw: &str) -> Result<(String, ParamValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("--param expects KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("--param has an empty key: '{raw}'");
    }
    Ok((key.to_string(), ParamValue::parse_lossy(value)))
}

pub(crate) fn build_params(args: &Cli) -> Result<ParamSet> {
    let mut params = ParamSet::new();
    for raw in &args.params {
        let (key, value) = parse_param(raw)?;
        params.set(&key, value);
    }
    if args.group.is_some() {
        params.set("mode", args.variant.as_str());
    }
    Ok(params)
}

/// Checkerboard over a diagonal colour gradient, so every displacement shows.
pub(crate) fn synthetic_frame(width: usize, height: usize) -> Frame {
    let mut frame = Frame::new(width, height);
    let wd = width.max(2) as f32 - 1.0;
    let hd = height.max(2) as f32 - 1.0;
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let check = if (x / 8 + y / 8) % 2 == 0 { 60.0 } else { 0.0 };
            let r = 255.0 * x as f32 / wd;
            let g = 255.0 * y as f32 / hd;
            let b = 128.0 + check;
            frame.set_pixel(
                x,
                y,
                [
                    (r * 0.75 + check).min(255.0) as u8,
                    (g * 0.75 + check).min(255.0) as u8,
                    b as u8,
                ],
            );
        }
    }
    frame
}

pub(crate) fn run_bench(engine: &mut PhysicsEngine, args: &Cli, params: &ParamSet) -> Result<BenchReport> {
    let boundary = Boundary::parse_lossy(&args.boundary);
    let input = synthetic_frame(args.width, args.height);
    let mut total_ms = 0.0f64;
    let mut max_ms = 0.0f64;
    let mut final_diff = 0.0f32;

    for i in 0..args.frames {
        let started = Instant::now();
        let out = match &args.group {
            Some(group) => engine.apply_group(group, &input, params, args.seed, i, args.frames, boundary),
            None => engine.apply(&input, &args.variant, params, args.seed, i, args.frames, boundary),
        }
        .with_context(|| format!("render frame {i}"))?;
        let ms = started.elapsed().as_secs_f64() * 1000.0;
        total_ms += ms;
        max_ms = max_ms.max(ms);
        final_diff = out.mean_abs_diff(&input);
        log::debug!("frame {i}: {ms:.2} ms, diff {final_diff:.3}");
    }

    Ok(BenchReport {
        frames: args.frames,
        mean_ms: total_ms / args.frames as f64,
        max_ms,
        final_diff,
    })
}

fn print_tables() {
    for name in variants::group_names() {
        let modes = variants::group_modes(name).unwrap_or(&[]);
        println!("{name}: {}", modes.join(", "));
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    if args.list {
        print_tables();
        return Ok(());
    }
    validate_args(&args)?;

    let config = PhysicsConfig::load(args.config.as_deref()).context("load engine config")?;
    let params = build_params(&args)?;
    let mut engine = PhysicsEngine::new(config);

    let label = match &args.group {
        Some(group) => format!("{group}/{}", args.variant),
        None => args.variant.clone(),
    };
    log::info!(
        "benchmarking {label} at {}x{} for {} frames (seed {})",
        args.width,
        args.height,
        args.frames,
        args.seed
    );

    let report = run_bench(&mut engine, &args, &params)?;
    println!(
        "{label}: {} frames, mean {:.2} ms, max {:.2} ms, final diff {:.3}",
        report.frames, report.mean_ms, report.max_ms, report.final_diff
    );
    Ok(())
}
