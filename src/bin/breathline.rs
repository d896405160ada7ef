use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use breathline::{
    BreathSession, Canvas, Millis, PresetDef, PresetKind, PresetLibrary, SessionOptions, Settings,
    TracingCueSink,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "breathline", version)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize every composable preset in a file.
    Validate(InArgs),
    /// Print the flattened graph timeline of a preset as JSON.
    Timeline(PresetArgs),
    /// Run a preset headlessly and print each phase change.
    Simulate(SimulateArgs),
    /// Print simple-mode phase durations for a BPM and ratio.
    Durations(DurationsArgs),
}

#[derive(Parser, Debug)]
struct InArgs {
    /// Preset file (`.json`, `.yaml` or `.yml`).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PresetArgs {
    /// Preset file (`.json`, `.yaml` or `.yml`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Preset id.
    #[arg(long)]
    preset: String,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Preset file (`.json`, `.yaml` or `.yml`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Preset id.
    #[arg(long)]
    preset: String,

    /// Session seconds to simulate.
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Synthetic frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Session seconds at which to tap; repeat for several taps.
    #[arg(long = "tap-at")]
    tap_at: Vec<f64>,
}

#[derive(Parser, Debug)]
struct DurationsArgs {
    /// Breaths per minute.
    #[arg(long)]
    bpm: f64,

    /// Exhale length as a multiple of inhale.
    #[arg(long, default_value_t = 1.5)]
    ratio: f64,

    /// Hold after inhale, seconds.
    #[arg(long, default_value_t = 0.0)]
    hold_inhale: f64,

    /// Hold after exhale, seconds.
    #[arg(long, default_value_t = 0.0)]
    hold_exhale: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Simulate(args) => cmd_simulate(args),
        Command::Durations(args) => cmd_durations(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_library(path: &Path) -> anyhow::Result<PresetLibrary> {
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if yaml {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read presets '{}'", path.display()))?;
        return PresetLibrary::from_yaml_str(&text).with_context(|| "parse preset YAML");
    }
    let f = File::open(path).with_context(|| format!("open presets '{}'", path.display()))?;
    PresetLibrary::from_json_reader(BufReader::new(f)).with_context(|| "parse preset JSON")
}

fn find_preset<'a>(lib: &'a PresetLibrary, id: &str) -> anyhow::Result<&'a PresetDef> {
    lib.find(id)
        .with_context(|| format!("preset '{id}' not found"))
}

fn cmd_validate(args: InArgs) -> anyhow::Result<()> {
    let lib = read_library(&args.in_path)?;
    let mut failed = 0usize;
    for def in &lib.presets {
        if def.kind() != PresetKind::Composable {
            println!("ok {} (simple)", def.id);
            continue;
        }
        match breathline::normalize_preset(def) {
            Ok(_) => println!("ok {}", def.id),
            Err(e) => {
                failed += 1;
                println!("error {}: {e}", def.id);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} preset(s) failed validation");
    }
    Ok(())
}

fn cmd_timeline(args: PresetArgs) -> anyhow::Result<()> {
    let lib = read_library(&args.in_path)?;
    let def = find_preset(&lib, &args.preset)?;
    if def.kind() != PresetKind::Composable {
        anyhow::bail!("preset '{}' is a simple preset and has no step timeline", def.id);
    }
    let normalized = breathline::normalize_preset(def)?;
    let opts = SessionOptions::default();
    let timeline =
        breathline::GraphTimeline::flatten(&normalized, opts.graph.until_tap_display_seconds);
    let json = serde_json::to_string_pretty(&timeline).with_context(|| "serialize timeline")?;
    println!("{json}");
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let lib = read_library(&args.in_path)?;
    let def = find_preset(&lib, &args.preset)?;
    let mut session = BreathSession::new(
        Settings::default(),
        TracingCueSink,
        SessionOptions::default(),
        Canvas::new(0, 0),
    )?;
    session.select_preset(def, Millis(0.0))?;

    let mut taps = args.tap_at.clone();
    taps.sort_by(f64::total_cmp);
    let mut next_tap = 0usize;
    let frames = breathline::run_headless(&mut session, Millis(0.0), args.seconds, args.fps, |t| {
        if next_tap < taps.len() && t >= taps[next_tap] {
            next_tap += 1;
            return true;
        }
        false
    });

    let mut last = None;
    for f in &frames {
        let key = (f.phase, f.instruction.as_str());
        if last == Some(key) {
            continue;
        }
        last = Some(key);
        println!("t={:.2} {} {}", f.session_sec, f.label, f.instruction);
    }
    Ok(())
}

fn cmd_durations(args: DurationsArgs) -> anyhow::Result<()> {
    let d = breathline::calculate_durations_from_bpm_ratio(
        args.bpm,
        args.ratio,
        args.hold_inhale,
        args.hold_exhale,
    );
    let hold_inhale = args.hold_inhale.max(0.0);
    let hold_exhale = args.hold_exhale.max(0.0);
    println!("inhale {:.3}", d.inhale);
    println!("holdInhale {hold_inhale:.3}");
    println!("exhale {:.3}", d.exhale);
    println!("holdExhale {hold_exhale:.3}");
    println!(
        "total {:.3}",
        d.inhale + hold_inhale + d.exhale + hold_exhale
    );
    Ok(())
}
