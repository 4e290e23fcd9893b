//! glass-runner: headless host for the hourglass engine.
//!
//! Usage:
//!   glass-runner --seed 12345 --steps 20000
//!   glass-runner --config glass.json --ipc-mode

use anyhow::Result;
use hourglass_core::{
    command::Command,
    config::SimConfig,
    event::SimEvent,
    format::{format_hms, format_short},
    glass::GlassStatus,
    observer::LogObserver,
    snapshot::SimSnapshot,
    soak::{run_soak, SoakReport},
    SimEngine,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Serialize)]
struct IpcReply<'a> {
    snapshot: SimSnapshot,
    events:   &'a [SimEvent],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let steps = parse_arg(&args, "--steps", 10_000u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config = match args.windows(2).find(|w| w[0] == "--config") {
        Some(w) => SimConfig::load(&w[1])?,
        None => SimConfig::default(),
    };

    let mut engine = SimEngine::new(config)?;
    engine.register(Box::new(LogObserver));

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        println!("Hourglass glass-runner");
        println!("  seed:      {seed}");
        println!("  steps:     {steps}");
        println!();
        let report = run_soak(&mut engine, seed, steps)?;
        print_summary(&engine.snapshot(), &report);
    }

    Ok(())
}

/// One JSON command per stdin line, one JSON reply per stdout line.
fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let command: Command = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        if let Err(e) = engine.apply(command) {
            log::warn!("command rejected: {e}");
            write_error(&mut stdout, &e.to_string())?;
            continue;
        }

        let reply = IpcReply {
            snapshot: engine.snapshot(),
            events:   engine.last_events(),
        };
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(snapshot: &SimSnapshot, report: &SoakReport) {
    println!("=== RUN SUMMARY ===");
    println!("  steps:          {}", report.steps);
    println!("  rejected:       {}", report.rejected);
    println!("  ignored:        {}", report.ignored);
    println!("  auto-pauses:    {}", report.auto_pauses);
    println!("  goals reached:  {}", report.goals_reached);
    println!("  flips:          {}", report.flips);
    println!();
    println!("=== FINAL STATE ===");
    println!("  elapsed:        {}", format_hms(snapshot.elapsed));
    println!("  total flips:    {}", snapshot.total_flips);
    println!(
        "  glasses:        {} ({} running, {} paused, {} empty, {} idle)",
        snapshot.glasses.len(),
        snapshot.count(GlassStatus::Running),
        snapshot.count(GlassStatus::Paused),
        snapshot.count(GlassStatus::Empty),
        snapshot.count(GlassStatus::Idle),
    );
    for g in snapshot.glasses.iter().take(10) {
        println!(
            "    {:<6} {:<8} {} / {}  (flips: {})",
            g.name,
            g.status.label(),
            format_short(g.remaining),
            format_short(g.capacity_secs),
            g.flip_count,
        );
    }
    match (snapshot.goal_target, snapshot.goal_reached) {
        (Some(target), true)  => println!("  goal:           {} (reached)", format_hms(target as f64)),
        (Some(target), false) => println!("  goal:           {}", format_hms(target as f64)),
        (None, _)             => println!("  goal:           none"),
    }

    println!();
    println!("=== LAST FLIPS ===");
    if snapshot.log.is_empty() {
        println!("  (No flips recorded yet)");
    }
    for entry in snapshot.log.iter().take(5) {
        println!(
            "  {} | {} | rem {} | held {}",
            format_hms(entry.at_global_time),
            entry.glass_name,
            format_short(entry.remaining_at_flip),
            format_short(entry.elapsed_since_last_flip),
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
