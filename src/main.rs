//! Torus Life CLI - Run a simulation from JSON configuration.
//!
//! Runs locally by default; `--remote ADDR` offloads the whole run to an
//! evolution server. While a local run executes, single-character commands
//! on stdin control it: `p` pause, `r` resume, `s` save snapshot, `q` quit.

use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Instant;

use torus_life::{
    engine::{Command, Event, FileExporter, run_local},
    remote::run_remote,
    schema::{RunConfig, Seed},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [--remote ADDR]", args[0]);
        eprintln!();
        eprintln!("Run a Game of Life simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json    Path to run configuration file");
        eprintln!("  --remote ADDR  Offload the whole run to an evolution server");
        eprintln!();
        eprintln!("Commands on stdin during a local run: p (pause), r (resume),");
        eprintln!("s (save snapshot), q (quit). Anything else is ignored.");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let remote_addr = args
        .iter()
        .position(|a| a == "--remote")
        .and_then(|i| args.get(i + 1).cloned());

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: RunConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    // Load or create seed
    let seed_path = config_path.with_extension("seed.json");
    let seed: Seed = if seed_path.exists() {
        let seed_str = fs::read_to_string(&seed_path).unwrap_or_else(|e| {
            eprintln!("Error reading seed file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&seed_str).unwrap_or_else(|e| {
            eprintln!("Error parsing seed: {}", e);
            std::process::exit(1);
        })
    } else {
        Seed::default()
    };

    println!("Torus Life");
    println!("==========");
    println!("Grid: {}x{} (toroidal)", config.width, config.height);
    println!("Turns: {}", config.turns);
    match &remote_addr {
        Some(addr) => println!("Mode: remote ({addr})"),
        None => println!("Mode: local ({} workers)", config.workers),
    }
    println!();

    let (events_tx, events_rx) = mpsc::channel();
    let reporter = thread::spawn(move || report_events(events_rx));

    let start = Instant::now();
    let result = match remote_addr {
        Some(addr) => run_remote(&config, &seed, events_tx, addr.as_str())
            .map_err(|e| e.to_string()),
        None => {
            let (commands_tx, commands_rx) = mpsc::channel();
            spawn_stdin_commands(commands_tx);
            let exporter = Arc::new(FileExporter::new("snapshots"));
            run_local(&config, &seed, events_tx, commands_rx, exporter).map_err(|e| e.to_string())
        }
    };
    let elapsed = start.elapsed();

    let summary = result.unwrap_or_else(|e| {
        eprintln!("Run failed: {}", e);
        std::process::exit(1);
    });
    reporter.join().expect("reporter thread panicked");

    println!();
    println!("Final state:");
    println!("  Turns completed: {}", summary.turns);
    println!("  Alive cells: {}", summary.alive.len());
    println!(
        "Time: {:.2}s ({:.1} turns/s)",
        elapsed.as_secs_f32(),
        summary.turns as f32 / elapsed.as_secs_f32().max(f32::EPSILON)
    );
}

/// Print a one-line summary per event; cell lists are reduced to counts.
fn report_events(events: mpsc::Receiver<Event>) {
    for event in events {
        match event {
            Event::StateChange { turn, phase } => println!("  [{turn}] state: {phase:?}"),
            Event::CellsFlipped { turn, cells } => {
                println!("  [{turn}] {} cells flipped", cells.len())
            }
            Event::TurnComplete { .. } => {}
            Event::AliveCellsCount { turn, count } => println!("  [{turn}] {count} cells alive"),
            Event::FinalTurnComplete { turn, cells } => {
                println!("  [{turn}] final: {} cells alive", cells.len())
            }
            Event::ImageOutputComplete { turn, label } => {
                println!("  [{turn}] snapshot written: {label}")
            }
        }
    }
}

/// Map stdin lines to control commands; unrecognized tokens are ignored.
fn spawn_stdin_commands(commands: mpsc::Sender<Command>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { return };
            let command = match line.trim() {
                "p" => Command::Pause,
                "r" => Command::Resume,
                "s" => Command::Save,
                "q" => Command::Quit,
                _ => continue,
            };
            if commands.send(command).is_err() {
                return;
            }
        }
    });
}

fn print_example_config() {
    let config = RunConfig::default();
    let seed = Seed::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
    println!();
    println!("Example seed (config.seed.json):");
    println!("{}", serde_json::to_string_pretty(&seed).unwrap());
}
