//! Stagehand console — drive a simulated live set from stdin.
//!
//! Each input line is treated as a trigger name and fired through the
//! engine: `[NAME] ACTION ; ACTION`. Bare lines without a bracketed
//! identifier get one added, so `BPM 124 ; MET ON` works as-is. A few
//! colon-commands control time and inspection: `:tick [n]`, `:state`,
//! `:morph <0-127>`, `:quit`.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use stagehand::engine::config::{default_config_path, load_config};
use stagehand::engine::Engine;
use stagehand::host::{SimClip, SimDevice, SimSet};

#[derive(Parser)]
#[command(name = "stagehand", version, about = "Trigger-driven console for a simulated live set")]
struct Cli {
    /// Number of regular tracks in the simulated set.
    #[arg(long, default_value_t = 8)]
    tracks: usize,

    /// Number of return tracks.
    #[arg(long, default_value_t = 2)]
    returns: usize,

    /// Number of scenes (clip slot rows).
    #[arg(long, default_value_t = 8)]
    scenes: usize,

    /// Config file to load instead of ~/.stagehand/config.yaml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log verbosity (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

/// A small set with enough furniture to exercise most actions: a macro
/// rack and a named clip on track 1, a drum rack on track 2, a looper
/// on track 3, and a pair of arrangement cues.
fn build_demo_set(tracks: usize, returns: usize, scenes: usize) -> SimSet {
    let mut set = SimSet::new(tracks, returns, scenes);
    set.add_device(0, SimDevice::with_macros("Lead Rack"));
    set.put_clip(0, 0, SimClip::named("[INTRO] SEL ; BPM 122"));
    set.add_device(
        1,
        SimDevice::drum_rack(&[("Kick", 36), ("Snare", 38), ("Hat", 42)]),
    );
    set.add_device(2, SimDevice::looper());
    set.add_cue("Intro", 0.0);
    set.add_cue("Drop", 64.0);
    set
}

fn print_state(set: &SimSet) {
    println!(
        "tempo {:.1} bpm, {}, metronome {}",
        set.tempo,
        if set.playing { "playing" } else { "stopped" },
        if set.metronome { "on" } else { "off" },
    );
    for (i, track) in set.tracks.iter().enumerate() {
        let name = if track.name.is_empty() {
            "(unnamed)"
        } else {
            track.name.as_str()
        };
        let playing = match track.playing {
            Some(slot) => format!("slot {}", slot + 1),
            None => "-".to_string(),
        };
        println!(
            "  {:>2} {:<12} vol {:.2} pan {:+.2} {} {}",
            i + 1,
            name,
            track.volume,
            track.pan,
            if track.muted { "muted" } else { "     " },
            playing,
        );
    }
}

/// Handle a `:command` line. Returns false when the console should exit.
fn run_console_command(cmd: &str, engine: &mut Engine, set: &mut SimSet) -> bool {
    let mut parts = cmd.split_whitespace();
    match parts.next().map(|w| w.to_ascii_lowercase()).as_deref() {
        Some("quit") | Some("q") => return false,
        Some("tick") => {
            let count: u32 = parts.next().and_then(|w| w.parse().ok()).unwrap_or(1);
            for _ in 0..count {
                engine.on_tick(set);
            }
            println!("advanced {count} tick(s)");
        }
        Some("state") => print_state(set),
        Some("morph") => match parts.next().and_then(|w| w.parse::<u8>().ok()) {
            Some(amount) if amount <= 127 => engine.set_morph(set, amount),
            _ => println!("usage: :morph <0-127>"),
        },
        Some(other) => println!("unknown command :{other}"),
        None => {}
    }
    true
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = TermLogger::init(
        cli.log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to initialise logging: {e}");
    }

    println!("stagehand v{} — trigger console", env!("CARGO_PKG_VERSION"));

    // 1. Load config
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match load_config(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to read {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    // 2. Build the simulated set and the engine
    let mut set = build_demo_set(cli.tracks, cli.returns, cli.scenes);
    let mut engine = Engine::new(config);

    // A sample user action, so the registry path is reachable from the console.
    engine
        .surfaces_mut()
        .register_user("ECHO", Box::new(|_set, _ctx, args| println!("echo: {args}")));

    engine.run_startup(&mut set);

    // 3. Ctrl-C flips a flag so the loop can exit cleanly
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("failed to install interrupt handler: {e}");
    }

    println!("type an action list, :state, :tick [n], :morph <0-127>, or :quit");

    // 4. Read-fire loop
    let mut line = String::new();
    while running.load(Ordering::SeqCst) {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if let Some(cmd) = input.strip_prefix(':') {
            if !run_console_command(cmd, &mut engine, &mut set) {
                break;
            }
            continue;
        }
        if input.starts_with('[') {
            engine.fire_name(&mut set, input);
        } else {
            engine.fire_name(&mut set, &format!("[CLI] {input}"));
        }
    }

    println!("done.");
}
