//! `teleos-cli` – TeleOS operator console.
//!
//! This binary is the entry point for the teleoperation stack.  It:
//!
//! 1. Loads `~/.teleos/config.toml` (writing the defaults on first run).
//! 2. Builds the event bus, the pose-fusion engine, and the runtime node.
//! 3. Drops the operator into an interactive key loop: every character of a
//!    typed line is forwarded as a key press to the fusion core, and the
//!    words `suspend` / `resume` / `help` / `quit` are console commands.
//! 4. Intercepts **Ctrl-C** to publish a final zero-stiffness write before
//!    exiting, so the arm is never left stiff against a stale goal.
//!
//! Device transports (the pointer/spatial/gamepad bridges and the pose
//! sensor feed) publish onto the same bus topics from their own processes;
//! this console only sources key events.

mod config;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use teleos_fusion::{InputModes, PoseFusionEngine};
use teleos_middleware::{EventBus, Topic};
use teleos_runtime::{BusStiffnessGateway, TeleopNode, init_tracing};
use teleos_types::{DeviceEvent, Event, EventPayload, StiffnessGains};

fn main() {
    init_tracing();
    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  No config found – defaults written to {}",
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Config error".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let bus = EventBus::default();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    {
        let bus = bus.clone();
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!(
                "{}",
                "⚠  Ctrl-C received – dropping stiffness and exiting …"
                    .yellow()
                    .bold()
            );
            let event = Event::new(
                "teleos-cli",
                EventPayload::Stiffness(StiffnessGains::zero()),
            );
            let _ = bus.publish_to(Topic::StiffnessCommands, event);
            shutdown.store(true, Ordering::SeqCst);
        }) {
            warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
        }
    }

    // ── Engine + runtime node ─────────────────────────────────────────────
    let engine = Arc::new(PoseFusionEngine::new(
        cfg.stiffness,
        Arc::new(BusStiffnessGateway::new(bus.clone())),
    ));
    let modes = Arc::new(InputModes::new());
    let suspend = Arc::new(AtomicBool::new(false));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            return;
        }
    };
    let node = TeleopNode::new(
        bus.clone(),
        engine,
        modes,
        suspend.clone(),
        cfg.node_config(),
    );
    let _handles = {
        let _guard = runtime.enter();
        node.spawn()
    };

    println!();
    println!(
        "  Type a line of keys and press Enter to send them; {} for the key map.\n",
        "help".bold().cyan()
    );

    run_key_loop(&bus, &suspend, &shutdown);

    println!("{}", "  ✓ Exiting TeleOS.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Interactive key loop
// ─────────────────────────────────────────────────────────────────────────────

fn run_key_loop(bus: &EventBus, suspend: &Arc<AtomicBool>, shutdown: &Arc<AtomicBool>) {
    let mut editor = match rustyline::DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("{}: {}", "Failed to open terminal".red(), e);
            return;
        }
    };

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match editor.readline("teleos> ") {
            Ok(line) => {
                let line = line.trim();
                match line {
                    "" => continue,
                    "quit" | "exit" => break,
                    "help" => print_help(),
                    "suspend" => {
                        suspend.store(true, Ordering::SeqCst);
                        println!("{}", "  Key input suspended.".yellow());
                    }
                    "resume" => {
                        suspend.store(false, Ordering::SeqCst);
                        println!("{}", "  Key input resumed.".green());
                    }
                    keys => send_keys(bus, keys),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {}", "Input error".red(), e);
                break;
            }
        }
    }
}

fn send_keys(bus: &EventBus, keys: &str) {
    for key in keys.chars() {
        let event = Event::new(
            "teleos-cli::keys",
            EventPayload::Device(DeviceEvent::KeyPress(key)),
        );
        if bus.publish_to(Topic::DeviceInput, event).is_err() {
            println!(
                "{}",
                "  Input pipeline is not running; keys dropped.".red()
            );
            return;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner & help
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ______    __    ____  ____"#.bold().cyan());
    println!("{}", r#"  /_  __/__ / /__ / __ \/ __/"#.bold().cyan());
    println!("{}", r#"   / / / -_) / -_) /_/ /\ \  "#.bold().cyan());
    println!("{}", r#"  /_/  \__/_/\__/\____/___/  "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "TeleOS".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Compliant-arm teleoperation console");
    println!();
}

fn print_help() {
    println!();
    println!("  {}", "Input toggles".bold());
    println!("    1  keyboard    2  pointer    3  spatial    4  gamepad");
    println!();
    println!("  {}", "Stiffness".bold());
    println!("    9  stiffness on (goal reset to current pose)");
    println!("    0  stiffness off (goal tracks the measured pose)");
    println!("    n  nullspace stiffness on     j  nullspace stiffness off");
    println!();
    println!("  {}", "Jogging (keyboard input must be on)".bold());
    println!("    w/s  ±x    a/d  +y/−y    q/z  ±z    (0.01 m per press)");
    println!("    h/f  ±x    t/g  ±y      r/y  ±z    rotation (π/40 rad per press)");
    println!();
    println!("  {}", "Console commands".bold());
    println!("    suspend | resume   freeze / unfreeze all key input");
    println!("    help               this text");
    println!("    quit               exit");
    println!();
}
