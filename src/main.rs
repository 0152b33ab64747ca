//! padmap - game controller to keyboard/mouse remapper for X11
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              Event Loop                  │
//! ├──────────────────────────────────────────┤
//! │  Controller (evdev)  →  Engine           │
//! │                          ↓  ← focus (X11)│
//! │              Dispatch / Select overlay   │
//! │                          ↓               │
//! │              Virtual device (uinput)     │
//! └──────────────────────────────────────────┘
//! ```

mod config;
mod dispatch;
mod engine;
mod error;
mod input;
mod menu;
mod output;
mod process;
mod signals;
#[cfg(test)]
mod testing;
mod window;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use std::path::PathBuf;

use crate::engine::Engine;
use crate::input::{Controller, Readiness};
use crate::output::VirtualDevice;
use crate::process::SystemProcesses;
use crate::signals::ShutdownSignals;
use crate::window::XlibWindows;

/// Print help message
fn print_help() {
    println!(
        r#"padmap {} - game controller remapper for X11

USAGE:
    padmap [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    -i, --input PATH        Controller event node (overrides [device] path)
    --init-config           Generate default config file
    -f, --force             Overwrite existing config file

EXAMPLES:
    padmap -i /dev/input/event5       Remap the controller at event5
    padmap --init-config              Generate default config
    padmap --init-config --force      Overwrite existing config

CONFIG FILE:
    ~/.config/padmap/config.toml  (or $PADMAP_CONFIG, /etc/padmap/config.toml)

Requires read access to the controller node and write access to /dev/uinput.
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Value following `-i`/`--input`, or `--input=PATH`
fn input_arg(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-i" || arg == "--input" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--input=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Check command line arguments
    let args: Vec<String> = std::env::args().collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("padmap {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Config file generation mode
    if args.iter().any(|a| a == "--init-config") {
        let force = args.iter().any(|a| a == "--force" || a == "-f");
        let path = config::default_config_path()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        if let Err(e) = config::Config::write_default(&path, force) {
            eprintln!("Failed to generate config: {:#}", e);
            return Err(e);
        }
        println!("Config file generated: {}", path.display());
        return Ok(());
    }

    info!("padmap starting...");

    let cfg = config::Config::load();

    let Some(input_path) = input_arg(&args).or_else(|| cfg.device.path.clone()) else {
        eprintln!("No controller device given (use --input PATH or [device] path)\n");
        print_help();
        return Err(anyhow!("no input device"));
    };

    if let Err(e) = run(&cfg, input_path) {
        error!("{:#}", e);
        return Err(e);
    }

    info!("padmap stopped");
    Ok(())
}

/// Set up devices and run the event loop until disconnect or shutdown
fn run(cfg: &config::Config, input_path: PathBuf) -> Result<()> {
    let mut shutdown = ShutdownSignals::new()?;
    let mut controller = Controller::open(&input_path)?;
    info!("Controller: {}", input_path.display());

    let device = VirtualDevice::create(&cfg.device.name)?;
    let windows = XlibWindows::open()?;
    let processes = SystemProcesses::new(&cfg.helpers, &cfg.menu);
    let mut engine = Engine::new(device, windows, processes, cfg);

    loop {
        match controller.wait(shutdown.as_raw_fd(), engine.poll_timeout())? {
            Readiness::Interrupted => continue,
            Readiness::Timeout => engine.on_timeout()?,
            Readiness::Readable => loop {
                let batch = controller.read_events()?;
                if batch.is_empty() {
                    break;
                }
                for ev in &batch {
                    engine.handle_event(ev)?;
                }
            },
            Readiness::Shutdown => {
                info!("Shutdown requested ({:?})", shutdown.take());
                break;
            }
            Readiness::Disconnected => {
                warn!("input device disconnected");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_arg_forms() {
        assert_eq!(
            input_arg(&args(&["padmap", "-i", "/dev/input/event5"])),
            Some(PathBuf::from("/dev/input/event5"))
        );
        assert_eq!(
            input_arg(&args(&["padmap", "--input=/dev/input/event7"])),
            Some(PathBuf::from("/dev/input/event7"))
        );
        assert_eq!(input_arg(&args(&["padmap", "--input"])), None);
        assert_eq!(input_arg(&args(&["padmap"])), None);
    }
}
