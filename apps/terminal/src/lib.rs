//! # Self Counter Terminal
//!
//! Terminal front-end for the self-checkout counter.
//!
//! ## Module Organization
//! ```text
//! selfcounter_terminal/
//! ├── lib.rs          ◄─── You are here (startup & event loop)
//! ├── cli.rs          ◄─── Command line flags
//! ├── config.rs       ◄─── AppConfig (file → env → flags)
//! ├── error.rs        ◄─── AppError
//! ├── input.rs        ◄─── Typed command parsing, console reader
//! ├── render.rs       ◄─── Screen drawing (StateObserver)
//! ├── session.rs      ◄─── Lookups and command execution
//! └── state.rs        ◄─── Shared controller handle
//! ```
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tokio::select! over                                                    │
//! │    • console lines     → parse_command → Session::execute               │
//! │    • scanner detections → Session::scan                                 │
//! │    • Ctrl-C            → shut down                                      │
//! │                                                                         │
//! │  Every controller change reaches TerminalRenderer through the           │
//! │  observer list, including changes made by finished lookup tasks.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod state;

use std::io::BufReader;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use selfcounter_catalog::CatalogClient;
use selfcounter_core::CartController;
use selfcounter_scanner::{
    AudioCue, Detection, LineBackend, ScannerHandle, ScannerSurface, SilentCue, TerminalBell,
};

use config::AppConfig;
use error::AppResult;
use input::{parse_command, spawn_line_reader, HELP};
use render::{RenderMode, TerminalRenderer};
use session::{Flow, Session};
use state::ControllerState;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with the screen on stdout.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=selfcounter=trace` - Show trace for selfcounter crates only
/// - Default: `info,selfcounter=debug`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,selfcounter=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Starts the scanner surface if a device is configured.
fn start_scanner(config: &AppConfig) -> AppResult<Option<(ScannerHandle, mpsc::Receiver<Detection>)>> {
    let Some(device) = &config.scanner.device else {
        info!("No scanner device configured, keyboard entry only");
        return Ok(None);
    };

    let cue: Arc<dyn AudioCue> = if config.scanner.sound {
        Arc::new(TerminalBell)
    } else {
        Arc::new(SilentCue)
    };

    let surface = ScannerSurface::spawn(LineBackend::from_path(device), cue)?;
    Ok(Some(surface))
}

async fn next_detection(rx: &mut Option<mpsc::Receiver<Detection>>) -> Option<Detection> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Runs the counter until `quit`, end of input, or Ctrl-C.
///
/// ## Startup Sequence
/// 1. Build the catalog client (validates the URL again)
/// 2. Create the controller and subscribe the renderer
/// 3. Start the scanner surface, if configured
/// 4. Draw the empty screen and enter the event loop
pub async fn run(config: AppConfig, mode: RenderMode) -> AppResult<()> {
    info!(
        catalog = %config.catalog.base_url,
        scanner = ?config.scanner.device,
        "Starting Self Counter"
    );

    let client = CatalogClient::new(config.catalog_config())?;

    let renderer = Arc::new(TerminalRenderer::stdout(config.display.clone(), mode));
    let mut controller = CartController::new();
    controller.subscribe(renderer.clone());
    let state = ControllerState::new(controller);
    let session = Session::new(state.clone(), Arc::new(client));

    let (scanner, mut detections) = match start_scanner(&config)? {
        Some((handle, rx)) => (Some(handle), Some(rx)),
        None => (None, None),
    };

    let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()))?;

    renderer.draw(&state.snapshot());

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Console input closed");
                    break;
                };
                let flow = parse_command(&line)
                    .and_then(|cmd| match cmd {
                        Some(cmd) => session.execute(cmd, scanner.as_ref()),
                        None => Ok(Flow::Continue),
                    });
                match flow {
                    Ok(Flow::Continue) => renderer.set_notice(None),
                    Ok(Flow::ShowHelp) => renderer.print(HELP),
                    Ok(Flow::Quit) => break,
                    Err(e) => renderer.set_notice(Some(e.user_message())),
                }
            }
            detection = next_detection(&mut detections) => {
                match detection {
                    Some(detection) => {
                        if let Err(e) = session.scan(&detection.text) {
                            warn!(error = %e, "Ignoring scanned code");
                            renderer.set_notice(Some(e.user_message()));
                        }
                    }
                    None => {
                        detections = None;
                        let message = scanner.as_ref().and_then(|s| s.error_message());
                        match message {
                            Some(message) => renderer.set_notice(Some(message)),
                            None => info!("Scanner stream ended"),
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    if let Some(scanner) = scanner {
        scanner.shutdown();
    }

    let total = state.with_controller(|c| c.total());
    info!(total = %config.display.format_currency(total), "Self Counter stopped");
    Ok(())
}
