//! # Counter Session
//!
//! Turns scans and typed commands into controller transitions.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan("A1")                                                             │
//! │     │                                                                   │
//! │     ├─ lock ─► begin_lookup ─► ticket #7, status Pending ─► redraw      │
//! │     │                                                                   │
//! │     └─ tokio::spawn ──► catalog lookup (no lock held)                   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │              lock ─► complete_lookup(ticket #7, outcome)                │
//! │                        ├─ #7 still latest → applied, redraw             │
//! │                        └─ newer ticket issued → Stale, dropped          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Level};

use selfcounter_catalog::{into_outcome, CatalogError, ProductLookup};
use selfcounter_core::validation::looks_like_retail_barcode;
use selfcounter_core::{Applied, LookupStatus};
use selfcounter_scanner::ScannerHandle;

use crate::error::{AppError, AppResult};
use crate::input::Command;
use crate::state::ControllerState;

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ShowHelp,
    Quit,
}

/// Log level for a failed lookup.
///
/// Timeouts and dropped connections warrant a rescan; anything else is a
/// catalog fault.
fn failure_level(err: &CatalogError) -> Level {
    if err.is_retryable() {
        Level::WARN
    } else {
        Level::ERROR
    }
}

pub struct Session<L: ProductLookup + 'static> {
    state: ControllerState,
    lookup: Arc<L>,
}

impl<L: ProductLookup + 'static> Session<L> {
    pub fn new(state: ControllerState, lookup: Arc<L>) -> Self {
        Session { state, lookup }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Starts a lookup for a scanned or typed code.
    ///
    /// Returns once the controller shows the code as pending; the returned
    /// task resolves to whether its result was applied.
    pub fn scan(&self, code: &str) -> AppResult<JoinHandle<Applied>> {
        let ticket = self.state.with_controller_mut(|c| c.begin_lookup(code))?;
        info!(
            barcode = %ticket.barcode,
            seq = ticket.seq,
            retail = looks_like_retail_barcode(&ticket.barcode),
            "Lookup started"
        );

        let state = self.state.clone();
        let lookup = self.lookup.clone();

        Ok(tokio::spawn(async move {
            let result = lookup.lookup(&ticket.barcode).await;
            if let Err(e) = &result {
                if failure_level(e) == Level::WARN {
                    warn!(barcode = %ticket.barcode, error = %e, "Lookup failed, rescan to retry");
                } else {
                    error!(barcode = %ticket.barcode, error = %e, "Lookup failed");
                }
            }

            let applied =
                state.with_controller_mut(|c| c.complete_lookup(&ticket, into_outcome(result)));
            match applied {
                Applied::Current(LookupStatus::Resolved) => {
                    debug!(barcode = %ticket.barcode, seq = ticket.seq, "Product staged")
                }
                Applied::Current(status) => {
                    info!(barcode = %ticket.barcode, %status, "Lookup finished without a product")
                }
                Applied::Stale => {
                    debug!(barcode = %ticket.barcode, seq = ticket.seq, "Dropping stale lookup result")
                }
            }
            applied
        }))
    }

    /// Executes one operator command.
    pub fn execute(&self, command: Command, scanner: Option<&ScannerHandle>) -> AppResult<Flow> {
        match command {
            Command::Lookup(code) => {
                self.scan(&code)?;
            }
            Command::WorkingQuantity(delta) => {
                let quantity = self
                    .state
                    .with_controller_mut(|c| c.adjust_working_quantity(delta))?;
                debug!(quantity, "Working quantity changed");
            }
            Command::Commit => {
                let quantity = self.state.with_controller_mut(|c| c.commit_working_item())?;
                info!(quantity, "Item added to cart");
            }
            Command::CartQuantity { line, delta } => {
                let product_id = self
                    .state
                    .with_controller(|c| {
                        c.cart()
                            .lines()
                            .get(line - 1)
                            .map(|l| l.product_id.clone())
                    })
                    .ok_or_else(|| AppError::input(format!("No cart line {}", line)))?;
                let quantity = self
                    .state
                    .with_controller_mut(|c| c.adjust_cart_quantity(&product_id, delta))?;
                debug!(product_id = %product_id, quantity, "Cart quantity changed");
            }
            Command::Torch => match scanner {
                Some(scanner) => {
                    scanner.toggle_torch();
                }
                None => warn!("Torch not supported"),
            },
            Command::Reset => {
                self.state.with_controller_mut(|c| c.reset());
                info!("Counter reset for next customer");
            }
            Command::Help => return Ok(Flow::ShowHelp),
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}
