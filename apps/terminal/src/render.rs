//! # Terminal Renderer
//!
//! Draws controller snapshots on stdout.
//!
//! ## Layout
//! ```text
//! ════════════════════════════════════════════
//!  Self Counter
//! ════════════════════════════════════════════
//!  Barcode: A1
//!
//!  Soap                             Rs.50.00
//!  Qty 2                           Rs.100.00
//!  (+ / - to change, add to put in cart)
//!
//!  Recent: Soap (A1, 10:42) · Milk (B2, 10:41)
//! ────────────────────────────────────────────
//!  1. Soap               x3        Rs.150.00
//! ────────────────────────────────────────────
//!  Total Bill Rs.150.00
//! ```
//!
//! With nothing scanned yet the screen shows "Scan any item to get info"
//! above a zero total.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use tracing::debug;

use selfcounter_core::{LookupStatus, Snapshot, StateObserver};

use crate::config::DisplaySettings;

const WIDTH: usize = 44;

pub const EMPTY_STATE: &str = "Scan any item to get info";

/// How snapshots are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Human-readable screen.
    #[default]
    Text,
    /// One JSON snapshot per line, for a front-end reading our stdout.
    Json,
}

/// Renders one snapshot as text.
pub fn render_text(snapshot: &Snapshot, display: &DisplaySettings, notice: Option<&str>) -> String {
    let heavy = "═".repeat(WIDTH);
    let light = "─".repeat(WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{}\n {}\n{}\n", heavy, display.store_name, heavy));

    if let Some(notice) = notice {
        out.push_str(&format!(" ! {}\n", notice));
    }

    out.push_str(&format!(" Barcode: {}\n", snapshot.identifier));
    match snapshot.status {
        LookupStatus::Pending => out.push_str(" Looking up...\n"),
        LookupStatus::NotFound => out.push_str(" No product for this barcode\n"),
        LookupStatus::Failed => out.push_str(" Lookup failed, scan again\n"),
        LookupStatus::Idle | LookupStatus::Resolved => {}
    }

    if snapshot.is_empty {
        out.push_str(&format!("\n {}\n", EMPTY_STATE));
    }

    if let Some(item) = &snapshot.working_item {
        out.push('\n');
        out.push_str(&row(&item.product.name, &display.format_currency(item.product.price())));
        out.push_str(&row(
            &format!("Qty {}", item.quantity),
            &display.format_currency(item.subtotal()),
        ));
        out.push_str(" (+ / - to change, add to put in cart)\n");
    }

    if !snapshot.recent.is_empty() {
        let recent: Vec<String> = snapshot
            .recent
            .iter()
            .map(|r| {
                format!(
                    "{} ({}, {})",
                    r.product.name,
                    r.product.barcode,
                    r.scanned_at.with_timezone(&Local).format("%H:%M")
                )
            })
            .collect();
        out.push_str(&format!("\n Recent: {}\n", recent.join(" · ")));
    }

    out.push_str(&format!("{}\n", light));
    if !snapshot.cart.is_empty() {
        for (i, line) in snapshot.cart.iter().enumerate() {
            let label = format!("{}. {:<18} x{}", i + 1, truncate(&line.name, 18), line.quantity);
            out.push_str(&row(&label, &display.format_currency(line.line_total())));
        }
        out.push_str(&format!("{}\n", light));
    }
    out.push_str(&format!(" Total Bill {}\n", display.format_currency(snapshot.total)));

    out
}

fn row(left: &str, right: &str) -> String {
    let pad = WIDTH.saturating_sub(left.chars().count() + right.chars().count() + 1);
    format!(" {}{}{}\n", left, " ".repeat(pad.max(1)), right)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

// =============================================================================
// Observer
// =============================================================================

struct Screen<W> {
    out: W,
    notice: Option<String>,
    last: Option<Snapshot>,
}

/// Redraws on every controller change.
pub struct TerminalRenderer<W: Write + Send> {
    display: DisplaySettings,
    mode: RenderMode,
    screen: Mutex<Screen<W>>,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout(display: DisplaySettings, mode: RenderMode) -> Self {
        Self::new(std::io::stdout(), display, mode)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, display: DisplaySettings, mode: RenderMode) -> Self {
        TerminalRenderer {
            display,
            mode,
            screen: Mutex::new(Screen {
                out,
                notice: None,
                last: None,
            }),
        }
    }

    /// Draws a snapshot.
    pub fn draw(&self, snapshot: &Snapshot) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        screen.last = Some(snapshot.clone());
        self.write(&mut screen, snapshot);
    }

    /// Shows a one-line message above the barcode field, replacing any
    /// previous one. Redraws the latest snapshot if the message changed.
    pub fn set_notice(&self, notice: Option<String>) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        if screen.notice == notice {
            return;
        }
        screen.notice = notice;
        if let Some(last) = screen.last.take() {
            self.write(&mut screen, &last);
            screen.last = Some(last);
        }
    }

    /// Prints free text (help) without touching the screen state.
    pub fn print(&self, text: &str) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(screen.out, "{}", text).and_then(|_| screen.out.flush()) {
            debug!(error = %e, "Failed to write to terminal");
        }
    }

    fn write(&self, screen: &mut Screen<W>, snapshot: &Snapshot) {
        let text = match self.mode {
            RenderMode::Text => render_text(snapshot, &self.display, screen.notice.as_deref()),
            RenderMode::Json => match serde_json::to_string(snapshot) {
                Ok(json) => json,
                Err(e) => {
                    debug!(error = %e, "Failed to serialize snapshot");
                    return;
                }
            },
        };

        if let Err(e) = writeln!(screen.out, "{}", text).and_then(|_| screen.out.flush()) {
            debug!(error = %e, "Failed to write to terminal");
        }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.screen
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }
}

impl<W: Write + Send> StateObserver for TerminalRenderer<W> {
    fn on_change(&self, snapshot: &Snapshot) {
        self.draw(snapshot);
    }
}
