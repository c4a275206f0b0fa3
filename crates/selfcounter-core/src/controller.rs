//! # Cart Controller
//!
//! The one stateful object of the counter. Every change to what the
//! operator sees goes through a transition method here; renderers only
//! ever read a [`Snapshot`].
//!
//! ## Transition Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scan-to-Cart Transitions                           │
//! │                                                                         │
//! │  scanner / manual entry                                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  begin_lookup("A1") ──► status = Pending, ticket { seq: 7 }            │
//! │         │                                                               │
//! │         │   (caller performs the remote lookup, may take a while)      │
//! │         ▼                                                               │
//! │  complete_lookup(ticket, outcome)                                       │
//! │         │                                                               │
//! │         ├── ticket.seq != latest ─► Stale, nothing changes             │
//! │         ├── Found(p)  ─► working = p × 1, recent.record(p)             │
//! │         ├── NotFound  ─► working = None                                │
//! │         └── Failed(e) ─► working = None (identifier field kept)        │
//! │                                                                         │
//! │  adjust_working_quantity(±n)   increment always, decrement ≥ 1         │
//! │  commit_working_item()         merge into cart, clear working + field  │
//! │  adjust_cart_quantity(id, ±n)  increment always, decrement clamps at 1 │
//! │                                                                         │
//! │  After every change: observers.on_change(&snapshot)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlapping Lookups
//! Nothing stops a second scan while the first request is still in flight.
//! Each `begin_lookup` issues a higher sequence number and only the newest
//! ticket may apply its result, so a slow response for an older scan can
//! never overwrite the product staged for a newer one.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::recent::{RecentScan, RecentScans};
use crate::types::{LookupOutcome, LookupStatus, LookupTicket, WorkingItem};
use crate::validation::normalize_identifier;
use crate::MIN_ITEM_QUANTITY;

// =============================================================================
// Snapshot
// =============================================================================

/// Everything a renderer needs, frozen at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Snapshot {
    /// Contents of the identifier field (last scanned or typed code).
    pub identifier: String,

    pub status: LookupStatus,

    pub working_item: Option<WorkingItem>,

    /// Most recent first, at most two.
    pub recent: Vec<RecentScan>,

    /// Cart lines in insertion order.
    pub cart: Vec<CartLine>,

    pub total: Money,

    /// No cart lines, no recent scans and nothing staged.
    pub is_empty: bool,
}

// =============================================================================
// Observers
// =============================================================================

/// Receives a snapshot after every state-changing transition.
///
/// Implemented by renderers. Called synchronously while the controller is
/// borrowed, so implementations must not call back into it.
pub trait StateObserver: Send + Sync {
    fn on_change(&self, snapshot: &Snapshot);
}

/// Observer that ignores everything (for tests and headless use).
pub struct NoOpObserver;

impl StateObserver for NoOpObserver {
    fn on_change(&self, _snapshot: &Snapshot) {}
}

/// Handle returned by [`CartController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Result of handing a lookup outcome back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The ticket was current; the status it moved to.
    Current(LookupStatus),
    /// A newer lookup was issued since; the outcome was dropped.
    Stale,
}

// =============================================================================
// Controller
// =============================================================================

/// Owns the counter's application state.
pub struct CartController {
    identifier: String,
    status: LookupStatus,
    working: Option<WorkingItem>,
    recent: RecentScans,
    cart: Cart,

    /// Sequence number of the most recently issued ticket (0 = none yet).
    issued_seq: u64,

    observers: Vec<(SubscriptionId, Arc<dyn StateObserver>)>,
    next_subscription: u64,
}

impl CartController {
    /// Creates a controller with an empty cart and no history.
    pub fn new() -> Self {
        Self::with_recent_capacity(crate::RECENT_SCAN_CAPACITY)
    }

    /// Creates a controller remembering `capacity` recent scans.
    pub fn with_recent_capacity(capacity: usize) -> Self {
        CartController {
            identifier: String::new(),
            status: LookupStatus::Idle,
            working: None,
            recent: RecentScans::with_capacity(capacity),
            cart: Cart::new(),
            issued_seq: 0,
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Registers an observer. It is not called until the next change.
    pub fn subscribe(&mut self, observer: Arc<dyn StateObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, observer) in &self.observers {
            observer.on_change(&snapshot);
        }
    }

    // =========================================================================
    // Lookup Transitions
    // =========================================================================

    /// Starts a lookup for a scanned or typed code.
    ///
    /// The identifier field shows the code immediately and the status moves
    /// to `Pending`. A staged working item stays visible until the result
    /// arrives.
    ///
    /// ## Errors
    /// `CoreError::Validation` for blank or malformed input; nothing changes.
    pub fn begin_lookup(&mut self, raw: &str) -> CoreResult<LookupTicket> {
        let barcode = normalize_identifier(raw)?;

        self.issued_seq += 1;
        self.identifier = barcode.clone();
        self.status = LookupStatus::Pending;
        self.notify();

        Ok(LookupTicket {
            seq: self.issued_seq,
            barcode,
        })
    }

    /// Applies the result of the lookup identified by `ticket`.
    ///
    /// Results for any ticket other than the newest one are dropped.
    pub fn complete_lookup(&mut self, ticket: &LookupTicket, outcome: LookupOutcome) -> Applied {
        if ticket.seq != self.issued_seq {
            return Applied::Stale;
        }

        self.status = match outcome {
            LookupOutcome::Found(product) => {
                self.recent.record(product.clone(), Utc::now());
                self.working = Some(WorkingItem::new(product));
                LookupStatus::Resolved
            }
            LookupOutcome::NotFound => {
                self.working = None;
                LookupStatus::NotFound
            }
            LookupOutcome::Failed(_) => {
                self.working = None;
                LookupStatus::Failed
            }
        };

        self.notify();
        Applied::Current(self.status)
    }

    // =========================================================================
    // Manual Entry
    // =========================================================================

    /// Replaces the identifier field contents (operator typing).
    pub fn set_identifier_input(&mut self, text: &str) {
        if self.identifier != text {
            self.identifier = text.to_string();
            self.notify();
        }
    }

    /// Searches for whatever is in the identifier field.
    pub fn search_identifier(&mut self) -> CoreResult<LookupTicket> {
        let current = self.identifier.clone();
        self.begin_lookup(&current)
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Moves the working item into the cart.
    ///
    /// Merges into an existing line for the same product identifier,
    /// otherwise appends. Clears the working item and the identifier field.
    ///
    /// ## Returns
    /// The resulting quantity of the affected cart line.
    pub fn commit_working_item(&mut self) -> CoreResult<u32> {
        let item = self.working.take().ok_or(CoreError::NoWorkingItem)?;

        self.cart.add(&item.product, item.quantity);
        self.identifier.clear();
        if !self.status.is_pending() {
            self.status = LookupStatus::Idle;
        }

        let quantity = self
            .cart
            .line(&item.product.id)
            .map(|l| l.quantity)
            .unwrap_or(item.quantity);

        self.notify();
        Ok(quantity)
    }

    /// Changes the staged quantity by `delta`.
    ///
    /// Increments always succeed. A decrement that would leave fewer than
    /// one unit is rejected and the quantity stays as it was.
    pub fn adjust_working_quantity(&mut self, delta: i32) -> CoreResult<u32> {
        let item = self.working.as_mut().ok_or(CoreError::NoWorkingItem)?;

        if delta >= 0 {
            item.quantity = item.quantity.saturating_add(delta.unsigned_abs());
        } else {
            let by = delta.unsigned_abs();
            if item.quantity < MIN_ITEM_QUANTITY.saturating_add(by) {
                return Err(CoreError::QuantityBelowMinimum {
                    min: MIN_ITEM_QUANTITY,
                });
            }
            item.quantity -= by;
        }

        let quantity = item.quantity;
        if delta != 0 {
            self.notify();
        }
        Ok(quantity)
    }

    /// Changes a cart line's quantity by `delta`, clamping at 1.
    pub fn adjust_cart_quantity(&mut self, product_id: &str, delta: i32) -> CoreResult<u32> {
        let quantity = if delta >= 0 {
            self.cart.increment(product_id, delta.unsigned_abs())?
        } else {
            self.cart.decrement(product_id, delta.unsigned_abs())?
        };

        if delta != 0 {
            self.notify();
        }
        Ok(quantity)
    }

    /// Starts over for the next customer: empty cart, no history, nothing
    /// staged. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.recent = RecentScans::with_capacity(self.recent.capacity());
        self.working = None;
        self.identifier.clear();
        self.status = LookupStatus::Idle;
        self.issued_seq += 1;
        self.notify();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn status(&self) -> LookupStatus {
        self.status
    }

    pub fn working_item(&self) -> Option<&WorkingItem> {
        self.working.as_ref()
    }

    pub fn recent(&self) -> &RecentScans {
        &self.recent
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Σ price × quantity over the cart, recomputed on each call.
    pub fn total(&self) -> Money {
        self.cart.total()
    }

    /// Sequence number of the newest ticket issued.
    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }

    /// True when there is nothing to show but the "scan an item" prompt.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty() && self.recent.is_empty() && self.working.is_none()
    }

    /// Freezes the current state for rendering.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            identifier: self.identifier.clone(),
            status: self.status,
            working_item: self.working.clone(),
            recent: self.recent.entries().to_vec(),
            cart: self.cart.lines().to_vec(),
            total: self.total(),
            is_empty: self.is_empty(),
        }
    }
}

impl Default for CartController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CartController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartController")
            .field("identifier", &self.identifier)
            .field("status", &self.status)
            .field("working", &self.working)
            .field("recent", &self.recent.barcodes())
            .field("cart_lines", &self.cart.item_count())
            .field("issued_seq", &self.issued_seq)
            .field("observers", &self.observers.len())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use std::sync::Mutex;

    fn soap() -> Product {
        Product::new("1", "A1", "Soap", 5000)
    }

    fn bread() -> Product {
        Product::new("2", "B2", "Bread", 1250)
    }

    fn scan(controller: &mut CartController, code: &str, product: Option<Product>) -> Applied {
        let ticket = controller.begin_lookup(code).unwrap();
        let outcome = match product {
            Some(p) => LookupOutcome::Found(p),
            None => LookupOutcome::NotFound,
        };
        controller.complete_lookup(&ticket, outcome)
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Snapshot>>,
    }

    impl StateObserver for Recorder {
        fn on_change(&self, snapshot: &Snapshot) {
            self.seen.lock().unwrap().push(snapshot.clone());
        }
    }

    #[test]
    fn test_scan_and_commit_single_item() {
        let mut c = CartController::new();

        let applied = scan(&mut c, "A1", Some(soap()));
        assert_eq!(applied, Applied::Current(LookupStatus::Resolved));
        assert_eq!(c.working_item().unwrap().quantity, 1);

        assert_eq!(c.commit_working_item().unwrap(), 1);
        assert_eq!(c.cart().item_count(), 1);
        assert_eq!(c.cart().line("1").unwrap().quantity, 1);
        assert_eq!(c.total().to_string(), "50.00");
        assert!(c.working_item().is_none());
        assert_eq!(c.identifier(), "");
    }

    #[test]
    fn test_commit_same_product_merges_quantity() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        c.commit_working_item().unwrap();

        scan(&mut c, "A1", Some(soap()));
        assert_eq!(c.adjust_working_quantity(1).unwrap(), 2);
        assert_eq!(c.commit_working_item().unwrap(), 3);

        assert_eq!(c.cart().item_count(), 1);
        assert_eq!(c.cart().line("1").unwrap().quantity, 3);
        assert_eq!(c.total().to_string(), "150.00");
    }

    #[test]
    fn test_not_found_leaves_cart_and_recent_alone() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        c.commit_working_item().unwrap();
        let cart_before = c.cart().clone();
        let recent_before = c.recent().clone();

        let applied = scan(&mut c, "ZZ", None);

        assert_eq!(applied, Applied::Current(LookupStatus::NotFound));
        assert!(c.working_item().is_none());
        assert_eq!(c.cart(), &cart_before);
        assert_eq!(c.recent(), &recent_before);
    }

    #[test]
    fn test_not_found_clears_previous_working_item() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        assert!(c.working_item().is_some());

        scan(&mut c, "ZZ", None);
        assert!(c.working_item().is_none());
    }

    #[test]
    fn test_rescan_moves_to_front_of_recent() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        scan(&mut c, "B2", Some(bread()));
        scan(&mut c, "A1", Some(soap()));

        assert_eq!(c.recent().barcodes(), vec!["A1", "B2"]);
    }

    #[test]
    fn test_failure_keeps_identifier_field() {
        let mut c = CartController::new();
        let ticket = c.begin_lookup("A1").unwrap();
        let applied = c.complete_lookup(&ticket, LookupOutcome::Failed("connection refused".into()));

        assert_eq!(applied, Applied::Current(LookupStatus::Failed));
        assert_eq!(c.identifier(), "A1");
        assert!(c.working_item().is_none());
        assert!(c.recent().is_empty());
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut c = CartController::new();
        let first = c.begin_lookup("A1").unwrap();
        let second = c.begin_lookup("B2").unwrap();
        assert!(second.seq > first.seq);

        // Newer scan resolves first, older one straggles in afterwards.
        c.complete_lookup(&second, LookupOutcome::Found(bread()));
        let late = c.complete_lookup(&first, LookupOutcome::Found(soap()));

        assert_eq!(late, Applied::Stale);
        assert_eq!(c.working_item().unwrap().product.id, "2");
        assert_eq!(c.recent().barcodes(), vec!["B2"]);
        assert_eq!(c.identifier(), "B2");
    }

    #[test]
    fn test_older_failure_cannot_clear_newer_product() {
        let mut c = CartController::new();
        let first = c.begin_lookup("A1").unwrap();
        let second = c.begin_lookup("B2").unwrap();

        c.complete_lookup(&second, LookupOutcome::Found(bread()));
        c.complete_lookup(&first, LookupOutcome::Failed("timeout".into()));

        assert_eq!(c.status(), LookupStatus::Resolved);
        assert!(c.working_item().is_some());
    }

    #[test]
    fn test_working_decrement_rejected_at_one() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));

        assert_eq!(
            c.adjust_working_quantity(-1),
            Err(CoreError::QuantityBelowMinimum { min: 1 })
        );
        assert_eq!(c.working_item().unwrap().quantity, 1);

        c.adjust_working_quantity(3).unwrap();
        assert_eq!(
            c.adjust_working_quantity(-4),
            Err(CoreError::QuantityBelowMinimum { min: 1 })
        );
        assert_eq!(c.adjust_working_quantity(-3).unwrap(), 1);
    }

    #[test]
    fn test_working_adjust_without_item() {
        let mut c = CartController::new();
        assert_eq!(c.adjust_working_quantity(1), Err(CoreError::NoWorkingItem));
        assert_eq!(c.commit_working_item(), Err(CoreError::NoWorkingItem));
    }

    #[test]
    fn test_cart_decrement_clamps_and_total_tracks() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        c.commit_working_item().unwrap();
        scan(&mut c, "B2", Some(bread()));
        c.commit_working_item().unwrap();

        assert_eq!(c.adjust_cart_quantity("2", 2).unwrap(), 3);
        assert_eq!(c.total().cents(), 5000 + 3 * 1250);

        assert_eq!(c.adjust_cart_quantity("2", -5).unwrap(), 1);
        assert_eq!(c.adjust_cart_quantity("1", -1).unwrap(), 1);
        assert_eq!(c.total().cents(), 5000 + 1250);
        assert_eq!(c.total(), c.total());
        assert_eq!(c.cart().item_count(), 2);

        assert_eq!(
            c.adjust_cart_quantity("9", 1),
            Err(CoreError::LineNotFound("9".into()))
        );
    }

    #[test]
    fn test_blank_input_is_rejected_without_change() {
        let mut c = CartController::new();
        let seq = c.latest_seq();

        assert!(matches!(c.begin_lookup("   "), Err(CoreError::Validation(_))));
        assert_eq!(c.latest_seq(), seq);
        assert_eq!(c.status(), LookupStatus::Idle);
    }

    #[test]
    fn test_manual_search_uses_identifier_field() {
        let mut c = CartController::new();
        c.set_identifier_input(" B2 ");
        let ticket = c.search_identifier().unwrap();

        assert_eq!(ticket.barcode, "B2");
        assert_eq!(c.identifier(), "B2");
        assert!(c.status().is_pending());
    }

    #[test]
    fn test_commit_while_pending_keeps_pending() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        let ticket = c.begin_lookup("B2").unwrap();

        c.commit_working_item().unwrap();
        assert!(c.status().is_pending());

        c.complete_lookup(&ticket, LookupOutcome::Found(bread()));
        assert_eq!(c.working_item().unwrap().product.id, "2");
    }

    #[test]
    fn test_reset_invalidates_outstanding_tickets() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));
        c.commit_working_item().unwrap();
        let ticket = c.begin_lookup("B2").unwrap();

        c.reset();
        assert!(c.is_empty());
        assert_eq!(c.complete_lookup(&ticket, LookupOutcome::Found(bread())), Applied::Stale);
        assert!(c.is_empty());
    }

    #[test]
    fn test_observers_receive_snapshots() {
        let mut c = CartController::new();
        let recorder = Arc::new(Recorder::default());
        let id = c.subscribe(recorder.clone());

        scan(&mut c, "A1", Some(soap()));
        c.commit_working_item().unwrap();

        {
            let seen = recorder.seen.lock().unwrap();
            // begin, complete, commit
            assert_eq!(seen.len(), 3);
            assert_eq!(seen[0].status, LookupStatus::Pending);
            assert_eq!(seen[1].working_item.as_ref().unwrap().product.name, "Soap");
            assert_eq!(seen[2].total.cents(), 5000);
            assert!(seen[2].working_item.is_none());
        }

        assert!(c.unsubscribe(id));
        assert!(!c.unsubscribe(id));
        c.adjust_cart_quantity("1", 1).unwrap();
        assert_eq!(recorder.seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_rejected_transitions_do_not_notify() {
        let mut c = CartController::new();
        let recorder = Arc::new(Recorder::default());
        c.subscribe(recorder.clone());
        c.subscribe(Arc::new(NoOpObserver));

        let _ = c.commit_working_item();
        let _ = c.adjust_working_quantity(-1);
        let _ = c.begin_lookup("");

        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_empty_flag() {
        let mut c = CartController::new();
        assert!(c.snapshot().is_empty);

        scan(&mut c, "ZZ", None);
        assert!(c.snapshot().is_empty);

        scan(&mut c, "A1", Some(soap()));
        let snap = c.snapshot();
        assert!(!snap.is_empty);
        assert_eq!(snap.recent.len(), 1);
        assert_eq!(snap.total, Money::zero());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut c = CartController::new();
        scan(&mut c, "A1", Some(soap()));

        let json = serde_json::to_value(c.snapshot()).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["workingItem"]["quantity"], 1);
        assert_eq!(json["isEmpty"], false);
    }
}
