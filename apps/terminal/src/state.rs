//! # Controller State
//!
//! Shares the cart controller between the input loop and lookup tasks.
//!
//! ## Thread Safety
//! The controller is wrapped in `Arc<Mutex<T>>` because:
//! 1. Typed commands mutate it from the main loop
//! 2. Lookup tasks complete on runtime worker threads
//! 3. Only one transition may run at a time
//!
//! Locks are held for one synchronous transition and never across an
//! `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use selfcounter_core::{CartController, Snapshot};

/// Shared handle to the cart controller.
#[derive(Clone)]
pub struct ControllerState {
    controller: Arc<Mutex<CartController>>,
}

impl ControllerState {
    pub fn new(controller: CartController) -> Self {
        ControllerState {
            controller: Arc::new(Mutex::new(controller)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartController> {
        // Transitions leave the controller consistent even if an observer
        // panicked mid-notify.
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the controller.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let total = state.with_controller(|c| c.total());
    /// ```
    pub fn with_controller<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartController) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the controller.
    ///
    /// ## Example
    /// ```rust,ignore
    /// state.with_controller_mut(|c| c.commit_working_item())?;
    /// ```
    pub fn with_controller_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartController) -> R,
    {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with_controller(|c| c.snapshot())
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new(CartController::new())
    }
}
