//! # Capture Devices
//!
//! Device descriptions and the rule for picking one.
//!
//! ## Selection Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Any device the platform reports as environment-facing?  → use it   │
//! │     (first such device in enumeration order)                            │
//! │                                                                         │
//! │  2. Otherwise → the LAST enumerated device                              │
//! │                                                                         │
//! │  Rule 2 is a heuristic: phones tend to list the rear camera after the  │
//! │  front one. It is only used when facing metadata is missing.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Which way a camera points, when the platform says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Rear camera, pointing away from the operator.
    Environment,
    /// Front camera, pointing at the operator.
    User,
    /// Externally attached (USB camera, hand scanner).
    External,
}

/// A capture device as enumerated by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDevice {
    /// Backend-specific identifier used to open the device.
    pub id: String,

    /// Human-readable name.
    pub label: String,

    /// Facing metadata, if the platform provides it.
    pub facing: Option<Facing>,
}

impl VideoDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>, facing: Option<Facing>) -> Self {
        VideoDevice {
            id: id.into(),
            label: label.into(),
            facing,
        }
    }
}

/// Picks the device to scan with. `None` only for an empty list.
pub fn select_device(devices: &[VideoDevice]) -> Option<&VideoDevice> {
    devices
        .iter()
        .find(|d| d.facing == Some(Facing::Environment))
        .or_else(|| devices.last())
}

/// Focus behavior requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    /// Refocus continuously as the item moves (best for scanning).
    #[default]
    Continuous,
    /// Focus once, then hold.
    Single,
    /// Leave the device default.
    Fixed,
}

/// Advisory capability hints. Backends apply what they support and ignore
/// the rest; nothing fails because a hint could not be honored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub focus: FocusMode,

    /// Optical/digital zoom factor; 2× helps small barcodes fill the frame.
    pub zoom: f32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        CaptureConstraints {
            focus: FocusMode::Continuous,
            zoom: 2.0,
        }
    }
}
