//! # selfcounter-scanner: Scanner Surface
//!
//! Acquires a capture device, decodes barcodes continuously and hands every
//! decoded value to the caller.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Scanner Surface                                │
//! │                                                                         │
//! │  ┌──────────────────────┐      ┌────────────────────────────────────┐  │
//! │  │  CaptureBackend      │      │  ScannerSurface::spawn             │  │
//! │  │  • list_devices()    │─────►│  1. pick device (facing, fallback) │  │
//! │  │  • open(dev, hints)  │      │  2. open with focus/zoom hints     │  │
//! │  └──────────────────────┘      │  3. loop next_decode()             │  │
//! │                                │  4. beep + send Detection          │  │
//! │  ┌──────────────────────┐      └───────────────┬────────────────────┘  │
//! │  │  AudioCue            │◄─────────────────────┤                       │
//! │  │  TerminalBell/Silent │                      │                       │
//! │  └──────────────────────┘                      ▼                       │
//! │                                ┌────────────────────────────────────┐  │
//! │                                │  ScannerHandle                     │  │
//! │                                │  status / error_message            │  │
//! │                                │  toggle_torch / shutdown           │  │
//! │                                └────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`backend`] - Capture backend traits
//! - [`cue`] - Audible scan confirmation
//! - [`device`] - Device descriptions and selection
//! - [`error`] - Scanner errors
//! - [`line`] - Backend for line-oriented scanners (keyboard wedge, serial)
//! - [`surface`] - The decode loop and its handle

pub mod backend;
pub mod cue;
pub mod device;
pub mod error;
pub mod line;
pub mod surface;

#[cfg(test)]
pub mod mock;

pub use backend::{CaptureBackend, CaptureSession, FrameDecoder, TorchControl};
pub use cue::{AudioCue, SilentCue, TerminalBell};
pub use device::{select_device, CaptureConstraints, Facing, FocusMode, VideoDevice};
pub use error::{ScannerError, ScannerResult};
pub use line::LineBackend;
pub use surface::{Detection, ScannerHandle, ScannerStatus, ScannerSurface};

/// Message shown to the operator when the capture device cannot be started.
pub const CAMERA_FAILED_MESSAGE: &str = "Camera failed to start";

/// Buffered detections before the decode thread waits on the consumer.
pub const DETECTION_CHANNEL_CAPACITY: usize = 32;
