//! # Capture Backend Traits
//!
//! The seam between the scanner surface and whatever actually produces
//! barcodes.
//!
//! ```text
//! CaptureBackend          one per kind of hardware
//!   └── open() ─► CaptureSession
//!                   ├── decoder: FrameDecoder     blocking, one decode per call
//!                   └── torch:   TorchControl?    only if the device has one
//! ```
//!
//! Decoding is blocking on purpose: camera decoders and serial reads are
//! both synchronous, and the surface runs them on a dedicated thread.

use std::sync::Arc;

use crate::device::{CaptureConstraints, VideoDevice};
use crate::error::ScannerResult;

/// Produces one decoded barcode per call.
pub trait FrameDecoder: Send {
    /// Blocks until the next successful decode.
    ///
    /// ## Returns
    /// - `Ok(Some(text))` - a barcode was read
    /// - `Ok(None)` - the stream ended (device unplugged, EOF)
    /// - `Err(ScannerError::Decode(_))` - one bad frame; call again
    /// - any other `Err` - the stream is unusable
    fn next_decode(&mut self) -> ScannerResult<Option<String>>;
}

/// Switches the device light.
pub trait TorchControl: Send + Sync {
    fn set_torch(&self, on: bool) -> ScannerResult<()>;
}

/// An opened device.
pub struct CaptureSession {
    pub decoder: Box<dyn FrameDecoder>,
    pub torch: Option<Arc<dyn TorchControl>>,
}

impl CaptureSession {
    /// A session without torch support.
    pub fn new(decoder: Box<dyn FrameDecoder>) -> Self {
        CaptureSession {
            decoder,
            torch: None,
        }
    }

    /// Attaches a torch control.
    pub fn with_torch(mut self, torch: Arc<dyn TorchControl>) -> Self {
        self.torch = Some(torch);
        self
    }
}

/// A family of capture devices.
pub trait CaptureBackend: Send + 'static {
    /// Enumerates devices in platform order.
    fn list_devices(&self) -> ScannerResult<Vec<VideoDevice>>;

    /// Opens a device and initializes its decoder.
    fn open(
        &mut self,
        device: &VideoDevice,
        constraints: &CaptureConstraints,
    ) -> ScannerResult<CaptureSession>;
}
