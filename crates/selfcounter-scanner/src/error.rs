//! # Scanner Error Types

use thiserror::Error;

/// Result type alias for scanner operations.
pub type ScannerResult<T> = Result<T, ScannerError>;

#[derive(Debug, Error)]
pub enum ScannerError {
    /// The backend reported no capture devices at all.
    #[error("No capture device available")]
    NoDevice,

    /// The device exists but could not be opened (permission, busy, gone).
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The decoder could not be constructed for the opened stream.
    #[error("Decoder failed to initialize: {0}")]
    DecoderInit(String),

    /// A single frame or line could not be decoded. The loop keeps going.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The device has no controllable torch.
    #[error("Torch not supported on this device")]
    TorchUnsupported,

    /// I/O error from the underlying device or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScannerError {
    /// Errors that only affect one decode attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScannerError::Decode(_))
    }
}
