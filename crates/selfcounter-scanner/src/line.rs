//! # Line Backend
//!
//! Hand scanners in keyboard-wedge or serial mode do their own decoding and
//! emit one barcode per line. This backend reads those lines from a device
//! node, a FIFO, a file, or any `BufRead`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use tracing::debug;

use crate::backend::{CaptureBackend, CaptureSession, FrameDecoder};
use crate::device::{CaptureConstraints, VideoDevice};
use crate::error::{ScannerError, ScannerResult};

type LineReader = Box<dyn BufRead + Send>;

enum Source {
    Path(PathBuf),
    Reader(LineReader),
}

/// A single-device backend over a line-oriented stream.
pub struct LineBackend {
    device: VideoDevice,
    source: Option<Source>,
}

impl LineBackend {
    /// Reads from a path, opened when the surface starts.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        LineBackend {
            device: VideoDevice::new(label.clone(), label, None),
            source: Some(Source::Path(path)),
        }
    }

    /// Reads from an already-open stream.
    pub fn from_reader(label: impl Into<String>, reader: impl BufRead + Send + 'static) -> Self {
        let label = label.into();
        LineBackend {
            device: VideoDevice::new(label.clone(), label, None),
            source: Some(Source::Reader(Box::new(reader))),
        }
    }

    /// Reads from standard input.
    pub fn stdin() -> Self {
        Self::from_reader("stdin", BufReader::new(std::io::stdin()))
    }
}

impl CaptureBackend for LineBackend {
    fn list_devices(&self) -> ScannerResult<Vec<VideoDevice>> {
        Ok(vec![self.device.clone()])
    }

    fn open(
        &mut self,
        device: &VideoDevice,
        constraints: &CaptureConstraints,
    ) -> ScannerResult<CaptureSession> {
        if device.id != self.device.id {
            return Err(ScannerError::DeviceUnavailable(device.id.clone()));
        }

        // Line scanners focus themselves.
        debug!(?constraints, device = %device.label, "Ignoring capture constraints");

        let reader: LineReader = match self.source.take() {
            Some(Source::Reader(reader)) => reader,
            Some(Source::Path(path)) => {
                let file = File::open(&path).map_err(|e| {
                    ScannerError::DeviceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                Box::new(BufReader::new(file))
            }
            None => {
                return Err(ScannerError::DeviceUnavailable(format!(
                    "{} is already open",
                    device.label
                )))
            }
        };

        Ok(CaptureSession::new(Box::new(LineDecoder { reader })))
    }
}

struct LineDecoder {
    reader: LineReader,
}

impl FrameDecoder for LineDecoder {
    fn next_decode(&mut self) -> ScannerResult<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let code = line.trim();
            if !code.is_empty() {
                return Ok(Some(code.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn open(backend: &mut LineBackend) -> ScannerResult<CaptureSession> {
        let device = backend.list_devices()?.remove(0);
        backend.open(&device, &CaptureConstraints::default())
    }

    #[test]
    fn test_reads_trimmed_codes_and_skips_blank_lines() {
        let mut backend = LineBackend::from_reader("wedge", Cursor::new("A1\r\n\n  B2  \n"));
        let mut session = open(&mut backend).unwrap();

        assert_eq!(session.decoder.next_decode().unwrap().as_deref(), Some("A1"));
        assert_eq!(session.decoder.next_decode().unwrap().as_deref(), Some("B2"));
        assert_eq!(session.decoder.next_decode().unwrap(), None);
        assert!(session.torch.is_none());
    }

    #[test]
    fn test_single_device_without_facing() {
        let backend = LineBackend::from_reader("wedge", Cursor::new(""));
        let devices = backend.list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].facing, None);
    }

    #[test]
    fn test_second_open_fails() {
        let mut backend = LineBackend::from_reader("wedge", Cursor::new(""));
        assert!(open(&mut backend).is_ok());
        assert!(matches!(
            open(&mut backend),
            Err(ScannerError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_missing_path_is_unavailable() {
        let mut backend = LineBackend::from_path("/nonexistent/selfcounter/scanner");
        assert!(matches!(
            open(&mut backend),
            Err(ScannerError::DeviceUnavailable(_))
        ));
    }
}
