//! # Scanner Surface
//!
//! Runs the capture loop on its own thread and exposes a cloneable handle.
//!
//! ## Lifecycle
//! ```text
//!   Starting ──open ok──► Scanning ──stream ended / shutdown──► Stopped
//!      │                     │
//!      └──open failed──┐     └──fatal decode error──┐
//!                      ▼                            ▼
//!                Failed("Camera failed to start")   Failed(reason)
//! ```
//!
//! Every successful decode plays the audio cue and then is sent on the
//! detection channel. Duplicate reads are delivered as-is; deciding what a
//! repeated barcode means belongs to the consumer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::backend::{CaptureBackend, CaptureSession, TorchControl};
use crate::cue::AudioCue;
use crate::device::{select_device, CaptureConstraints, VideoDevice};
use crate::error::{ScannerError, ScannerResult};
use crate::{CAMERA_FAILED_MESSAGE, DETECTION_CHANNEL_CAPACITY};

// =============================================================================
// Status & Detection
// =============================================================================

/// Where the surface is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ScannerStatus {
    Starting,
    Scanning,
    Failed(String),
    Stopped,
}

/// One decoded barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub text: String,
    pub detected_at: DateTime<Utc>,
}

struct Shared {
    status: ScannerStatus,
    device: Option<VideoDevice>,
    torch: Option<Arc<dyn TorchControl>>,
    torch_on: bool,
}

type SharedState = Arc<Mutex<Shared>>;

fn lock(shared: &SharedState) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable handle to a running surface.
#[derive(Clone)]
pub struct ScannerHandle {
    shared: SharedState,
    stop: Arc<AtomicBool>,
}

impl ScannerHandle {
    pub fn status(&self) -> ScannerStatus {
        lock(&self.shared).status.clone()
    }

    /// The message to show the operator, if the surface has failed.
    pub fn error_message(&self) -> Option<String> {
        match &lock(&self.shared).status {
            ScannerStatus::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// The device that was opened, once scanning.
    pub fn device(&self) -> Option<VideoDevice> {
        lock(&self.shared).device.clone()
    }

    pub fn torch_on(&self) -> bool {
        lock(&self.shared).torch_on
    }

    /// Flips the torch and returns the new state.
    ///
    /// Without a running session or a torch-capable device this logs a
    /// warning and leaves the state unchanged. The device call runs without
    /// the state lock held.
    pub fn toggle_torch(&self) -> bool {
        let (torch, next) = {
            let shared = lock(&self.shared);
            match (&shared.status, &shared.torch) {
                (ScannerStatus::Scanning, Some(torch)) => (torch.clone(), !shared.torch_on),
                _ => {
                    warn!("Torch not supported");
                    return shared.torch_on;
                }
            }
        };

        if let Err(e) = torch.set_torch(next) {
            warn!(error = %e, "Torch not supported");
            return lock(&self.shared).torch_on;
        }

        let mut shared = lock(&self.shared);
        if shared.status != ScannerStatus::Scanning {
            // The session ended while the switch was in flight.
            drop(shared);
            if next {
                if let Err(e) = torch.set_torch(false) {
                    debug!(error = %e, "Failed to switch torch off");
                }
            }
            return false;
        }

        shared.torch_on = next;
        debug!(on = next, "Torch toggled");
        shared.torch_on
    }

    /// Stops the capture loop.
    ///
    /// The decode thread exits after its current decode returns; a decoder
    /// blocked on a silent device is left to finish on its own.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let mut shared = lock(&self.shared);
        if !matches!(shared.status, ScannerStatus::Failed(_)) {
            shared.status = ScannerStatus::Stopped;
        }
        info!("Scanner shutdown requested");
    }
}

impl std::fmt::Debug for ScannerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = lock(&self.shared);
        f.debug_struct("ScannerHandle")
            .field("status", &shared.status)
            .field("device", &shared.device)
            .field("torch_on", &shared.torch_on)
            .finish()
    }
}

// =============================================================================
// Surface
// =============================================================================

/// The capture loop.
///
/// ## Usage
/// ```rust,ignore
/// let (handle, mut detections) =
///     ScannerSurface::spawn(LineBackend::from_path("/dev/ttyACM0"), Arc::new(TerminalBell))?;
///
/// while let Some(detection) = detections.recv().await {
///     println!("scanned {}", detection.text);
/// }
/// ```
pub struct ScannerSurface<B: CaptureBackend> {
    backend: B,
    cue: Arc<dyn AudioCue>,
    constraints: CaptureConstraints,
    shared: SharedState,
    stop: Arc<AtomicBool>,
    detections_tx: mpsc::Sender<Detection>,
}

impl<B: CaptureBackend> ScannerSurface<B> {
    /// Starts scanning with the default capture constraints.
    pub fn spawn(
        backend: B,
        cue: Arc<dyn AudioCue>,
    ) -> ScannerResult<(ScannerHandle, mpsc::Receiver<Detection>)> {
        Self::spawn_with_constraints(backend, cue, CaptureConstraints::default())
    }

    pub fn spawn_with_constraints(
        backend: B,
        cue: Arc<dyn AudioCue>,
        constraints: CaptureConstraints,
    ) -> ScannerResult<(ScannerHandle, mpsc::Receiver<Detection>)> {
        let (detections_tx, detections_rx) = mpsc::channel(DETECTION_CHANNEL_CAPACITY);
        let shared = Arc::new(Mutex::new(Shared {
            status: ScannerStatus::Starting,
            device: None,
            torch: None,
            torch_on: false,
        }));
        let stop = Arc::new(AtomicBool::new(false));

        let surface = ScannerSurface {
            backend,
            cue,
            constraints,
            shared: shared.clone(),
            stop: stop.clone(),
            detections_tx,
        };

        // A plain thread: decoders block, and a blocked stdin read must not
        // hold up runtime shutdown.
        thread::Builder::new()
            .name("scanner-decode".into())
            .spawn(move || surface.run())?;

        Ok((ScannerHandle { shared, stop }, detections_rx))
    }

    fn open(&mut self) -> ScannerResult<(VideoDevice, CaptureSession)> {
        let devices = self.backend.list_devices()?;
        debug!(count = devices.len(), "Capture devices enumerated");

        let device = select_device(&devices)
            .cloned()
            .ok_or(ScannerError::NoDevice)?;
        info!(id = %device.id, label = %device.label, facing = ?device.facing, "Opening capture device");

        let session = self.backend.open(&device, &self.constraints)?;
        Ok((device, session))
    }

    fn stopping(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn run(mut self) {
        let mut session = match self.open() {
            Ok((device, session)) => {
                let mut shared = lock(&self.shared);
                if shared.status == ScannerStatus::Starting {
                    shared.status = ScannerStatus::Scanning;
                }
                shared.device = Some(device);
                shared.torch = session.torch.clone();
                session
            }
            Err(e) => {
                error!(error = %e, "Capture device failed to start");
                lock(&self.shared).status = ScannerStatus::Failed(CAMERA_FAILED_MESSAGE.into());
                return;
            }
        };

        let mut failure = None;
        while !self.stopping() {
            match session.decoder.next_decode() {
                Ok(Some(text)) => {
                    if self.stopping() {
                        break;
                    }
                    if let Err(e) = self.cue.play() {
                        debug!(error = %e, "Scan cue failed");
                    }
                    debug!(barcode = %text, "Barcode decoded");
                    let detection = Detection {
                        text,
                        detected_at: Utc::now(),
                    };
                    if self.detections_tx.blocking_send(detection).is_err() {
                        debug!("Detection receiver dropped");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Capture stream ended");
                    break;
                }
                Err(e) if e.is_transient() => {
                    trace!(error = %e, "Frame skipped");
                }
                Err(e) => {
                    error!(error = %e, "Capture loop failed");
                    failure = Some(e.to_string());
                    break;
                }
            }
        }

        let mut shared = lock(&self.shared);
        if shared.torch_on {
            if let Some(torch) = &shared.torch {
                if let Err(e) = torch.set_torch(false) {
                    debug!(error = %e, "Failed to switch torch off");
                }
            }
            shared.torch_on = false;
        }
        shared.torch = None;
        shared.status = match failure {
            Some(message) => ScannerStatus::Failed(message),
            None => ScannerStatus::Stopped,
        };
        info!(status = ?shared.status, "Scanner stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Facing;
    use crate::mock::{CountingCue, MockTorch, ScriptedBackend, Step};
    use std::time::Duration;

    fn camera(id: &str, facing: Option<Facing>) -> VideoDevice {
        VideoDevice::new(id, format!("Camera {}", id), facing)
    }

    async fn wait_for(handle: &ScannerHandle, done: impl Fn(&ScannerStatus) -> bool) {
        for _ in 0..200 {
            if done(&handle.status()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("status never settled: {:?}", handle.status());
    }

    #[tokio::test]
    async fn test_detections_arrive_in_order_with_cue() {
        let backend = ScriptedBackend::new(
            vec![camera("0", None)],
            vec![
                Step::Code("A1"),
                Step::BadFrame,
                Step::Code("A1"),
                Step::Code("B2"),
                Step::End,
            ],
        );
        let cue = Arc::new(CountingCue::default());
        let (handle, mut rx) = ScannerSurface::spawn(backend, cue.clone()).unwrap();

        let mut texts = Vec::new();
        while let Some(detection) = rx.recv().await {
            texts.push(detection.text);
        }

        // Duplicates are delivered; bad frames are not.
        assert_eq!(texts, vec!["A1", "A1", "B2"]);
        assert_eq!(cue.plays.load(Ordering::SeqCst), 3);
        wait_for(&handle, |s| *s == ScannerStatus::Stopped).await;
        assert_eq!(handle.error_message(), None);
    }

    #[tokio::test]
    async fn test_opens_environment_facing_device() {
        let backend = ScriptedBackend::new(
            vec![
                camera("front", Some(Facing::User)),
                camera("rear", Some(Facing::Environment)),
                camera("usb", None),
            ],
            vec![Step::End],
        );
        let opened = backend.opened.clone();
        let (handle, mut rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();

        assert!(rx.recv().await.is_none());
        assert_eq!(opened.lock().unwrap().as_deref(), Some("rear"));
        assert_eq!(handle.device().unwrap().id, "rear");
    }

    #[tokio::test]
    async fn test_falls_back_to_last_device() {
        let backend = ScriptedBackend::new(vec![camera("0", None), camera("1", None)], vec![Step::End]);
        let opened = backend.opened.clone();
        let (_handle, mut rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();

        assert!(rx.recv().await.is_none());
        assert_eq!(opened.lock().unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_open_failure_reports_camera_message() {
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![]).failing_open();
        let (handle, mut rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();

        assert!(rx.recv().await.is_none());
        wait_for(&handle, |s| matches!(s, ScannerStatus::Failed(_))).await;
        assert_eq!(handle.error_message().as_deref(), Some("Camera failed to start"));
    }

    #[tokio::test]
    async fn test_no_devices_fails() {
        let backend = ScriptedBackend::new(vec![], vec![]);
        let (handle, _rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();

        wait_for(&handle, |s| matches!(s, ScannerStatus::Failed(_))).await;
        assert_eq!(handle.error_message().as_deref(), Some(CAMERA_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_fatal_decode_error_fails_surface() {
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![Step::Code("A1"), Step::Fatal]);
        let (handle, mut rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();

        assert_eq!(rx.recv().await.unwrap().text, "A1");
        assert!(rx.recv().await.is_none());
        wait_for(&handle, |s| matches!(s, ScannerStatus::Failed(_))).await;
        assert!(handle.error_message().unwrap().contains("device unplugged"));
    }

    #[tokio::test]
    async fn test_broken_cue_does_not_drop_scans() {
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![Step::Code("A1"), Step::End]);
        let cue = Arc::new(CountingCue {
            broken: true,
            ..Default::default()
        });
        let (_handle, mut rx) = ScannerSurface::spawn(backend, cue.clone()).unwrap();

        assert_eq!(rx.recv().await.unwrap().text, "A1");
        assert_eq!(cue.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_torch_toggles_when_supported() {
        let torch = Arc::new(MockTorch::default());
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![]).with_torch(torch.clone());
        let (handle, _rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();
        wait_for(&handle, |s| *s == ScannerStatus::Scanning).await;

        assert!(handle.toggle_torch());
        assert!(handle.torch_on());
        assert!(torch.lit.load(Ordering::SeqCst));

        assert!(!handle.toggle_torch());
        assert!(!torch.lit.load(Ordering::SeqCst));

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_torch_switch_does_not_hold_state_lock() {
        let (torch, entered, release) = MockTorch::gated();
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![]).with_torch(torch.clone());
        let (handle, _rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();
        wait_for(&handle, |s| *s == ScannerStatus::Scanning).await;

        let toggler = {
            let handle = handle.clone();
            thread::spawn(move || handle.toggle_torch())
        };
        entered.recv_timeout(Duration::from_secs(2)).unwrap();

        // The switch is blocked; the handle must still answer.
        let (status_tx, status_rx) = std::sync::mpsc::channel();
        {
            let handle = handle.clone();
            thread::spawn(move || status_tx.send((handle.status(), handle.torch_on())).ok());
        }
        let (status, lit) = status_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(status, ScannerStatus::Scanning);
        assert!(!lit);

        drop(release);
        assert!(toggler.join().unwrap());
        assert!(handle.torch_on());
        assert!(torch.lit.load(Ordering::SeqCst));

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_torch_unsupported_leaves_state() {
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![]);
        let (handle, _rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();
        wait_for(&handle, |s| *s == ScannerStatus::Scanning).await;

        assert!(!handle.toggle_torch());
        assert!(!handle.torch_on());

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop_and_torch() {
        let torch = Arc::new(MockTorch::default());
        let backend = ScriptedBackend::new(vec![camera("0", None)], vec![]).with_torch(torch.clone());
        let (handle, mut rx) = ScannerSurface::spawn(backend, Arc::new(CountingCue::default())).unwrap();
        wait_for(&handle, |s| *s == ScannerStatus::Scanning).await;
        handle.toggle_torch();

        handle.shutdown();
        assert_eq!(handle.status(), ScannerStatus::Stopped);

        // Channel closes once the decode thread notices the stop flag.
        assert!(rx.recv().await.is_none());
        assert!(!torch.lit.load(Ordering::SeqCst));
        assert!(!handle.torch_on());
    }
}
