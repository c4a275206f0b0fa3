//! Scripted capture backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crate::backend::{CaptureBackend, CaptureSession, FrameDecoder, TorchControl};
use crate::cue::AudioCue;
use crate::device::{CaptureConstraints, VideoDevice};
use crate::error::{ScannerError, ScannerResult};

/// One scripted decode result.
#[derive(Debug, Clone)]
pub enum Step {
    Code(&'static str),
    BadFrame,
    Fatal,
    End,
}

pub struct ScriptedBackend {
    devices: Vec<VideoDevice>,
    steps: Vec<Step>,
    torch: Option<Arc<MockTorch>>,
    fail_open: bool,
    pub opened: Arc<Mutex<Option<String>>>,
}

impl ScriptedBackend {
    pub fn new(devices: Vec<VideoDevice>, steps: Vec<Step>) -> Self {
        ScriptedBackend {
            devices,
            steps,
            torch: None,
            fail_open: false,
            opened: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_torch(mut self, torch: Arc<MockTorch>) -> Self {
        self.torch = Some(torch);
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

impl CaptureBackend for ScriptedBackend {
    fn list_devices(&self) -> ScannerResult<Vec<VideoDevice>> {
        Ok(self.devices.clone())
    }

    fn open(
        &mut self,
        device: &VideoDevice,
        _constraints: &CaptureConstraints,
    ) -> ScannerResult<CaptureSession> {
        if self.fail_open {
            return Err(ScannerError::DeviceUnavailable("permission denied".into()));
        }
        *self.opened.lock().unwrap() = Some(device.id.clone());

        let decoder = ScriptedDecoder {
            steps: self.steps.drain(..).collect(),
        };
        let mut session = CaptureSession::new(Box::new(decoder));
        if let Some(torch) = &self.torch {
            session = session.with_torch(torch.clone());
        }
        Ok(session)
    }
}

struct ScriptedDecoder {
    steps: VecDeque<Step>,
}

impl FrameDecoder for ScriptedDecoder {
    fn next_decode(&mut self) -> ScannerResult<Option<String>> {
        match self.steps.pop_front() {
            Some(Step::Code(code)) => Ok(Some(code.to_string())),
            Some(Step::BadFrame) => Err(ScannerError::Decode("no barcode in frame".into())),
            Some(Step::Fatal) => Err(ScannerError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            ))),
            Some(Step::End) => Ok(None),
            None => {
                // Idle camera: frames keep arriving without a barcode.
                std::thread::sleep(Duration::from_millis(10));
                Err(ScannerError::Decode("no barcode in frame".into()))
            }
        }
    }
}

#[derive(Default)]
pub struct MockTorch {
    pub lit: AtomicBool,
    gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

impl MockTorch {
    /// A torch whose switch signals `entered` and then waits on `release`.
    /// Dropping the release sender lets every later switch through.
    pub fn gated() -> (Arc<Self>, mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let torch = MockTorch {
            lit: AtomicBool::new(false),
            gate: Mutex::new(Some((entered_tx, release_rx))),
        };
        (Arc::new(torch), entered_rx, release_tx)
    }
}

impl TorchControl for MockTorch {
    fn set_torch(&self, on: bool) -> ScannerResult<()> {
        if let Some((entered, release)) = &*self.gate.lock().unwrap() {
            entered.send(()).ok();
            release.recv().ok();
        }
        self.lit.store(on, Ordering::SeqCst);
        Ok(())
    }
}

/// Counts plays; optionally fails every one of them.
#[derive(Default)]
pub struct CountingCue {
    pub plays: AtomicUsize,
    pub broken: bool,
}

impl AudioCue for CountingCue {
    fn play(&self) -> ScannerResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(ScannerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no audio sink",
            )));
        }
        Ok(())
    }
}
