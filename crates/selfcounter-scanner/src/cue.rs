//! # Scan Cue
//!
//! The short sound played after every successful decode. A cue that fails
//! to play is never a reason to drop a scan.

use std::io::Write;

use crate::error::ScannerResult;

/// Something that can make the "got it" noise.
pub trait AudioCue: Send + Sync {
    fn play(&self) -> ScannerResult<()>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play(&self) -> ScannerResult<()> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn play(&self) -> ScannerResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_cue() {
        assert!(SilentCue.play().is_ok());
    }
}
