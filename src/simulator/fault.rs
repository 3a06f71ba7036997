//! Fault flag shared by simulator requests

use crate::error::SimulatorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Behaviour of repeated fault injections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultMode {
    /// First injection sets the fault; later ones are refused
    Latch,
    /// Every injection flips the fault
    Toggle,
}

/// Result of a successful injection command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTransition {
    Injected,
    Cleared,
}

impl FaultTransition {
    pub fn is_active(&self) -> bool {
        matches!(self, FaultTransition::Injected)
    }
}

/// In-memory fault flag with an optional marker file.
///
/// The atomic flag is authoritative. The marker is written before the flag
/// is raised and removed before it is cleared, so a failed marker update
/// leaves the flag untouched. A marker created by someone else latches the
/// flag the next time it is polled.
#[derive(Debug)]
pub struct FaultSwitch {
    active: AtomicBool,
    marker: Option<PathBuf>,
    // Held for the whole command so marker and flag change as one step.
    command: Mutex<()>,
}

impl FaultSwitch {
    pub fn new(marker: Option<PathBuf>) -> Self {
        Self {
            active: AtomicBool::new(false),
            marker,
            command: Mutex::new(()),
        }
    }

    pub fn marker(&self) -> Option<&Path> {
        self.marker.as_deref()
    }

    /// Whether readings should come from the anomalous distribution
    pub fn is_active(&self) -> bool {
        if self.active.load(Ordering::Acquire) {
            return true;
        }

        match &self.marker {
            Some(marker) if marker.exists() => {
                if !self.active.swap(true, Ordering::AcqRel) {
                    tracing::warn!(marker = %marker.display(), "fault marker detected, simulating anomaly");
                }
                true
            }
            _ => false,
        }
    }

    /// Apply a fault-injection command
    pub fn inject(&self, mode: FaultMode) -> Result<FaultTransition, SimulatorError> {
        let _guard = self.command.lock().unwrap_or_else(|e| e.into_inner());
        let was_active = self.is_active();

        let transition = match (mode, was_active) {
            (FaultMode::Latch, true) => return Err(SimulatorError::AlreadyInjected),
            (_, false) => FaultTransition::Injected,
            (FaultMode::Toggle, true) => FaultTransition::Cleared,
        };

        self.sync_marker(transition)?;
        self.active.store(transition.is_active(), Ordering::Release);
        Ok(transition)
    }

    fn sync_marker(&self, transition: FaultTransition) -> Result<(), SimulatorError> {
        let Some(marker) = &self.marker else {
            return Ok(());
        };

        match transition {
            FaultTransition::Injected => {
                std::fs::write(marker, b"")?;
            }
            FaultTransition::Cleared => match std::fs::remove_file(marker) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }

        Ok(())
    }
}
