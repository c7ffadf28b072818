//! # Control Gates
//!
//! Two boolean gates: the one-way transfer gate and the pause switch.

use super::errors::AdmissionError;

/// One-way transfer gate. Starts closed, can only be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferGate {
    enabled: bool,
}

impl TransferGate {
    /// Whether transfers are enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open the gate.
    pub fn enable(&mut self) -> Result<(), AdmissionError> {
        if self.enabled {
            return Err(AdmissionError::AlreadyEnabled);
        }
        self.enabled = true;
        Ok(())
    }

    /// Fail with `TransferDisabled` while closed.
    pub fn ensure_enabled(&self) -> Result<(), AdmissionError> {
        if self.enabled {
            Ok(())
        } else {
            Err(AdmissionError::TransferDisabled)
        }
    }
}

/// Global pause switch consulted before every mutating operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PausableControl {
    paused: bool,
}

impl PausableControl {
    /// Whether mutating operations are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fail with `ContractPaused` while paused.
    pub fn ensure_not_paused(&self) -> Result<(), AdmissionError> {
        if self.paused {
            Err(AdmissionError::ContractPaused)
        } else {
            Ok(())
        }
    }

    /// Suspend mutating operations.
    pub fn pause(&mut self) -> Result<(), AdmissionError> {
        self.ensure_not_paused()?;
        self.paused = true;
        Ok(())
    }

    /// Resume mutating operations.
    pub fn unpause(&mut self) -> Result<(), AdmissionError> {
        if !self.paused {
            return Err(AdmissionError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }
}
