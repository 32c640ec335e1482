//! Haptic feedback capability
//!
//! The controller only asks for a pulse; the host decides what a pulse is
//! (a platform impact generator, a terminal bell, nothing at all).

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Strength of a haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticStrength {
    Light,
    #[default]
    Medium,
    Heavy,
    Soft,
    Rigid,
}

/// Receiver of haptic pulse requests
pub trait HapticSink {
    /// Fire-and-forget pulse request
    fn pulse(&mut self, strength: HapticStrength);
}

/// Discards every pulse
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticSink for NoHaptics {
    fn pulse(&mut self, _strength: HapticStrength) {}
}

/// Logs pulses at debug level
#[derive(Debug, Clone, Default)]
pub struct LogHaptics {
    label: String,
}

impl LogHaptics {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl HapticSink for LogHaptics {
    fn pulse(&mut self, strength: HapticStrength) {
        log::debug!("Haptic pulse: key={} strength={:?}", self.label, strength);
    }
}

/// Records pulses into a shared list (for tests and hosts that batch pulses)
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    pulses: Rc<RefCell<Vec<HapticStrength>>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses recorded so far, shared with every clone of this sink
    pub fn pulses(&self) -> Vec<HapticStrength> {
        self.pulses.borrow().clone()
    }

    /// Remove and return the recorded pulses
    pub fn take(&self) -> Vec<HapticStrength> {
        std::mem::take(&mut *self.pulses.borrow_mut())
    }
}

impl HapticSink for RecordingHaptics {
    fn pulse(&mut self, strength: HapticStrength) {
        self.pulses.borrow_mut().push(strength);
    }
}
