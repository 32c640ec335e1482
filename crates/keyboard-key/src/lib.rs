//! keyboard-key - playable piano keys
//!
//! Every key is a small state machine that turns pointer gestures into
//! note-on/note-off events and works out which label to show for its pitch.
//! Features include:
//!
//! - Twelve label conventions (letters, solfege, octave numbers, middle C only)
//! - Sliding mode, where a drag glides from key to key
//! - Tap mode, with an automatic release after a short delay
//! - Pressed/idle coloring, including keys lit by an external source
//! - Haptic pulses through a pluggable sink
//! - A terminal keyboard widget, configurable via TOML file
//!
//! # Usage as a Library
//!
//! ```no_run
//! use keyboard_key::{
//!     KeyGestureController, KeySettings, LabelMode, ManualScheduler, NoHaptics, Pitch, Point,
//!     PointerPhase, Rect,
//! };
//! use std::time::Duration;
//!
//! let settings = KeySettings { label_mode: LabelMode::LettersAll, ..Default::default() };
//! let pitch: Pitch = "C4".parse().unwrap();
//! let mut key = KeyGestureController::new(pitch, settings, Box::new(NoHaptics));
//! key.on_geometry_update(Rect::new(0.0, 0.0, 40.0, 120.0));
//!
//! // Finger lands on the key
//! if let Some(event) = key.on_pointer_event(Point::new(10.0, 100.0), PointerPhase::Moved) {
//!     println!("{} {:?} ({})", key.pitch(), event, key.current_label());
//! }
//!
//! // In tap mode the host owns the clock and hands timers back
//! let settings = KeySettings { allow_sliding: false, ..Default::default() };
//! let mut tap_key = KeyGestureController::new(pitch, settings, Box::new(NoHaptics));
//! let mut scheduler = ManualScheduler::new();
//! tap_key.on_tap(&mut scheduler);
//! for token in scheduler.advance(Duration::from_millis(100)) {
//!     tap_key.on_release_timer(token);
//! }
//! ```

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod haptics;
pub mod keyboard;
pub mod label;
pub mod pitch;
pub mod scheduler;
pub mod ui;

// Re-export main types
pub use color::{KeyColor, KeyVisualState};
pub use config::{Config, Theme};
pub use controller::{KeyGestureController, KeySettings, NoteEvent, PointerPhase, RetapPolicy};
pub use error::{Error, Result};
pub use geometry::{Alignment, KeyMetrics, Point, Rect, Size};
pub use haptics::{HapticSink, HapticStrength, LogHaptics, NoHaptics, RecordingHaptics};
pub use keyboard::{Keyboard, KeyboardSettings, C3_MIDI};
pub use label::{resolve_label, LabelMode};
pub use pitch::{Accidental, Letter, Pitch, MIDDLE_C_MIDI};
pub use scheduler::{ManualScheduler, Scheduler, TimerToken, WallClockScheduler};
pub use ui::{render_keyboard_standalone, KeyboardWidget};
