//! Gesture interpretation for a single key
//!
//! [`KeyGestureController`] owns the pressed flag of one key and turns raw
//! input into note lifecycle events. It works in one of two modes:
//!
//! - **Sliding**: every pointer move is checked against the key's current
//!   bounds. Entering presses the key, leaving releases it, and the end of
//!   the gesture always releases it.
//! - **Tap**: a tap presses the key and arms a release timer through the
//!   injected [`Scheduler`]. The host delivers the elapsed token back via
//!   [`KeyGestureController::on_release_timer`].
//!
//! Note events are returned to the caller; haptic pulses go to the injected
//! [`HapticSink`]. Out-of-sequence input is absorbed as a no-op.

use crate::color::{KeyColor, KeyVisualState};
use crate::error::Error;
use crate::geometry::{Point, Rect};
use crate::haptics::{HapticSink, HapticStrength};
use crate::label::{resolve_label, LabelMode};
use crate::pitch::Pitch;
use crate::scheduler::{Scheduler, TimerToken};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default time between a tap and its automatic note off
pub const DEFAULT_TAP_RELEASE_MS: u64 = 100;

/// Logical note lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteEvent {
    On,
    Off,
}

/// Phase of a sliding-mode pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Pointer moved (or went down) at the given location
    Moved,
    /// Gesture ended; the location is not consulted
    Ended,
}

/// What a tap does while the key is still held from an earlier tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetapPolicy {
    /// Note on again and arm another release; earlier releases stay armed
    #[default]
    Retrigger,
    /// Disarm pending releases, note on again and arm a fresh release
    CancelOnRetap,
    /// Absorb the tap
    Ignore,
}

impl RetapPolicy {
    pub fn name(self) -> &'static str {
        match self {
            RetapPolicy::Retrigger => "retrigger",
            RetapPolicy::CancelOnRetap => "cancel_on_retap",
            RetapPolicy::Ignore => "ignore",
        }
    }
}

impl fmt::Display for RetapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RetapPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "retrigger" => Ok(RetapPolicy::Retrigger),
            "cancel_on_retap" | "cancel" => Ok(RetapPolicy::CancelOnRetap),
            "ignore" => Ok(RetapPolicy::Ignore),
            _ => Err(Error::InvalidRetapPolicy(s.to_string())),
        }
    }
}

/// Per-key construction settings
#[derive(Debug, Clone, PartialEq)]
pub struct KeySettings {
    pub label_mode: LabelMode,
    /// Explicit label text; replaces the resolved label when set
    pub text: Option<String>,
    pub haptics_enabled: bool,
    pub haptics_strength: HapticStrength,
    /// Sliding mode when true, tap mode when false
    pub allow_sliding: bool,
    pub tap_release_time: Duration,
    pub retap_policy: RetapPolicy,
    /// Usually driven by incoming MIDI
    pub is_activated_externally: bool,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            label_mode: LabelMode::None,
            text: None,
            haptics_enabled: true,
            haptics_strength: HapticStrength::Medium,
            allow_sliding: true,
            tap_release_time: Duration::from_millis(DEFAULT_TAP_RELEASE_MS),
            retap_policy: RetapPolicy::Retrigger,
            is_activated_externally: false,
        }
    }
}

/// Pressed-state machine for one key
pub struct KeyGestureController {
    pitch: Pitch,
    settings: KeySettings,
    label: String,
    is_pressed: bool,
    is_activated: bool,
    bounds: Option<Rect>,
    /// Release timers this key armed and has not seen fire yet
    pending_releases: Vec<TimerToken>,
    haptics: Box<dyn HapticSink>,
}

impl fmt::Debug for KeyGestureController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGestureController")
            .field("pitch", &self.pitch)
            .field("label", &self.label)
            .field("is_pressed", &self.is_pressed)
            .field("bounds", &self.bounds)
            .field("pending_releases", &self.pending_releases)
            .finish_non_exhaustive()
    }
}

impl KeyGestureController {
    /// Create a controller for `pitch`; the label is resolved once here
    pub fn new(pitch: Pitch, settings: KeySettings, haptics: Box<dyn HapticSink>) -> Self {
        let label = match &settings.text {
            Some(text) => text.clone(),
            None => resolve_label(&pitch, settings.label_mode),
        };
        Self {
            pitch,
            settings,
            label,
            is_pressed: false,
            is_activated: false,
            bounds: None,
            pending_releases: Vec::new(),
            haptics,
        }
    }

    /// The key's on-screen rectangle changed
    pub fn on_geometry_update(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Sliding-mode pointer input
    pub fn on_pointer_event(&mut self, location: Point, phase: PointerPhase) -> Option<NoteEvent> {
        if !self.settings.allow_sliding {
            log::debug!("Ignoring pointer event on {} in tap mode", self.pitch);
            return None;
        }

        match phase {
            PointerPhase::Moved => {
                let inside = self.bounds.is_some_and(|b| b.contains(location));
                if inside && !self.is_pressed {
                    Some(self.press())
                } else if !inside && self.is_pressed {
                    Some(self.unpress())
                } else {
                    None
                }
            }
            PointerPhase::Ended => {
                if self.is_pressed {
                    Some(self.unpress())
                } else {
                    None
                }
            }
        }
    }

    /// Tap-mode input; arms the release timer on `scheduler`
    pub fn on_tap(&mut self, scheduler: &mut dyn Scheduler) -> Option<NoteEvent> {
        if self.settings.allow_sliding {
            log::debug!("Ignoring tap on {} in sliding mode", self.pitch);
            return None;
        }

        if self.is_pressed {
            match self.settings.retap_policy {
                RetapPolicy::Ignore => {
                    log::debug!("Ignoring retap on held key {}", self.pitch);
                    return None;
                }
                RetapPolicy::CancelOnRetap => {
                    for token in self.pending_releases.drain(..) {
                        scheduler.cancel(token);
                    }
                }
                RetapPolicy::Retrigger => {}
            }
        }

        let event = self.press();
        let token = scheduler.schedule_after(self.settings.tap_release_time);
        log::trace!("{} release armed as {}", self.pitch, token);
        self.pending_releases.push(token);
        Some(event)
    }

    /// A release timer armed by [`Self::on_tap`] elapsed
    ///
    /// Tokens this key does not know are ignored. A known token releases the
    /// key if it is still pressed.
    pub fn on_release_timer(&mut self, token: TimerToken) -> Option<NoteEvent> {
        let idx = self.pending_releases.iter().position(|t| *t == token)?;
        self.pending_releases.remove(idx);

        if self.is_pressed {
            Some(self.unpress())
        } else {
            None
        }
    }

    /// Force the key up and forget pending release timers
    ///
    /// Timers already armed on the scheduler will be ignored when they fire.
    pub fn release(&mut self) -> Option<NoteEvent> {
        self.pending_releases.clear();
        if self.is_pressed {
            Some(self.unpress())
        } else {
            None
        }
    }

    fn press(&mut self) -> NoteEvent {
        self.is_pressed = true;
        if self.settings.haptics_enabled {
            self.haptics.pulse(self.settings.haptics_strength);
        }
        log::debug!("Note on: {}", self.pitch);
        NoteEvent::On
    }

    fn unpress(&mut self) -> NoteEvent {
        self.is_pressed = false;
        log::debug!("Note off: {}", self.pitch);
        NoteEvent::Off
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn settings(&self) -> &KeySettings {
        &self.settings
    }

    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    pub fn is_white(&self) -> bool {
        self.pitch.is_white()
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Release timers armed and not yet delivered
    pub fn pending_releases(&self) -> &[TimerToken] {
        &self.pending_releases
    }

    /// Host-driven "down" appearance; never emits note events
    pub fn set_activated(&mut self, activated: bool) {
        self.is_activated = activated;
    }

    /// Appearance override for remote note-ons; never emits note events
    pub fn set_activated_externally(&mut self, activated: bool) {
        self.settings.is_activated_externally = activated;
    }

    pub fn visual_state(&self) -> KeyVisualState {
        KeyVisualState {
            is_white: self.is_white(),
            is_pressed: self.is_pressed,
            is_activated: self.is_activated,
            is_activated_externally: self.settings.is_activated_externally,
        }
    }

    /// Label text, resolved at construction
    pub fn current_label(&self) -> &str {
        &self.label
    }

    /// Fill color slot for the current render pass
    pub fn current_color(&self) -> KeyColor {
        self.visual_state().key_color()
    }

    /// Label color slot
    pub fn text_color(&self) -> KeyColor {
        self.visual_state().text_color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::RecordingHaptics;
    use crate::scheduler::ManualScheduler;

    const BOUNDS: Rect = Rect { x: 0.0, y: 0.0, width: 10.0, height: 40.0 };
    const INSIDE: Point = Point { x: 5.0, y: 20.0 };
    const OUTSIDE: Point = Point { x: 15.0, y: 20.0 };

    fn sliding_key(haptics: &RecordingHaptics) -> KeyGestureController {
        let mut key = KeyGestureController::new(
            Pitch::from_midi(60),
            KeySettings::default(),
            Box::new(haptics.clone()),
        );
        key.on_geometry_update(BOUNDS);
        key
    }

    fn tap_key(policy: RetapPolicy) -> KeyGestureController {
        tap_key_with_haptics(policy, &RecordingHaptics::new())
    }

    fn tap_key_with_haptics(
        policy: RetapPolicy,
        haptics: &RecordingHaptics,
    ) -> KeyGestureController {
        let settings = KeySettings {
            allow_sliding: false,
            retap_policy: policy,
            ..Default::default()
        };
        KeyGestureController::new(Pitch::from_midi(60), settings, Box::new(haptics.clone()))
    }

    /// Drive a tap key through the scheduler and collect (time_ms, event)
    fn run_taps(
        policy: RetapPolicy,
        taps_ms: &[u64],
        until_ms: u64,
    ) -> (KeyGestureController, Vec<(u64, NoteEvent)>) {
        let mut key = tap_key(policy);
        let mut sched = ManualScheduler::new();
        let mut events = Vec::new();
        for ms in 0..=until_ms {
            if ms > 0 {
                for token in sched.advance(Duration::from_millis(1)) {
                    if let Some(ev) = key.on_release_timer(token) {
                        events.push((ms, ev));
                    }
                }
            }
            if taps_ms.contains(&ms) {
                if let Some(ev) = key.on_tap(&mut sched) {
                    events.push((ms, ev));
                }
            }
        }
        (key, events)
    }

    #[test]
    fn test_label_resolved_at_construction() {
        let settings = KeySettings { label_mode: LabelMode::Solfege, ..Default::default() };
        let key = KeyGestureController::new(
            Pitch::from_midi(62),
            settings,
            Box::new(RecordingHaptics::new()),
        );
        assert_eq!(key.current_label(), "Re");
    }

    #[test]
    fn test_custom_text_overrides_label() {
        let settings = KeySettings {
            label_mode: LabelMode::LettersAll,
            text: Some("hi".to_string()),
            ..Default::default()
        };
        let key = KeyGestureController::new(
            Pitch::from_midi(60),
            settings,
            Box::new(RecordingHaptics::new()),
        );
        assert_eq!(key.current_label(), "hi");
    }

    #[test]
    fn test_sliding_enter_leave() {
        let haptics = RecordingHaptics::new();
        let mut key = sliding_key(&haptics);

        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Moved), Some(NoteEvent::On));
        assert!(key.is_pressed());
        assert_eq!(haptics.pulses(), vec![HapticStrength::Medium]);

        // Staying inside emits nothing
        assert_eq!(key.on_pointer_event(Point::new(6.0, 30.0), PointerPhase::Moved), None);
        assert_eq!(haptics.pulses().len(), 1);

        assert_eq!(key.on_pointer_event(OUTSIDE, PointerPhase::Moved), Some(NoteEvent::Off));
        assert!(!key.is_pressed());
        assert_eq!(key.on_pointer_event(OUTSIDE, PointerPhase::Moved), None);

        // Re-entering is a new note
        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Moved), Some(NoteEvent::On));
        assert_eq!(haptics.pulses().len(), 2);
    }

    #[test]
    fn test_sliding_gesture_end() {
        let haptics = RecordingHaptics::new();
        let mut key = sliding_key(&haptics);

        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Ended), None);

        key.on_pointer_event(INSIDE, PointerPhase::Moved);
        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Ended), Some(NoteEvent::Off));
        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Ended), None);
        assert!(!key.is_pressed());
    }

    #[test]
    fn test_sliding_follows_bounds_changes() {
        let haptics = RecordingHaptics::new();
        let mut key = sliding_key(&haptics);

        key.on_pointer_event(INSIDE, PointerPhase::Moved);
        // Key scrolls away under a stationary pointer
        key.on_geometry_update(Rect::new(100.0, 0.0, 10.0, 40.0));
        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Moved), Some(NoteEvent::Off));
    }

    #[test]
    fn test_sliding_without_bounds_never_presses() {
        let mut key = KeyGestureController::new(
            Pitch::from_midi(60),
            KeySettings::default(),
            Box::new(RecordingHaptics::new()),
        );
        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Moved), None);
        assert!(!key.is_pressed());
    }

    #[test]
    fn test_haptics_disabled() {
        let haptics = RecordingHaptics::new();
        let settings = KeySettings {
            haptics_enabled: false,
            ..Default::default()
        };
        let mut key =
            KeyGestureController::new(Pitch::from_midi(60), settings, Box::new(haptics.clone()));
        key.on_geometry_update(BOUNDS);
        assert_eq!(key.on_pointer_event(INSIDE, PointerPhase::Moved), Some(NoteEvent::On));
        assert!(haptics.pulses().is_empty());
    }

    #[test]
    fn test_modes_are_exclusive() {
        let mut sched = ManualScheduler::new();
        let haptics = RecordingHaptics::new();
        let mut sliding = sliding_key(&haptics);
        assert_eq!(sliding.on_tap(&mut sched), None);
        assert_eq!(sched.pending(), 0);

        let mut tap = tap_key(RetapPolicy::Retrigger);
        tap.on_geometry_update(BOUNDS);
        assert_eq!(tap.on_pointer_event(INSIDE, PointerPhase::Moved), None);
        assert!(!tap.is_pressed());
    }

    #[test]
    fn test_tap_haptics() {
        let haptics = RecordingHaptics::new();
        let mut key = tap_key_with_haptics(RetapPolicy::Retrigger, &haptics);
        let mut sched = ManualScheduler::new();
        key.on_tap(&mut sched);
        assert_eq!(haptics.pulses(), vec![HapticStrength::Medium]);

        // Releasing never pulses
        for token in sched.advance(Duration::from_millis(100)) {
            key.on_release_timer(token);
        }
        assert_eq!(haptics.pulses().len(), 1);

        let silent = RecordingHaptics::new();
        let settings = KeySettings {
            allow_sliding: false,
            haptics_enabled: false,
            ..Default::default()
        };
        let mut key =
            KeyGestureController::new(Pitch::from_midi(60), settings, Box::new(silent.clone()));
        assert_eq!(key.on_tap(&mut sched), Some(NoteEvent::On));
        assert!(silent.pulses().is_empty());
    }

    #[test]
    fn test_retap_haptics_follow_policy() {
        let cases = [
            (RetapPolicy::Retrigger, 2),
            (RetapPolicy::CancelOnRetap, 2),
            (RetapPolicy::Ignore, 1),
        ];
        for (policy, expected) in cases {
            let haptics = RecordingHaptics::new();
            let mut key = tap_key_with_haptics(policy, &haptics);
            let mut sched = ManualScheduler::new();
            key.on_tap(&mut sched);
            sched.advance(Duration::from_millis(50));
            key.on_tap(&mut sched);
            assert_eq!(haptics.pulses().len(), expected, "{:?}", policy);
        }
    }

    #[test]
    fn test_tap_releases_after_exact_delay() {
        let (key, events) = run_taps(RetapPolicy::Retrigger, &[0], 300);
        assert_eq!(events, vec![(0, NoteEvent::On), (100, NoteEvent::Off)]);
        assert!(!key.is_pressed());
    }

    #[test]
    fn test_tap_custom_release_time() {
        let settings = KeySettings {
            allow_sliding: false,
            tap_release_time: Duration::from_millis(250),
            ..Default::default()
        };
        let mut key = KeyGestureController::new(
            Pitch::from_midi(61),
            settings,
            Box::new(RecordingHaptics::new()),
        );
        let mut sched = ManualScheduler::new();

        assert_eq!(key.on_tap(&mut sched), Some(NoteEvent::On));
        assert!(sched.advance(Duration::from_millis(249)).is_empty());
        let due = sched.advance(Duration::from_millis(1));
        assert_eq!(due.len(), 1);
        assert_eq!(key.on_release_timer(due[0]), Some(NoteEvent::Off));
    }

    #[test]
    fn test_retap_retrigger_keeps_first_release() {
        let (key, events) = run_taps(RetapPolicy::Retrigger, &[0, 50], 300);
        assert_eq!(
            events,
            vec![(0, NoteEvent::On), (50, NoteEvent::On), (100, NoteEvent::Off)]
        );
        assert!(!key.is_pressed());
        assert!(key.pending_releases().is_empty());
    }

    #[test]
    fn test_retap_cancel_rearms_release() {
        let (key, events) = run_taps(RetapPolicy::CancelOnRetap, &[0, 50], 300);
        assert_eq!(
            events,
            vec![(0, NoteEvent::On), (50, NoteEvent::On), (150, NoteEvent::Off)]
        );
        assert!(!key.is_pressed());
    }

    #[test]
    fn test_retap_ignore() {
        let (key, events) = run_taps(RetapPolicy::Ignore, &[0, 50], 300);
        assert_eq!(events, vec![(0, NoteEvent::On), (100, NoteEvent::Off)]);
        assert!(!key.is_pressed());
    }

    #[test]
    fn test_retap_always_ends_released() {
        for policy in [RetapPolicy::Retrigger, RetapPolicy::CancelOnRetap] {
            let (key, events) = run_taps(policy, &[0, 30, 60, 90], 500);
            let ons = events.iter().filter(|(_, e)| *e == NoteEvent::On).count();
            let offs = events.iter().filter(|(_, e)| *e == NoteEvent::Off).count();
            assert!(ons >= 2, "{:?}", policy);
            assert!(offs >= 1, "{:?}", policy);
            assert!(!key.is_pressed());
        }
    }

    #[test]
    fn test_tap_after_release_is_fresh() {
        let (_, events) = run_taps(RetapPolicy::Retrigger, &[0, 200], 400);
        assert_eq!(
            events,
            vec![
                (0, NoteEvent::On),
                (100, NoteEvent::Off),
                (200, NoteEvent::On),
                (300, NoteEvent::Off)
            ]
        );
    }

    #[test]
    fn test_unknown_timer_is_ignored() {
        let mut key = tap_key(RetapPolicy::Retrigger);
        let mut sched = ManualScheduler::new();
        key.on_tap(&mut sched);

        // Armed on the same scheduler by someone else
        let foreign = sched.schedule_after(Duration::ZERO);
        assert_eq!(key.on_release_timer(foreign), None);
        assert!(key.is_pressed());
        assert_eq!(key.pending_releases().len(), 1);
    }

    #[test]
    fn test_release_forgets_timers() {
        let mut key = tap_key(RetapPolicy::Retrigger);
        let mut sched = ManualScheduler::new();
        key.on_tap(&mut sched);

        assert_eq!(key.release(), Some(NoteEvent::Off));
        assert_eq!(key.release(), None);
        for token in sched.advance(Duration::from_secs(1)) {
            assert_eq!(key.on_release_timer(token), None);
        }
    }

    #[test]
    fn test_external_activation_color() {
        let haptics = RecordingHaptics::new();
        let mut key = sliding_key(&haptics);
        assert_eq!(key.current_color(), KeyColor::WhiteIdle);
        assert_eq!(key.text_color(), KeyColor::BlackIdle);

        key.set_activated_externally(true);
        assert_eq!(key.current_color(), KeyColor::WhitePressed);
        assert!(!key.is_pressed());

        key.set_activated_externally(false);
        key.set_activated(true);
        assert_eq!(key.current_color(), KeyColor::WhitePressed);
    }

    #[test]
    fn test_retap_policy_names() {
        assert_eq!("cancel-on-retap".parse::<RetapPolicy>().unwrap(), RetapPolicy::CancelOnRetap);
        assert_eq!("ignore".parse::<RetapPolicy>().unwrap(), RetapPolicy::Ignore);
        assert!("sometimes".parse::<RetapPolicy>().is_err());
    }
}
