//! A row of piano keys
//!
//! [`Keyboard`] owns one [`KeyGestureController`] per MIDI note in a
//! contiguous range, lays the keys out inside a rectangle and routes input
//! to them. Black keys sit on top of white keys, so a pointer over a black
//! key never reaches the white key underneath.

use crate::controller::{KeyGestureController, KeySettings, NoteEvent, PointerPhase};
use crate::geometry::{Point, Rect};
use crate::haptics::HapticSink;
use crate::pitch::Pitch;
use crate::scheduler::{Scheduler, TimerToken};
use std::collections::HashMap;

/// MIDI note number for C3
pub const C3_MIDI: u8 = 48;

/// Black key width relative to a white key
pub const BLACK_WIDTH_RATIO: f32 = 0.6;

/// Black key height relative to the keyboard height
pub const BLACK_HEIGHT_RATIO: f32 = 0.6;

/// Location no key contains; sent to keys the pointer is not over
const NOWHERE: Point = Point { x: f32::NAN, y: f32::NAN };

/// Keyboard range settings
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardSettings {
    /// Lowest MIDI note on the keyboard
    pub lowest_note: u8,
    /// Number of keys (semitones)
    pub key_count: u8,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        Self {
            lowest_note: C3_MIDI,
            // Two octaves plus the closing C
            key_count: 25,
        }
    }
}

impl KeyboardSettings {
    /// Highest MIDI note, clamped to 127
    pub fn highest_note(&self) -> u8 {
        let highest = self.lowest_note as u16 + self.key_count.max(1) as u16 - 1;
        highest.min(127) as u8
    }
}

type HapticsFactory = Box<dyn FnMut(&Pitch) -> Box<dyn HapticSink>>;

/// Piano keyboard state
pub struct Keyboard {
    settings: KeyboardSettings,
    key_settings: KeySettings,
    keys: Vec<KeyGestureController>,
    /// Release timers → index of the key that armed them
    timers: HashMap<TimerToken, usize>,
    haptics: HapticsFactory,
    area: Option<Rect>,
}

impl Keyboard {
    /// Create a keyboard; `haptics` builds the haptic sink for each key
    pub fn new(
        settings: KeyboardSettings,
        key_settings: KeySettings,
        haptics: impl FnMut(&Pitch) -> Box<dyn HapticSink> + 'static,
    ) -> Self {
        let mut keyboard = Self {
            settings,
            key_settings,
            keys: Vec::new(),
            timers: HashMap::new(),
            haptics: Box::new(haptics),
            area: None,
        };
        keyboard.build_keys();
        keyboard
    }

    fn build_keys(&mut self) {
        let range = self.settings.lowest_note..=self.settings.highest_note();
        self.keys = range
            .map(|note| {
                let pitch = Pitch::from_midi(note);
                let sink = (self.haptics)(&pitch);
                KeyGestureController::new(pitch, self.key_settings.clone(), sink)
            })
            .collect();
        self.timers.clear();
        if let Some(area) = self.area {
            self.layout(area);
        }
    }

    pub fn settings(&self) -> &KeyboardSettings {
        &self.settings
    }

    pub fn key_settings(&self) -> &KeySettings {
        &self.key_settings
    }

    pub fn keys(&self) -> &[KeyGestureController] {
        &self.keys
    }

    pub fn white_keys(&self) -> impl Iterator<Item = &KeyGestureController> {
        self.keys.iter().filter(|k| k.is_white())
    }

    pub fn black_keys(&self) -> impl Iterator<Item = &KeyGestureController> {
        self.keys.iter().filter(|k| !k.is_white())
    }

    /// Find the key for a pitch
    pub fn key(&self, pitch: Pitch) -> Option<&KeyGestureController> {
        self.keys.iter().find(|k| k.pitch() == pitch)
    }

    /// Place every key inside `area` and tell each key its new bounds
    pub fn layout(&mut self, area: Rect) {
        self.area = Some(area);
        let white_count = self.white_keys().count().max(1);
        let white_width = area.width / white_count as f32;
        let black_width = white_width * BLACK_WIDTH_RATIO;
        let black_height = area.height * BLACK_HEIGHT_RATIO;

        // Neighbouring white keys share one edge value, so a glide never
        // crosses a gap between them
        let edge = |index: usize| area.x + index as f32 * white_width;

        let mut white_index = 0usize;
        for key in self.keys.iter_mut() {
            let bounds = if key.is_white() {
                let x = edge(white_index);
                white_index += 1;
                Rect::new(x, area.y, edge(white_index) - x, area.height)
            } else {
                // Straddles the boundary after the previous white key
                let boundary = edge(white_index);
                Rect::new(boundary - black_width / 2.0, area.y, black_width, black_height)
            };
            key.on_geometry_update(bounds);
        }
    }

    /// Index of the topmost key under `location`
    pub fn key_at(&self, location: Point) -> Option<usize> {
        let contains = |k: &KeyGestureController| k.bounds().is_some_and(|b| b.contains(location));
        self.keys
            .iter()
            .position(|k| !k.is_white() && contains(k))
            .or_else(|| self.keys.iter().position(|k| k.is_white() && contains(k)))
    }

    /// Sliding-mode pointer input
    ///
    /// Only the topmost key under the pointer sees the real location, so a
    /// glide releases the previous key and presses the next one.
    pub fn pointer(&mut self, location: Point, phase: PointerPhase) -> Vec<(Pitch, NoteEvent)> {
        let target = match phase {
            PointerPhase::Moved => self.key_at(location),
            PointerPhase::Ended => None,
        };

        let mut events = Vec::new();
        // Releases first, so hosts see off-then-on when gliding
        for (idx, key) in self.keys.iter_mut().enumerate() {
            if Some(idx) != target {
                if let Some(event) = key.on_pointer_event(NOWHERE, phase) {
                    events.push((key.pitch(), event));
                }
            }
        }
        if let Some(idx) = target {
            let key = &mut self.keys[idx];
            if let Some(event) = key.on_pointer_event(location, phase) {
                events.push((key.pitch(), event));
            }
        }
        events
    }

    /// Tap-mode input on the topmost key under `location`
    pub fn tap(
        &mut self,
        location: Point,
        scheduler: &mut dyn Scheduler,
    ) -> Option<(Pitch, NoteEvent)> {
        let idx = self.key_at(location)?;
        let key = &mut self.keys[idx];
        let before: Vec<TimerToken> = key.pending_releases().to_vec();
        let event = key.on_tap(scheduler)?;

        // Track whatever the tap armed; cancelled tokens drop out of the key
        for token in &before {
            if !key.pending_releases().contains(token) {
                self.timers.remove(token);
            }
        }
        for token in key.pending_releases() {
            self.timers.insert(*token, idx);
        }
        Some((key.pitch(), event))
    }

    /// Deliver an elapsed release timer to the key that armed it
    pub fn fire(&mut self, token: TimerToken) -> Option<(Pitch, NoteEvent)> {
        let idx = self.timers.remove(&token)?;
        let key = self.keys.get_mut(idx)?;
        key.on_release_timer(token).map(|event| (key.pitch(), event))
    }

    /// Release every pressed key
    pub fn release_all(&mut self) -> Vec<(Pitch, NoteEvent)> {
        self.timers.clear();
        self.keys
            .iter_mut()
            .filter_map(|key| key.release().map(|event| (key.pitch(), event)))
            .collect()
    }

    /// Pitches currently held down by local input, lowest first
    pub fn pressed_pitches(&self) -> Vec<Pitch> {
        self.keys.iter().filter(|k| k.is_pressed()).map(|k| k.pitch()).collect()
    }

    /// Mark pitches as activated from outside (e.g. incoming MIDI)
    pub fn set_activated_externally(&mut self, pitch: Pitch, activated: bool) {
        if let Some(key) = self.keys.iter_mut().find(|k| k.pitch() == pitch) {
            key.set_activated_externally(activated);
        }
    }

    /// Shift the range up an octave
    /// Returns the note offs for keys that were held
    pub fn octave_up(&mut self) -> Vec<(Pitch, NoteEvent)> {
        self.shift(12)
    }

    /// Shift the range down an octave
    /// Returns the note offs for keys that were held
    pub fn octave_down(&mut self) -> Vec<(Pitch, NoteEvent)> {
        self.shift(-12)
    }

    fn shift(&mut self, semitones: i16) -> Vec<(Pitch, NoteEvent)> {
        let lowest = self.settings.lowest_note as i16 + semitones;
        let highest = self.settings.highest_note() as i16 + semitones;
        if lowest < 0 || highest > 127 {
            return Vec::new();
        }
        let released = self.release_all();
        self.settings.lowest_note = lowest as u8;
        self.build_keys();
        released
    }

    /// Display name of the lowest key, e.g. "C3"
    pub fn octave_name(&self) -> String {
        Pitch::from_midi(self.settings.lowest_note).to_string()
    }
}
