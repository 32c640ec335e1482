//! Color slot resolution
//!
//! A key never stores its color. The renderer derives one of four named
//! slots from the key's visual state and looks the slot up in its palette
//! (see [`crate::config::Theme`]).

/// Named color slot for drawing a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyColor {
    WhiteIdle,
    WhitePressed,
    BlackIdle,
    BlackPressed,
}

/// Inputs to color resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyVisualState {
    pub is_white: bool,
    /// Local gesture state
    pub is_pressed: bool,
    /// Host-driven "down" state
    pub is_activated: bool,
    /// Forced by a source outside local input, e.g. incoming MIDI
    pub is_activated_externally: bool,
}

impl KeyVisualState {
    /// Whether the key should be drawn down
    pub fn shows_pressed(&self) -> bool {
        self.is_pressed || self.is_activated || self.is_activated_externally
    }

    /// Fill color slot
    pub fn key_color(&self) -> KeyColor {
        match (self.is_white, self.shows_pressed()) {
            (true, false) => KeyColor::WhiteIdle,
            (true, true) => KeyColor::WhitePressed,
            (false, false) => KeyColor::BlackIdle,
            (false, true) => KeyColor::BlackPressed,
        }
    }

    /// Label color slot: the idle color of the opposite key kind
    pub fn text_color(&self) -> KeyColor {
        if self.is_white {
            KeyColor::BlackIdle
        } else {
            KeyColor::WhiteIdle
        }
    }
}
