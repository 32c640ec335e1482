//! Configuration file support for keyboard-key
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/keyboard-key/config.toml`
//! - macOS: `~/Library/Application Support/keyboard-key/config.toml`
//! - Windows: `%APPDATA%\keyboard-key\config.toml`

use crate::color::KeyColor;
use crate::controller::{KeySettings, RetapPolicy, DEFAULT_TAP_RELEASE_MS};
use crate::error::{Error, Result};
use crate::geometry::{Alignment, KeyMetrics, Size};
use crate::haptics::HapticStrength;
use crate::keyboard::{KeyboardSettings, C3_MIDI};
use crate::label::LabelMode;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-key behavior
    pub key: KeyConfig,
    /// Keyboard range
    pub keyboard: KeyboardConfig,
    /// UI/Theme configuration
    pub theme: Theme,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "keyboard-key") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::write_default_config_file(&path)?;
        Ok(path)
    }

    /// Write the commented default config to `path`
    pub fn write_default_config_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = r#"# keyboard-key configuration file

[key]
# Label on each key: "none", "letters_white", "letters_black", "letters_all",
# "letters_white_with_octave", "letters_black_with_octave",
# "letters_all_with_octave", "only_c", "only_middle_c", "only_do",
# "only_middle_c_do" or "solfege"
label_mode = "only_middle_c"

# Haptic feedback on note on
haptics = true
# "light", "medium", "heavy", "soft" or "rigid"
haptics_strength = "medium"

# true: drag across keys to play them
# false: click to play, released automatically after tap_release_ms
allow_sliding = true
tap_release_ms = 100

# Tap on a key that is still sounding: "retrigger", "cancel_on_retap" or "ignore"
retap_policy = "retrigger"

[keyboard]
# Lowest MIDI note (48 = C3)
lowest_note = 48
# Number of keys
key_count = 25

[theme]
# Colors for the keyboard display
white_key_color = "white"
black_key_color = "black"
white_pressed_color = "red"
black_pressed_color = "red"
border_color = "cyan"

# Outline drawn around every key; 0 disables it
key_border_width = 0.0
key_border_color = "black"
# Square off the anchored edge of each key instead of rounding it
flat_top = false
# Edge the labels sit on: "bottom" or "trailing"
alignment = "bottom"

# Show keyboard shortcuts help
show_help = true
"#;

        fs::write(path, content)?;
        Ok(())
    }

    /// Per-key settings for the controller
    pub fn to_key_settings(&self) -> KeySettings {
        KeySettings {
            label_mode: self.key.label_mode,
            text: None,
            haptics_enabled: self.key.haptics,
            haptics_strength: self.key.haptics_strength,
            allow_sliding: self.key.allow_sliding,
            tap_release_time: Duration::from_millis(self.key.tap_release_ms),
            retap_policy: self.key.retap_policy,
            is_activated_externally: false,
        }
    }

    /// Range settings for the keyboard
    pub fn to_keyboard_settings(&self) -> KeyboardSettings {
        KeyboardSettings {
            lowest_note: self.keyboard.lowest_note.min(127),
            key_count: self.keyboard.key_count.max(1),
        }
    }
}

/// Per-key behavior settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Label convention
    pub label_mode: LabelMode,
    /// Haptic feedback on note on
    pub haptics: bool,
    /// Haptic pulse strength
    pub haptics_strength: HapticStrength,
    /// Sliding mode (true) or tap mode (false)
    pub allow_sliding: bool,
    /// Tap-mode auto release in milliseconds
    pub tap_release_ms: u64,
    /// Tap on a held key
    pub retap_policy: RetapPolicy,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            label_mode: LabelMode::OnlyMiddleC,
            haptics: true,
            haptics_strength: HapticStrength::Medium,
            allow_sliding: true,
            tap_release_ms: DEFAULT_TAP_RELEASE_MS,
            retap_policy: RetapPolicy::Retrigger,
        }
    }
}

/// Keyboard range settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Lowest MIDI note (48 = C3)
    pub lowest_note: u8,
    /// Number of keys
    pub key_count: u8,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            lowest_note: C3_MIDI,
            key_count: 25,
        }
    }
}

/// Theme/UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// White key color
    pub white_key_color: String,
    /// Black key color
    pub black_key_color: String,
    /// Pressed white key color
    pub white_pressed_color: String,
    /// Pressed black key color
    pub black_pressed_color: String,
    /// Border color
    pub border_color: String,
    /// Outline width around every key (cells); 0 disables it
    pub key_border_width: f32,
    /// Outline color around every key
    pub key_border_color: String,
    /// Square off the anchored edge of each key
    pub flat_top: bool,
    /// Edge the key labels sit on
    pub alignment: Alignment,
    /// Show help text
    pub show_help: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            white_key_color: "white".to_string(),
            black_key_color: "black".to_string(),
            white_pressed_color: "red".to_string(),
            black_pressed_color: "red".to_string(),
            border_color: "cyan".to_string(),
            key_border_width: 0.0,
            key_border_color: "black".to_string(),
            flat_top: false,
            alignment: Alignment::Bottom,
            show_help: true,
        }
    }
}

impl Theme {
    /// Parse a color string to ratatui Color
    pub fn parse_color(s: &str) -> ratatui::style::Color {
        use ratatui::style::Color;
        match s.to_lowercase().as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "gray" | "grey" => Color::Gray,
            "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
            "light_red" | "lightred" => Color::LightRed,
            "light_green" | "lightgreen" => Color::LightGreen,
            "light_yellow" | "lightyellow" => Color::LightYellow,
            "light_blue" | "lightblue" => Color::LightBlue,
            "light_magenta" | "lightmagenta" => Color::LightMagenta,
            "light_cyan" | "lightcyan" => Color::LightCyan,
            "white" => Color::White,
            // Try parsing as RGB hex
            s if s.starts_with('#') && s.len() == 7 && s.is_ascii() => {
                if let (Ok(r), Ok(g), Ok(b)) = (
                    u8::from_str_radix(&s[1..3], 16),
                    u8::from_str_radix(&s[3..5], 16),
                    u8::from_str_radix(&s[5..7], 16),
                ) {
                    Color::Rgb(r, g, b)
                } else {
                    log::warn!("Invalid hex color {:?}, using white", s);
                    Color::White
                }
            }
            other => {
                log::warn!("Unknown color {:?}, using white", other);
                Color::White
            }
        }
    }

    /// Resolve a key color slot
    pub fn key_color(&self, slot: KeyColor) -> ratatui::style::Color {
        let name = match slot {
            KeyColor::WhiteIdle => &self.white_key_color,
            KeyColor::WhitePressed => &self.white_pressed_color,
            KeyColor::BlackIdle => &self.black_key_color,
            KeyColor::BlackPressed => &self.black_pressed_color,
        };
        Self::parse_color(name)
    }

    /// Get border color
    pub fn border(&self) -> ratatui::style::Color {
        Self::parse_color(&self.border_color)
    }

    /// Get the per-key outline color
    pub fn key_border(&self) -> ratatui::style::Color {
        Self::parse_color(&self.key_border_color)
    }

    /// Drawing metrics for a key of `size` in this theme
    pub fn key_metrics(&self, size: Size, is_white: bool) -> KeyMetrics {
        KeyMetrics::new(size, self.flat_top, self.alignment, is_white)
            .with_border_width(self.key_border_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.keyboard.lowest_note, 48);
        assert_eq!(config.key.tap_release_ms, 100);
        assert_eq!(config.key.label_mode, LabelMode::OnlyMiddleC);
        assert!(config.key.allow_sliding);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.key.retap_policy = RetapPolicy::CancelOnRetap;
        config.key.label_mode = LabelMode::LettersAllWithOctave;
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[key]\nallow_sliding = false\n").unwrap();
        assert!(!parsed.key.allow_sliding);
        assert_eq!(parsed.key.tap_release_ms, DEFAULT_TAP_RELEASE_MS);
        assert_eq!(parsed.theme, Theme::default());
    }

    #[test]
    fn test_default_config_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::write_default_config_file(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.keyboard.key_count = 13;
        config.key.haptics_strength = HapticStrength::Heavy;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[key]\nlabel_mode = \"sideways\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_to_key_settings() {
        let mut config = Config::default();
        config.key.tap_release_ms = 250;
        config.key.allow_sliding = false;
        let settings = config.to_key_settings();
        assert_eq!(settings.tap_release_time, Duration::from_millis(250));
        assert!(!settings.allow_sliding);
        assert_eq!(settings.label_mode, LabelMode::OnlyMiddleC);
    }

    #[test]
    fn test_color_parsing() {
        use ratatui::style::Color;
        assert_eq!(Theme::parse_color("cyan"), Color::Cyan);
        assert_eq!(Theme::parse_color("white"), Color::White);
        assert_eq!(Theme::parse_color("#ff0000"), Color::Rgb(255, 0, 0));
        assert_eq!(Theme::parse_color("#zz0000"), Color::White);
    }

    #[test]
    fn test_theme_key_shape() {
        let parsed: Config = toml::from_str(
            "[theme]\nflat_top = true\nalignment = \"trailing\"\nkey_border_width = 1.0\n",
        )
        .unwrap();
        let metrics = parsed.theme.key_metrics(Size::new(10.0, 40.0), true);
        assert!(metrics.flat_top);
        assert_eq!(metrics.alignment, Alignment::Trailing);
        assert_eq!(metrics.border_width, 1.0);
        assert_eq!(parsed.theme.key_border(), ratatui::style::Color::Black);

        let defaults = Theme::default().key_metrics(Size::new(10.0, 40.0), false);
        assert!(!defaults.flat_top && !defaults.has_border());
    }

    #[test]
    fn test_theme_slots() {
        use ratatui::style::Color;
        let theme = Theme::default();
        assert_eq!(theme.key_color(KeyColor::WhiteIdle), Color::White);
        assert_eq!(theme.key_color(KeyColor::BlackIdle), Color::Black);
        assert_eq!(theme.key_color(KeyColor::BlackPressed), Color::Red);
    }
}
