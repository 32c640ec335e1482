//! TUI rendering for the keyboard
//!
//! Keys are painted from the bounds their controllers hold, so the hit
//! testing in [`crate::keyboard`] and the picture on screen always agree.
//! Terminal cells are the coordinate unit.

use crate::config::Theme;
use crate::controller::KeyGestureController;
use crate::geometry::{Alignment, Rect as KeyRect};
use crate::keyboard::Keyboard;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Rows below the keys used for the status and help lines
const STATUS_ROWS: u16 = 2;

/// Keyboard widget for rendering in ratatui
pub struct KeyboardWidget<'a> {
    keyboard: &'a Keyboard,
    theme: &'a Theme,
}

impl<'a> KeyboardWidget<'a> {
    /// Create a new keyboard widget
    pub fn new(keyboard: &'a Keyboard, theme: &'a Theme) -> Self {
        Self { keyboard, theme }
    }
}

impl Widget for KeyboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // White keys first so black keys paint over them
        for key in self.keyboard.white_keys().chain(self.keyboard.black_keys()) {
            render_key(buf, area, key, self.theme);
        }
    }
}

/// Convert a terminal area to key-space bounds
pub fn to_key_rect(area: Rect) -> KeyRect {
    KeyRect::new(area.x as f32, area.y as f32, area.width as f32, area.height as f32)
}

/// Area inside the border that keys are laid out in
pub fn keys_area(area: Rect) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    Rect {
        height: inner.height.saturating_sub(STATUS_ROWS),
        ..inner
    }
}

fn render_key(buf: &mut Buffer, clip: Rect, key: &KeyGestureController, theme: &Theme) {
    let Some(bounds) = key.bounds() else {
        return;
    };
    let metrics = theme.key_metrics(bounds.size(), key.is_white());

    // Sub-cell paddings never drop a whole column or row
    let fill = metrics.fill_rect(bounds);
    let x0 = fill.x.floor().max(clip.x as f32) as u16;
    let x1 = fill.max_x().ceil().min(clip.right() as f32) as u16;
    let y0 = fill.y.floor().max(clip.y as f32) as u16;
    let y1 = fill.max_y().ceil().min(clip.bottom() as f32) as u16;
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let fill_style = Style::default().bg(theme.key_color(key.current_color()));
    let width = (x1 - x0) as usize;
    for y in y0..y1 {
        buf.set_string(x0, y, " ".repeat(width), fill_style);
    }

    // Whole cells covered by the outline band
    let band = metrics.border_width.round() as u16;
    if band > 0 {
        let outline = Style::default().bg(theme.key_border());
        for y in y0..y1 {
            for x in x0..x1 {
                let on_band = x < x0 + band || x + band >= x1 || y < y0 + band || y + band >= y1;
                if on_band {
                    buf.set_string(x, y, " ", outline);
                }
            }
        }
    } else if key.is_white() && width > 1 {
        // Hairline between neighbouring white keys
        for y in y0..y1 {
            buf.set_string(x1 - 1, y, "▕", fill_style.fg(Color::DarkGray));
        }
    }

    let label = key.current_label();
    if label.is_empty() {
        return;
    }
    let padding = metrics.text_padding().round() as u16 + band;
    let label_width = label.chars().count() as u16;
    let (label_x, label_y) = match metrics.alignment {
        Alignment::Bottom => (
            x0 + (x1 - x0).saturating_sub(label_width) / 2,
            y1.saturating_sub(1 + padding).max(y0),
        ),
        Alignment::Trailing => (
            x1.saturating_sub(label_width + padding).max(x0),
            y0 + (y1 - y0) / 2,
        ),
    };
    let text_style = fill_style
        .fg(theme.key_color(key.text_color()))
        .add_modifier(Modifier::BOLD);
    buf.set_stringn(label_x, label_y, label, (x1 - label_x) as usize, text_style);
}

/// Render the keyboard with border, status line and help
pub fn render_keyboard_standalone(
    frame: &mut Frame,
    area: Rect,
    keyboard: &Keyboard,
    theme: &Theme,
) {
    let mode = if keyboard.key_settings().allow_sliding {
        "drag"
    } else {
        "tap"
    };
    let title = format!(" Piano [{}] ({}) ", keyboard.octave_name(), mode);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border()));
    frame.render_widget(block, area);

    let keys = keys_area(area);
    frame.render_widget(KeyboardWidget::new(keyboard, theme), keys);

    let pressed = keyboard.pressed_pitches();
    let pressed_str = if pressed.is_empty() {
        "-".to_string()
    } else {
        pressed.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ")
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(" Playing: ", Style::default().fg(Color::DarkGray)),
        Span::styled(pressed_str, Style::default().fg(theme.border()).add_modifier(Modifier::BOLD)),
    ])];
    if theme.show_help {
        lines.push(Line::from(vec![
            Span::styled(" <> ", Style::default().fg(Color::White)),
            Span::styled("oct  ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc ", Style::default().fg(Color::White)),
            Span::styled("quit", Style::default().fg(Color::DarkGray)),
        ]));
    }

    let status = Rect {
        y: keys.bottom(),
        height: STATUS_ROWS.min(area.bottom().saturating_sub(keys.bottom())),
        ..keys
    };
    frame.render_widget(Paragraph::new(lines), status);
}
