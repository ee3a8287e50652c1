use ratatui::style::Color;

use crate::model::UiConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    /// Background of the inline editor
    pub editor_bg: Color,
    /// Mouse hover row in an open dropdown
    pub hover_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            blue: Color::Rgb(0x44, 0x88, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            editor_bg: Color::Rgb(0x1E, 0x10, 0x33),
            hover_bg: Color::Rgb(0x2A, 0x1A, 0x44),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the UI config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            if let Some(color) = parse_hex_color(value)
                && let Some(slot) = theme.slot_mut(key)
            {
                *slot = color;
            }
        }

        theme
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        let slot = match name {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "highlight" => &mut self.highlight,
            "dim" => &mut self.dim,
            "red" => &mut self.red,
            "yellow" => &mut self.yellow,
            "green" => &mut self.green,
            "cyan" => &mut self.cyan,
            "purple" => &mut self.purple,
            "blue" => &mut self.blue,
            "selection_bg" => &mut self.selection_bg,
            "selection_border" => &mut self.selection_border,
            "editor_bg" => &mut self.editor_bg,
            "hover_bg" => &mut self.hover_bg,
            _ => return None,
        };
        Some(slot)
    }

    /// Resolve an option color hint: a theme color name or `#RRGGBB`
    pub fn hint_color(&self, hint: &str) -> Option<Color> {
        if hint.starts_with('#') {
            return parse_hex_color(hint);
        }
        let color = match hint {
            "red" => self.red,
            "yellow" => self.yellow,
            "green" => self.green,
            "cyan" => self.cyan,
            "purple" => self.purple,
            "blue" => self.blue,
            "dim" => self.dim,
            "highlight" => self.highlight,
            _ => return None,
        };
        Some(color)
    }
}
