//! Resolved visual style
//!
//! Every element starts from the default stylesheet and may override single
//! properties through its inline `style` attribute. There are no selectors
//! and nothing cascades from parent to child.

use log::debug;

/// Name of the face compiled into the binary, used when neither the
/// document nor the command line names a font file.
pub const DEFAULT_FONT: &str = "DejaVuSans";

pub const DEFAULT_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_FONT_COLOR: Color = Color::from_rgb(0x66, 0x66, 0x66);
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::from_rgb(0x4B, 0x4B, 0x4B);
pub const DEFAULT_BORDER_COLOR: Color = Color::from_rgb(0x66, 0x66, 0x66);

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// Parses `#RGB`, `#RGBA`, `#RRGGBB` and `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color { r, g, b, a })
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color { r, g, b, a: 255 })
            }
            4 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                let a = u8::from_str_radix(&hex[3..4], 16).ok()? * 17;
                Some(Color { r, g, b, a })
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Color { r, g, b, a: 255 })
            }
            _ => None,
        }
    }

    /// Packed `0RGB`, the pixel format of the canvas.
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn parse(s: &str) -> Option<Align> {
        match s {
            "left" => Some(Align::Left),
            "right" => Some(Align::Right),
            "center" => Some(Align::Center),
            _ => None,
        }
    }

    /// Horizontal anchor fraction for `draw_text_anchored`.
    pub fn anchor(self) -> f32 {
        match self {
            Align::Left => 0.0,
            Align::Center => 0.5,
            Align::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub width: f32,
    pub height: f32,
    pub font_family: String,
    pub font_size: f32,
    pub font_color: Color,
    pub text_align: Align,
    pub background_color: Color,
    pub hover_color: Color,
    pub border_color: Color,
    pub border_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Style::with_font(DEFAULT_FONT)
    }
}

impl Style {
    /// Default stylesheet using the given font file.
    pub fn with_font(font_family: &str) -> Self {
        Self {
            width: 0.0,
            height: 35.0,
            font_family: font_family.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR,
            text_align: Align::Center,
            background_color: DEFAULT_BACKGROUND_COLOR,
            hover_color: DEFAULT_BACKGROUND_COLOR,
            border_color: DEFAULT_BORDER_COLOR,
            border_width: 1.0,
        }
    }

    /// Applies inline declarations (`key: value; key: value`).
    ///
    /// Unknown keys and tokens without a `:` are ignored. Numbers that fail
    /// to parse become zero; colors that fail to parse leave the property
    /// unchanged.
    pub fn apply_inline(&mut self, declarations: &str) {
        for decl in declarations.split(';') {
            let Some((key, value)) = decl.split_once(':') else {
                if !decl.trim().is_empty() {
                    debug!("ignoring style token without a value: {:?}", decl.trim());
                }
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "background-color" => set_color(&mut self.background_color, key, value),
                "font-color" => set_color(&mut self.font_color, key, value),
                "hover-color" => set_color(&mut self.hover_color, key, value),
                "border-color" => set_color(&mut self.border_color, key, value),
                "font-size" => self.font_size = lenient_f32(value),
                "border-width" => self.border_width = lenient_f32(value),
                "width" => self.width = lenient_f32(value),
                "height" => self.height = lenient_f32(value),
                "font-family" => self.font_family = value.trim_matches(|c| c == '"' || c == '\'').to_string(),
                "text-align" => match Align::parse(value) {
                    Some(align) => self.text_align = align,
                    None => debug!("unknown text-align {:?}", value),
                },
                _ => debug!("ignoring unknown style property {:?}", key),
            }
        }
    }
}

fn set_color(slot: &mut Color, key: &str, value: &str) {
    match Color::from_hex(value) {
        Some(c) => *slot = c,
        None => debug!("unparsable color for {}: {:?}", key, value),
    }
}

/// Parses a decimal, tolerating a trailing `px`. Anything else is zero.
pub fn lenient_f32(value: &str) -> f32 {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.trim().parse::<f32>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}
