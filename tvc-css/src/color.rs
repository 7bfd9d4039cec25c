use crate::ToTlLiteral;
use std::fmt;

/// u8-based RGBA color, range 0 to 255 (mirrors `azul_css::ColorU`).
///
/// The target dialect has no native color literal, so colors are always
/// printed as a `0xRRGGBBAA` hex integer — the scene-graph's accepted
/// representation for `color=`/`backgroundColor=` attributes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses a CSS color: named colors, `#rgb`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(...)`, `rgba(...)`. Returns `None` for anything unrecognized —
    /// the caller (tvc-style) is responsible for passing unknown strings
    /// through verbatim per spec §4.3.4.
    pub fn parse(input: &str) -> Option<Color> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if let Some(inner) = input.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
            return Self::parse_rgb_components(inner, true);
        }
        if let Some(inner) = input.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            return Self::parse_rgb_components(inner, false);
        }
        named_color(input)
    }

    fn parse_hex(hex: &str) -> Option<Color> {
        let expand = |c: char| -> Option<u8> {
            let s: String = [c, c].iter().collect();
            u8::from_str_radix(&s, 16).ok()
        };
        match hex.len() {
            3 => {
                let mut chars = hex.chars();
                let r = expand(chars.next()?)?;
                let g = expand(chars.next()?)?;
                let b = expand(chars.next()?)?;
                Some(Color::rgb(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::rgb(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    fn parse_rgb_components(inner: &str, has_alpha: bool) -> Option<Color> {
        let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
        let need = if has_alpha { 4 } else { 3 };
        if parts.len() != need {
            return None;
        }
        let byte = |s: &str| -> Option<u8> { s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) as u8) };
        let r = byte(parts[0])?;
        let g = byte(parts[1])?;
        let b = byte(parts[2])?;
        let a = if has_alpha {
            let f: f32 = parts[3].parse().ok()?;
            (f.clamp(0.0, 1.0) * 255.0) as u8
        } else {
            255
        };
        Some(Color::rgba(r, g, b, a))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

impl ToTlLiteral for Color {
    fn to_tl_literal(&self) -> String {
        self.to_string()
    }
}

fn named_color(name: &str) -> Option<Color> {
    Some(match name {
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(255, 255, 255),
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "transparent" => Color::rgba(0, 0, 0, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "silver" => Color::rgb(192, 192, 192),
        "navy" => Color::rgb(0, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "maroon" => Color::rgb(128, 0, 0),
        "lime" => Color::rgb(0, 255, 0),
        "olive" => Color::rgb(128, 128, 0),
        "aqua" | "cyan" => Color::rgb(0, 255, 255),
        "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#ff000080"), Some(Color::rgba(255, 0, 0, 0x80)));
    }

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(Color::parse("rgb(0, 128, 255)"), Some(Color::rgb(0, 128, 255)));
        assert_eq!(Color::parse("rgba(0, 128, 255, 0.5)"), Some(Color::rgba(0, 128, 255, 127)));
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(Color::parse("red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("not-a-color"), None);
    }

    #[test]
    fn formats_as_0xrrggbbaa() {
        assert_eq!(Color::rgb(255, 0, 0).to_string(), "0xFF0000FF");
        assert_eq!(Color::rgba(0, 0, 0, 0).to_string(), "0x00000000");
    }
}
