//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use stackfall::PieceKind;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// UI colours plus an optional piece palette replacing the catalog colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours by id - 1; None uses `PieceKind::color`.
    pub pieces: Option<[Color; 11]>,
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and the greyed-out stack after game over.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// Saturated colours for dark backgrounds.
const HIGH_CONTRAST: [&str; 11] = [
    "#FFFFFF", "#FFFF00", "#FF8800", "#0088FF", "#00FFFF", "#00FF00", "#FF0000", "#FF00FF",
    "#AA6633", "#88FF00", "#CCCCCC",
];

/// Paul Tol's bright/vibrant sets; avoids red/green pairs.
const COLORBLIND: [&str; 11] = [
    "#BBBBBB", "#CCBB44", "#EE7733", "#0077BB", "#33BBEE", "#009988", "#CC3311", "#EE3377",
    "#AA3377", "#66CCEE", "#DDDDDD",
];

impl Theme {
    /// One Dark UI colours with the catalog piece colours.
    pub fn onedark_default() -> Self {
        Self {
            pieces: None,
            bg: Color::Rgb(0x31, 0x35, 0x3F),          // meter_bg
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),    // div_line
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),     // main_fg
            title: Color::Rgb(0xE5, 0xC0, 0x7B),       // title
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70), // inactive_fg
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        let table = match palette {
            crate::Palette::Normal => return,
            crate::Palette::HighContrast => &HIGH_CONTRAST,
            crate::Palette::Colorblind => &COLORBLIND,
        };
        let mut pieces = [Color::Reset; 11];
        for (slot, hex) in pieces.iter_mut().zip(table) {
            *slot = parse_hex(hex).unwrap_or(Color::White);
        }
        self.pieces = Some(pieces);
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::onedark_default();
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        Self {
            pieces: None,
            bg: get("meter_bg", defaults.bg),
            div_line: get("div_line", defaults.div_line),
            main_fg: get("main_fg", defaults.main_fg),
            title: get("title", defaults.title),
            inactive_fg: get("inactive_fg", defaults.inactive_fg),
        }
    }

    #[inline]
    pub fn piece_color(&self, kind: PieceKind) -> Color {
        match &self.pieces {
            Some(p) => p[(kind.id() - 1) as usize],
            None => kind.color(),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    match s.len() {
        6 if s.is_ascii() => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 if s.is_ascii() => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(ThemeError::InvalidHex(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_junk() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_and_falls_back() {
        let map = parse_theme_file("# comment\ntheme[title]='#FF0000'\ntheme[main_fg]=\"nope\"\n");
        let t = Theme::from_map(&map);
        assert_eq!(t.title, Color::Rgb(255, 0, 0));
        assert_eq!(t.main_fg, Theme::onedark_default().main_fg);
    }

    #[test]
    fn test_palettes_cover_every_piece() {
        let mut t = Theme::default();
        assert_eq!(t.piece_color(PieceKind::I), PieceKind::I.color());
        t.apply_palette(crate::Palette::Colorblind);
        assert_eq!(t.piece_color(PieceKind::J), Color::Rgb(0x00, 0x77, 0xBB));
        t.apply_palette(crate::Palette::HighContrast);
        assert_eq!(t.piece_color(PieceKind::X), Color::Rgb(0xCC, 0xCC, 0xCC));
    }
}
