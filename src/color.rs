use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Dashboard colours
// ---------------------------------------------------------------------------

pub const CASUAL_HEX: &str = "#23326A";
pub const REGISTERED_HEX: &str = "#FABB23";
pub const TOTAL_HEX: &str = "#D9D4CE";
pub const HIGHLIGHT_HEX: &str = "#FABB23";
pub const MUTED_HEX: &str = "#D3D3D3";

/// Parse a `#rrggbb` / `#rgb` code, falling back to grey.
pub fn hex(code: &str) -> Color32 {
    match Srgb::<u8>::from_str(code) {
        Ok(c) => Color32::from_rgb(c.red, c.green, c.blue),
        Err(e) => {
            log::warn!("invalid colour code {code:?}: {e}");
            Color32::GRAY
        }
    }
}

/// Bar colours for a ranked chart: the first bar highlighted, the rest muted.
pub fn highlight_palette(n: usize) -> Vec<Color32> {
    let highlight = hex(HIGHLIGHT_HEX);
    let muted = hex(MUTED_HEX);
    (0..n)
        .map(|i| if i == 0 { highlight } else { muted })
        .collect()
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // start at blue so two series read as blue / orange
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of a chart series to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap<K: Ord> {
    mapping: BTreeMap<K, Color32>,
    default_color: Color32,
}

impl<K: Ord + Clone> ColorMap<K> {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a K>) -> Self
    where
        K: 'a,
    {
        let categories: Vec<&K> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .zip(palette)
            .map(|(k, c)| (k.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, key: &K) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hex_codes() {
        assert_eq!(hex("#FABB23"), Color32::from_rgb(0xFA, 0xBB, 0x23));
        assert_eq!(hex("23326a"), Color32::from_rgb(0x23, 0x32, 0x6A));
        assert_eq!(hex("not a colour"), Color32::GRAY);
    }

    #[test]
    fn only_first_bar_is_highlighted() {
        let colors = highlight_palette(4);
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[0], hex(HIGHLIGHT_HEX));
        assert!(colors[1..].iter().all(|&c| c == hex(MUTED_HEX)));
        assert!(highlight_palette(0).is_empty());
    }

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
    }

    #[test]
    fn color_map_falls_back_for_unknown_keys() {
        let keys = ["casual".to_string(), "registered".to_string()];
        let map = ColorMap::new(&keys);
        assert_ne!(map.color_for(&keys[0]), map.color_for(&keys[1]));
        assert_eq!(map.color_for(&"other".to_string()), Color32::GRAY);
    }
}
