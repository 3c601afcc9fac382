use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::CellValue;
use crate::error::{invalid, Result};

/// 8-bit sRGB triple used for every pixel of a figure.
pub type Rgb8 = Srgb<u8>;

// ---------------------------------------------------------------------------
// Named colours
// ---------------------------------------------------------------------------

/// Resolve a CSS/SVG colour name (`"silver"`) or hex code (`"#c0c0c0"`).
pub fn resolve_color(spec: &str) -> Result<Rgb8> {
    let spec = spec.trim();
    if spec.starts_with('#') {
        return match spec.parse::<Rgb8>() {
            Ok(rgb) => Ok(rgb),
            Err(e) => invalid!("bad hex colour '{spec}': {e}"),
        };
    }
    match palette::named::from_str(&spec.to_ascii_lowercase()) {
        Some(rgb) => Ok(rgb),
        None => invalid!("unknown colour name '{spec}'"),
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Frequency ramp: missing ratio → colour
// ---------------------------------------------------------------------------

/// Linear ramp from `low` (no missing cells) to `high` (the largest
/// frequency on the panel), mixed in linear light.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyRamp {
    low: LinSrgb,
    high: LinSrgb,
    max: f64,
}

impl FrequencyRamp {
    pub fn new(low: Rgb8, high: Rgb8, max: f64) -> Self {
        Self {
            low: low.into_format::<f32>().into_linear(),
            high: high.into_format::<f32>().into_linear(),
            max,
        }
    }

    pub fn color_for(&self, frequency: f64) -> Rgb8 {
        let t = if self.max > 0.0 {
            (frequency / self.max).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        let mixed = self.low.mix(self.high, t);
        let rgb: Srgb = Srgb::from_linear(mixed);
        rgb.into_format()
    }
}

// ---------------------------------------------------------------------------
// Group colours: group label → colour
// ---------------------------------------------------------------------------

/// Maps the sorted group labels of one axis to distinct colours.
#[derive(Debug, Clone)]
pub struct GroupColors {
    mapping: BTreeMap<CellValue, Rgb8>,
    default_color: Rgb8,
}

impl GroupColors {
    pub fn new(groups: &[CellValue]) -> Self {
        let mapping = groups
            .iter()
            .cloned()
            .zip(generate_palette(groups.len()))
            .collect();
        GroupColors {
            mapping,
            default_color: palette::named::GRAY,
        }
    }

    pub fn color_for(&self, group: &CellValue) -> Rgb8 {
        self.mapping
            .get(group)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (group label → colour) in group order.
    pub fn legend_entries(&self) -> Vec<(String, Rgb8)> {
        self.mapping
            .iter()
            .map(|(g, c)| (g.to_string(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_hex_codes_resolve() {
        assert_eq!(resolve_color("black").unwrap(), Rgb8::new(0, 0, 0));
        assert_eq!(resolve_color("Silver").unwrap(), Rgb8::new(192, 192, 192));
        assert_eq!(resolve_color("#ff8000").unwrap(), Rgb8::new(255, 128, 0));
        assert!(resolve_color("xkcd:puke").is_err());
        assert!(resolve_color("#zz0000").is_err());
    }

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn ramp_hits_both_ends() {
        let ramp = FrequencyRamp::new(Rgb8::new(255, 255, 255), Rgb8::new(0, 0, 0), 0.5);
        assert_eq!(ramp.color_for(0.0), Rgb8::new(255, 255, 255));
        assert_eq!(ramp.color_for(0.5), Rgb8::new(0, 0, 0));
        assert_eq!(ramp.color_for(0.9), Rgb8::new(0, 0, 0));
    }

    #[test]
    fn flat_ramp_uses_low_colour() {
        let ramp = FrequencyRamp::new(Rgb8::new(10, 20, 30), Rgb8::new(0, 0, 0), 0.0);
        assert_eq!(ramp.color_for(0.0), Rgb8::new(10, 20, 30));
    }

    #[test]
    fn unknown_group_gets_default() {
        let colors = GroupColors::new(&[CellValue::from("A"), CellValue::from("B")]);
        assert_ne!(colors.color_for(&"A".into()), colors.color_for(&"B".into()));
        assert_eq!(colors.color_for(&"Z".into()), palette::named::GRAY);
        assert_eq!(colors.legend_entries()[1].0, "B");
    }
}
