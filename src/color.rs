use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use esim_dashboard::DimValue;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Sequential scale: numeric value → Color32
// ---------------------------------------------------------------------------

/// Light-to-dark blue scale for "colour by value" charts and the country map.
#[derive(Debug, Clone, Copy)]
pub struct BlueScale {
    min: f64,
    max: f64,
}

impl BlueScale {
    const LIGHT: (u8, u8, u8) = (222, 235, 247);
    const DARK: (u8, u8, u8) = (8, 48, 107);

    /// Scale spanning the given values. Empty input gives a degenerate scale.
    pub fn over(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min.is_finite() && max.is_finite() {
            BlueScale { min, max }
        } else {
            BlueScale { min: 0.0, max: 0.0 }
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Position of `value` on the scale, in `[0, 1]`.
    pub fn position(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 1.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let light: LinSrgb = Srgb::from(Self::LIGHT).into_format::<f32>().into_linear();
        let dark: LinSrgb = Srgb::from(Self::DARK).into_format::<f32>().into_linear();
        let mixed: Srgb = Srgb::from_linear(light.mix(dark, self.position(value)));
        to_color32(mixed)
    }

    /// Dark text on light fills, light text on dark fills.
    pub fn text_color_for(&self, value: f64) -> Color32 {
        if self.position(value) > 0.55 {
            Color32::WHITE
        } else {
            Color32::BLACK
        }
    }
}

// ---------------------------------------------------------------------------
// Color mapping: dimension value → Color32
// ---------------------------------------------------------------------------

/// Maps distinct dimension values (pie slices, box groups) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<DimValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(values: &BTreeSet<DimValue>) -> Self {
        let palette = generate_palette(values.len());
        let mapping = values.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &DimValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.to_string(), *c))
            .collect()
    }
}
