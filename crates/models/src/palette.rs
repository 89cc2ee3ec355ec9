use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// An RGB colour with channels in `[0, 1]`
pub type Rgb = (f64, f64, f64);

/// Control points of the diverging blue-white-red map, evenly spaced over `[0, 1]`
const SEISMIC: [Rgb; 5] = [
    (0.0, 0.0, 0.3),
    (0.0, 0.0, 1.0),
    (1.0, 1.0, 1.0),
    (1.0, 0.0, 0.0),
    (0.5, 0.0, 0.0),
];

/// Qualitative eight-colour map
const DARK2: [Rgb; 8] = [
    (0.105_882_352_9, 0.619_607_843_1, 0.466_666_666_7),
    (0.850_980_392_2, 0.372_549_019_6, 0.007_843_137_3),
    (0.458_823_529_4, 0.439_215_686_3, 0.701_960_784_3),
    (0.905_882_352_9, 0.160_784_313_7, 0.541_176_470_6),
    (0.400_000_000_0, 0.650_980_392_2, 0.117_647_058_8),
    (0.901_960_784_3, 0.670_588_235_3, 0.007_843_137_3),
    (0.650_980_392_2, 0.462_745_098_0, 0.113_725_490_2),
    (0.400_000_000_0, 0.400_000_000_0, 0.400_000_000_0),
];

/// Colour maps available for subject colouring
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Palette {
    /// Interpolated blue-white-red
    #[default]
    Seismic,
    /// Listed, eight distinct colours
    Dark2,
}

impl Palette {
    pub fn all() -> Vec<Palette> {
        Palette::iter().collect()
    }

    /// Colour at position `x`, clamped to `[0, 1]`
    pub fn sample(&self, x: f64) -> Rgb {
        let x = x.clamp(0.0, 1.0);

        match self {
            Palette::Seismic => interpolate(&SEISMIC, x),
            Palette::Dark2 => {
                let idx = ((x * DARK2.len() as f64) as usize).min(DARK2.len() - 1);
                DARK2[idx]
            }
        }
    }

    /// `n` hex colours sampled at evenly spaced positions from 0 to 1
    ///
    /// A single colour is the last one of an interpolated map and the first
    /// one of a listed map.
    pub fn evenly_spaced(&self, n: usize) -> Vec<String> {
        (0..n)
            .map(|i| {
                let x = match (self, n) {
                    (Palette::Seismic, 1) => 1.0,
                    (Palette::Dark2, 1) => 0.0,
                    _ => i as f64 / (n - 1) as f64,
                };
                to_hex(self.sample(x))
            })
            .collect()
    }
}

/// Linear interpolation between evenly spaced control points
fn interpolate(points: &[Rgb], x: f64) -> Rgb {
    let segments = (points.len() - 1) as f64;
    let scaled = x * segments;
    let idx = (scaled.floor() as usize).min(points.len() - 2);
    let t = scaled - idx as f64;

    let (r0, g0, b0) = points[idx];
    let (r1, g1, b1) = points[idx + 1];

    (r0 + (r1 - r0) * t, g0 + (g1 - g0) * t, b0 + (b1 - b0) * t)
}

/// Formats a colour as `#rrggbb`
pub fn to_hex((r, g, b): Rgb) -> String {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round_ties_even() as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}
