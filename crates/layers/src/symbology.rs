use std::fmt;

/// An sRGB color with straight alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
            )),
            3 => {
                let c = |i: usize| channel(digits.get(i..i + 1)?).map(|v| v * 17);
                Some(Self::rgb(c(0)?, c(1)?, c(2)?))
            }
            _ => None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// CSS notation: `#rrggbb` when opaque, `rgba(..)` otherwise.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else if self.a <= 0.0 {
            f.write_str("transparent")
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Five classes ordered low to high, plus the reserved no-data color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Palette {
    pub classes: [Color; 5],
    pub no_data: Color,
}

pub const NO_DATA: Color = Color::rgb(0x6b, 0x72, 0x80);

impl Palette {
    /// Light to dark blues.
    pub const SEQUENTIAL_BLUE: Palette = Palette {
        classes: [
            Color::rgb(0xdb, 0xea, 0xfe),
            Color::rgb(0x93, 0xc5, 0xfd),
            Color::rgb(0x60, 0xa5, 0xfa),
            Color::rgb(0x3b, 0x82, 0xf6),
            Color::rgb(0x1d, 0x4e, 0xd8),
        ],
        no_data: NO_DATA,
    };

    /// Dark navy to pale blue, for dark backgrounds.
    pub const NIGHT_BLUE: Palette = Palette {
        classes: [
            Color::rgb(0x22, 0x33, 0x57),
            Color::rgb(0x2f, 0x4d, 0x7a),
            Color::rgb(0x4d, 0x6f, 0xa0),
            Color::rgb(0x6e, 0x93, 0xc0),
            Color::rgb(0x9f, 0xbb, 0xe0),
        ],
        no_data: NO_DATA,
    };

    /// Deficit (red) to surplus (green).
    pub const DIVERGING_HEADROOM: Palette = Palette {
        classes: [
            Color::rgb(0x7a, 0x1f, 0x1f),
            Color::rgb(0xa1, 0x4a, 0x4a),
            Color::rgb(0xbb, 0xa7, 0xa7),
            Color::rgb(0x6e, 0xa7, 0x8a),
            Color::rgb(0x3c, 0x8f, 0x6a),
        ],
        no_data: NO_DATA,
    };

    /// Color-blind-safe sequential ramp.
    pub const COLORBLIND_BLUES: Palette = Palette {
        classes: [
            Color::rgb(0xf7, 0xfb, 0xff),
            Color::rgb(0xde, 0xeb, 0xf7),
            Color::rgb(0x9e, 0xca, 0xe1),
            Color::rgb(0x31, 0x82, 0xbd),
            Color::rgb(0x08, 0x51, 0x9c),
        ],
        no_data: NO_DATA,
    };
}

impl Default for Palette {
    fn default() -> Self {
        Palette::SEQUENTIAL_BLUE
    }
}

/// Fill and outline of a point marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

impl MarkerStyle {
    pub const fn new(fill: Color, stroke: Color, stroke_width: f32) -> Self {
        Self {
            fill,
            stroke,
            stroke_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Palette};

    #[test]
    fn hex_round_trips_through_css() {
        let c = Color::from_hex("#1d4ed8").expect("valid hex");
        assert_eq!(c, Palette::SEQUENTIAL_BLUE.classes[4]);
        assert_eq!(c.to_string(), "#1d4ed8");
        assert_eq!(Color::from_hex("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::from_hex("1d4ed8"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn translucent_colors_use_rgba() {
        assert_eq!(Color::rgba(124, 176, 138, 0.9).to_string(), "rgba(124,176,138,0.9)");
        assert_eq!(Color::TRANSPARENT.to_string(), "transparent");
        assert_eq!(Palette::default().no_data.to_string(), "#6b7280");
    }
}
