//! RGB color values and ARGB packing
//!
//! A `color` node evaluates to a single number: the color packed as
//! `0xAARRGGBB`. Every such value is an integer below 2³², so it round-trips
//! through `f64` exactly.

use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);
    pub const RED: RgbColor = RgbColor::new(255, 0, 0);
    pub const GREEN: RgbColor = RgbColor::new(0, 255, 0);
    pub const BLUE: RgbColor = RgbColor::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Decode the result of a `color` node, ignoring alpha
    ///
    /// Returns `None` for values that are not a packed color (NaN, negative,
    /// fractional or wider than 32 bits).
    pub fn from_packed(value: f64) -> Option<Self> {
        let argb = packed_to_u32(value)?;
        Some(Self::from_hex(argb))
    }
}

/// Alpha channel of a packed color, if the value is one
pub fn packed_alpha(value: f64) -> Option<u8> {
    packed_to_u32(value).map(|argb| (argb >> 24) as u8)
}

/// Pack channel values into `0xAARRGGBB`
///
/// `r`, `g`, `b` are in `[0, 255]`, `a` in `[0, 1]`; out-of-range channels are
/// clamped and fractional ones rounded.
pub fn pack_argb(r: f64, g: f64, b: f64, a: f64) -> f64 {
    let channel = |v: f64| -> u32 {
        if v.is_nan() {
            0
        } else {
            v.round().clamp(0.0, 255.0) as u32
        }
    };
    let argb = channel(a * 255.0) << 24 | channel(r) << 16 | channel(g) << 8 | channel(b);
    argb as f64
}

fn packed_to_u32(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 && value.fract() == 0.0 {
        Some(value as u32)
    } else {
        None
    }
}
