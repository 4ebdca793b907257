use crate::foundation::error::{MapRenderError, MapRenderResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Straight-alpha RGBA8 color as authored in styles and scene files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white, the default map background.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Construct a color from straight-alpha channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `RRGGBB` or `RRGGBBAA` hex, with an optional leading `#`.
    pub fn from_hex(s: &str) -> MapRenderResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(MapRenderError::validation(format!(
                "color '{s}' must be RRGGBB or RRGGBBAA hex"
            )));
        }
        let channel = |i: usize| -> MapRenderResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| MapRenderError::validation(format!("color '{s}' is not valid hex")))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Return the same color with its alpha multiplied by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let o = opacity.clamp(0.0, 1.0);
        Self {
            a: ((f32::from(self.a) * o) + 0.5) as u8,
            ..self
        }
    }

    /// Premultiplied RGBA8 bytes, as stored in raster surfaces.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
