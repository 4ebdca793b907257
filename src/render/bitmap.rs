use std::fmt;
use std::sync::Arc;

use crate::assets::decode::decode_image;
use crate::foundation::error::{MapRenderError, MapRenderResult};

/// A decoded, premultiplied raster ready to be used as a paint.
///
/// Bitmaps are owned by cache entries; dropping the bitmap releases the pixel memory.
pub struct Bitmap {
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl Bitmap {
    /// Wrap an existing pixmap.
    pub fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        Self {
            pixmap: Arc::new(pixmap),
        }
    }

    /// Build from premultiplied RGBA8 bytes (row-major, tightly packed).
    pub fn from_premul_rgba8(bytes: &[u8], width: u32, height: u32) -> MapRenderResult<Self> {
        pixmap_from_premul_bytes(bytes, width, height).map(Self::from_pixmap)
    }

    /// Decode an encoded image (PNG, JPEG, ...).
    pub fn decode(encoded: &[u8]) -> MapRenderResult<Self> {
        let prepared = decode_image(encoded)?;
        Self::from_premul_rgba8(&prepared.rgba8_premul, prepared.width, prepared.height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(self.pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MapRenderResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MapRenderError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MapRenderError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MapRenderError::render("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
