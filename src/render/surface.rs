use std::io::Cursor;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::core::{Affine, Rgba8};
use crate::foundation::error::{MapRenderError, MapRenderResult};
use crate::scene::viewport::Viewport;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Copy of the frame with straight (non-premultiplied) alpha.
    pub fn to_straight(&self) -> FrameRGBA {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Straight-alpha pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let mut px = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut px);
        }
        Some(Rgba8::new(px[0], px[1], px[2], px[3]))
    }
}

/// Raster output format for encoded renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// JPEG; alpha is dropped, so the background should be opaque.
    Jpeg {
        /// Encoder quality in `1..=100`.
        quality: u8,
    },
}

impl ImageEncoding {
    /// JPEG at the `image` crate's default quality.
    pub fn jpeg() -> Self {
        Self::Jpeg { quality: 75 }
    }
}

/// Encode a frame into `encoding`.
pub fn encode_frame(frame: &FrameRGBA, encoding: ImageEncoding) -> MapRenderResult<Vec<u8>> {
    let straight = frame.to_straight();
    let img = image::RgbaImage::from_raw(straight.width, straight.height, straight.data)
        .ok_or_else(|| MapRenderError::encode("frame buffer does not match its dimensions"))?;

    let mut buf = Vec::new();
    match encoding {
        ImageEncoding::Png => image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| MapRenderError::encode(format!("png: {e}")))?,
        ImageEncoding::Jpeg { quality } => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut buf,
                quality.clamp(1, 100),
            );
            enc.encode_image(&rgb)
                .map_err(|e| MapRenderError::encode(format!("jpeg: {e}")))?;
        }
    }
    Ok(buf)
}

/// Off-screen drawing surface backed by a `vello_cpu` context.
///
/// Drawing routines emit paths in screen pixels; the surface applies the pixel density on top.
pub struct MapSurface {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    density: f64,
}

impl std::fmt::Debug for MapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("density", &self.density)
            .finish()
    }
}

impl MapSurface {
    /// Surface of `width x height` device pixels at density 1.
    pub fn new(width: u32, height: u32) -> MapRenderResult<Self> {
        Self::with_density(width, height, 1.0)
    }

    /// Surface of `width x height` device pixels; screen coordinates are scaled by `density`.
    pub fn with_density(width: u32, height: u32, density: f64) -> MapRenderResult<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(MapRenderError::validation(
                "pixel density must be finite and > 0",
            ));
        }
        let w = surface_dim(width, "width")?;
        let h = surface_dim(height, "height")?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            density,
        })
    }

    /// Surface matching `viewport` at `density` device pixels per screen pixel.
    pub fn for_viewport(viewport: &Viewport, density: f64) -> MapRenderResult<Self> {
        viewport.validate()?;
        let w = (viewport.width * density).round();
        let h = (viewport.height * density).round();
        if !(w >= 1.0 && h >= 1.0 && w <= f64::from(u16::MAX) && h <= f64::from(u16::MAX)) {
            return Err(MapRenderError::render(format!(
                "surface size {w}x{h} is out of range"
            )));
        }
        Self::with_density(w as u32, h as u32, density)
    }

    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.ctx.width())
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.ctx.height())
    }

    /// Device pixels per screen pixel.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Screen-to-device transform every draw starts from.
    pub fn base_transform(&self) -> Affine {
        Affine::scale(self.density)
    }

    /// Drop pending draws and fill the whole surface with `color`.
    pub fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.ctx.width()),
            f64::from(self.ctx.height()),
        ));
    }

    pub(crate) fn ctx_mut(&mut self) -> &mut vello_cpu::RenderContext {
        &mut self.ctx
    }

    /// Rasterize everything drawn since the last [`clear`](Self::clear) into the pixel buffer.
    pub fn flush(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }

    /// Copy of the pixel buffer as of the last [`flush`](Self::flush).
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn surface_dim(v: u32, what: &str) -> MapRenderResult<u16> {
    if v == 0 {
        return Err(MapRenderError::render(format!("surface {what} must be > 0")));
    }
    u16::try_from(v).map_err(|_| MapRenderError::render(format!("surface {what} exceeds u16")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
