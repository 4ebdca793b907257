use anyhow::Context;

use crate::foundation::error::{MapRenderError, MapRenderResult};

/// Decoded image in premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Vec<u8>,
}

/// Decode encoded image bytes (any format the `image` crate recognizes) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MapRenderResult<PreparedImage> {
    if bytes.is_empty() {
        return Err(MapRenderError::render("cannot decode an empty image buffer"));
    }
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul,
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Normalize a scene-relative file reference.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths or parent
/// traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> MapRenderResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MapRenderError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(MapRenderError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MapRenderError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MapRenderError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
