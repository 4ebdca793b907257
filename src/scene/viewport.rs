use crate::foundation::core::{Affine, Point, Rect};
use crate::foundation::error::{MapRenderError, MapRenderResult};

/// Read-only view state for one frame.
///
/// World coordinates grow to the right and upwards; screen coordinates grow to the right and
/// downwards, with the origin in the top-left pixel corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// World position shown at the center of the surface.
    pub center: Point,
    /// World units per pixel. Larger values are more zoomed out.
    pub resolution: f64,
    /// Surface width in pixels.
    pub width: f64,
    /// Surface height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport. No validation happens here; see [`Viewport::validate`].
    pub fn new(center: Point, resolution: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            resolution,
            width,
            height,
        }
    }

    /// Create the smallest viewport of the given pixel size that shows all of `extent`.
    pub fn fit(extent: Rect, width: f64, height: f64) -> MapRenderResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(MapRenderError::validation(
                "viewport width and height must be > 0",
            ));
        }
        let resolution = (extent.width() / width).max(extent.height() / height);
        let resolution = if resolution > 0.0 { resolution } else { 1.0 };
        let vp = Self::new(extent.center(), resolution, width, height);
        vp.validate()?;
        Ok(vp)
    }

    /// Check that the viewport describes a drawable, finite view.
    pub fn validate(&self) -> MapRenderResult<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(MapRenderError::validation(format!(
                "viewport size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(MapRenderError::validation(
                "viewport resolution must be finite and > 0",
            ));
        }
        if !(self.center.x.is_finite() && self.center.y.is_finite()) {
            return Err(MapRenderError::validation("viewport center must be finite"));
        }
        Ok(())
    }

    /// Visible world extent.
    pub fn extent(&self) -> Rect {
        let half_w = self.width * self.resolution * 0.5;
        let half_h = self.height * self.resolution * 0.5;
        Rect::new(
            self.center.x - half_w,
            self.center.y - half_h,
            self.center.x + half_w,
            self.center.y + half_h,
        )
    }

    /// Map a world position to screen pixels.
    pub fn world_to_screen(&self, p: Point) -> Point {
        self.world_to_screen_transform() * p
    }

    /// Affine transform from world coordinates to screen pixels.
    pub fn world_to_screen_transform(&self) -> Affine {
        let extent = self.extent();
        let inv = 1.0 / self.resolution;
        Affine::new([inv, 0.0, 0.0, -inv, -extent.x0 * inv, extent.y1 * inv])
    }

    /// Map a world rectangle to a screen rectangle (normalized so `x0 <= x1`, `y0 <= y1`).
    pub fn world_to_screen_rect(&self, r: Rect) -> Rect {
        let a = self.world_to_screen(Point::new(r.x0, r.y1));
        let b = self.world_to_screen(Point::new(r.x1, r.y0));
        Rect::from_points(a, b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/viewport.rs"]
mod tests;
