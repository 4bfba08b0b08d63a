#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

/// A point in either surface (CSS pixel) or graphic space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pan/zoom transform applied to the rendered graphic.
///
/// `translate_x` / `translate_y` are in CSS pixels and unconstrained.
/// `scale` is a zoom factor (1.0 = natural size); the owning controller keeps
/// it inside its surface bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0 }
    }
}

impl ViewTransform {
    /// Whether this transform equals the reset state.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// CSS transform string: `translate(Xpx, Ypx) scale(S)`.
    #[must_use]
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.translate_x, self.translate_y, self.scale)
    }

    /// Map a graphic-space point to surface coordinates.
    ///
    /// Scaling happens about `origin` (the surface center), then translation
    /// is applied.
    #[must_use]
    pub fn to_surface(&self, graphic: Point, origin: Point) -> Point {
        Point {
            x: origin.x + self.translate_x + (graphic.x - origin.x) * self.scale,
            y: origin.y + self.translate_y + (graphic.y - origin.y) * self.scale,
        }
    }

    /// Map a surface point back to graphic space. Inverse of [`Self::to_surface`].
    #[must_use]
    pub fn to_graphic(&self, surface: Point, origin: Point) -> Point {
        Point {
            x: origin.x + (surface.x - origin.x - self.translate_x) / self.scale,
            y: origin.y + (surface.y - origin.y - self.translate_y) / self.scale,
        }
    }
}

/// Zoom level as the rounded percentage shown in the toolbar.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn zoom_percent(scale: f64) -> i64 {
    (scale * 100.0).round() as i64
}
