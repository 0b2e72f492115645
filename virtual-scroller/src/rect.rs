/// An immutable vertical interval: `[top, top + height)`.
///
/// Negative heights are not rejected; they produce an empty interval under
/// [`Rectangle::intersects`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    pub top: f64,
    pub height: f64,
}

fn starts_within(point: f64, top: f64, bottom: f64) -> bool {
    point >= top && point < bottom
}

impl Rectangle {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Two half-open intervals intersect iff either one's top lies inside the other.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        starts_within(self.top, other.top, other.bottom())
            || starts_within(other.top, self.top, self.bottom())
    }

    /// Returns a copy shifted by `offset`.
    pub fn translate_by(&self, offset: f64) -> Rectangle {
        Rectangle::new(self.top + offset, self.height)
    }

    pub fn contains(&self, point: f64) -> bool {
        starts_within(point, self.top, self.bottom())
    }

    /// Grows the rectangle by `ratio × height` on both edges.
    pub fn expand_by_ratio(&self, ratio: f64) -> Rectangle {
        let pad = ratio * self.height;
        Rectangle::new(self.top - pad, self.height + 2.0 * pad)
    }

    /// Returns the overlapping height with `other` (0 when disjoint).
    pub fn overlap(&self, other: &Rectangle) -> f64 {
        let bottom = self.bottom().min(other.bottom());
        let top = self.top.max(other.top);
        (bottom - top).max(0.0)
    }
}

// `f64::ceil` lives in std; this keeps `no_std` builds working.
pub(crate) fn ceil(x: f64) -> f64 {
    const EXACT: f64 = 4_503_599_627_370_496.0; // 2^52
    if !x.is_finite() || !(-EXACT..EXACT).contains(&x) {
        return x;
    }
    let truncated = x as i64 as f64;
    if truncated < x { truncated + 1.0 } else { truncated }
}

/// Rounds a CSS pixel length up to the device pixel grid.
pub(crate) fn snap_to_device_pixels(css_pixels: f64, device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio <= 0.0 || !device_pixel_ratio.is_finite() {
        return css_pixels;
    }
    ceil(css_pixels * device_pixel_ratio) / device_pixel_ratio
}
