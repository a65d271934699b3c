// ABOUTME: Axis-aligned rectangles in framebuffer or display space.
// ABOUTME: Provides half-open containment and fractional splitting with a gutter.

/// Axis-aligned rectangle spanning `[p0, p1)` on both axes.
///
/// Coordinates have their origin at the top-left of the window, with y
/// growing downward. Constructors normalize the corners so that `p0 <= p1`
/// componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent2D {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
}

/// Width in pixels of the gutter between two split children
pub fn split_line_width(dpi_scale: f32) -> f32 {
    (3.0 * dpi_scale + 0.5).floor()
}

impl Extent2D {
    pub fn new(a: [f32; 2], b: [f32; 2]) -> Self {
        Self {
            p0: [a[0].min(b[0]), a[1].min(b[1])],
            p1: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    /// Rectangle anchored at the origin with the given size
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new([0.0, 0.0], [width, height])
    }

    pub fn width(&self) -> f32 {
        self.p1[0] - self.p0[0]
    }

    pub fn height(&self) -> f32 {
        self.p1[1] - self.p0[1]
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Half-open containment test; points on `p1` belong to the neighbor.
    pub fn inside(&self, p: [f32; 2]) -> bool {
        p[0] >= self.p0[0] && p[0] < self.p1[0] && p[1] >= self.p0[1] && p[1] < self.p1[1]
    }

    /// Point relative to this rectangle's top-left corner
    pub fn to_local(&self, p: [f32; 2]) -> [f32; 2] {
        [p[0] - self.p0[0], p[1] - self.p0[1]]
    }

    /// Split along x into (left, gutter, right).
    ///
    /// The gutter is `gutter_width` wide and centered on `p0.x + fraction * width`,
    /// clamped to the rectangle. The three results tile `self` exactly.
    pub fn split_x(&self, fraction: f32, gutter_width: f32) -> (Self, Self, Self) {
        let (lo, hi) = gutter_span(self.p0[0], self.p1[0], fraction, gutter_width);
        (
            Self { p0: self.p0, p1: [lo, self.p1[1]] },
            Self { p0: [lo, self.p0[1]], p1: [hi, self.p1[1]] },
            Self { p0: [hi, self.p0[1]], p1: self.p1 },
        )
    }

    /// Split along y into (top, gutter, bottom). See [`Extent2D::split_x`].
    pub fn split_y(&self, fraction: f32, gutter_width: f32) -> (Self, Self, Self) {
        let (lo, hi) = gutter_span(self.p0[1], self.p1[1], fraction, gutter_width);
        (
            Self { p0: self.p0, p1: [self.p1[0], lo] },
            Self { p0: [self.p0[0], lo], p1: [self.p1[0], hi] },
            Self { p0: [self.p0[0], hi], p1: self.p1 },
        )
    }
}

fn gutter_span(start: f32, end: f32, fraction: f32, gutter_width: f32) -> (f32, f32) {
    let fraction = if fraction.is_finite() { fraction } else { 0.5 };
    let center = start + fraction * (end - start);
    let half = gutter_width.max(0.0) / 2.0;
    // f32::clamp panics on a NaN bound
    let lo = (center - half).max(start).min(end);
    let hi = (center + half).max(lo).min(end);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles_x(whole: Extent2D, parts: (Extent2D, Extent2D, Extent2D)) -> bool {
        let (a, g, b) = parts;
        a.p0 == whole.p0
            && b.p1 == whole.p1
            && a.p1[0] == g.p0[0]
            && g.p1[0] == b.p0[0]
            && a.p0[1] == whole.p0[1]
            && g.p0[1] == whole.p0[1]
            && b.p0[1] == whole.p0[1]
            && a.p1[1] == whole.p1[1]
            && g.p1[1] == whole.p1[1]
    }

    #[test]
    fn new_normalizes_corners() {
        let e = Extent2D::new([10.0, 20.0], [0.0, 5.0]);
        assert_eq!(e.p0, [0.0, 5.0]);
        assert_eq!(e.p1, [10.0, 20.0]);
    }

    #[test]
    fn inside_is_half_open() {
        let e = Extent2D::from_size(10.0, 10.0);
        assert!(e.inside([0.0, 0.0]));
        assert!(e.inside([9.99, 9.99]));
        assert!(!e.inside([10.0, 5.0]));
        assert!(!e.inside([5.0, 10.0]));
        assert!(!e.inside([-0.01, 5.0]));
    }

    #[test]
    fn split_x_tiles_rectangle() {
        let whole = Extent2D::new([12.0, 40.0], [812.0, 640.0]);
        for &f in &[0.1, 0.25, 0.5, 0.731, 0.99] {
            for &g in &[0.0, 1.0, 3.0, 6.0] {
                let parts = whole.split_x(f, g);
                assert!(tiles_x(whole, parts), "f={f} g={g}");
                let (a, s, b) = parts;
                assert!((s.width() - g).abs() < 1e-3);
                assert!((a.width() + s.width() + b.width() - whole.width()).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn split_y_uses_y_axis() {
        let whole = Extent2D::from_size(400.0, 300.0);
        let (top, gutter, bottom) = whole.split_y(0.5, 4.0);
        assert_eq!(top.width(), 400.0);
        assert_eq!(gutter.width(), 400.0);
        assert_eq!(bottom.width(), 400.0);
        assert_eq!(top.p1[1], 148.0);
        assert_eq!(gutter.p0[1], 148.0);
        assert_eq!(gutter.p1[1], 152.0);
        assert_eq!(bottom.p0[1], 152.0);
        assert_eq!(bottom.p1[1], 300.0);
    }

    #[test]
    fn centerline_belongs_to_gutter() {
        let whole = Extent2D::from_size(200.0, 100.0);
        let (left, gutter, right) = whole.split_x(0.5, 3.0);
        let p = [100.0, 50.0];
        assert!(gutter.inside(p));
        assert!(!left.inside(p));
        assert!(!right.inside(p));
    }

    #[test]
    fn split_interiors_are_disjoint() {
        let whole = Extent2D::from_size(97.0, 53.0);
        let (a, g, b) = whole.split_x(0.37, 3.0);
        for x in 0..97 {
            let p = [x as f32 + 0.5, 10.0];
            let hits = [a.inside(p), g.inside(p), b.inside(p)]
                .iter()
                .filter(|h| **h)
                .count();
            assert_eq!(hits, 1, "x={x}");
        }
    }

    #[test]
    fn gutter_clamps_at_edges() {
        let whole = Extent2D::from_size(100.0, 100.0);
        let (a, g, b) = whole.split_x(0.0, 6.0);
        assert_eq!(a.width(), 0.0);
        assert_eq!(g.p0[0], 0.0);
        assert_eq!(g.p1[0], 3.0);
        assert_eq!(b.p1[0], 100.0);
    }

    #[test]
    fn non_finite_fraction_splits_at_center() {
        let whole = Extent2D::from_size(200.0, 100.0);
        for f in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let parts = whole.split_x(f, 4.0);
            assert!(tiles_x(whole, parts), "f={f}");
            assert_eq!(parts.1.p0[0], 98.0);
            assert_eq!(parts.1.p1[0], 102.0);
        }

        let flat = Extent2D::from_size(0.0, 100.0);
        let (a, g, b) = flat.split_x(f32::INFINITY, 3.0);
        assert_eq!(a.width(), 0.0);
        assert_eq!(g.width(), 0.0);
        assert_eq!(b.width(), 0.0);
    }

    #[test]
    fn split_line_width_scales_with_dpi() {
        assert_eq!(split_line_width(1.0), 3.0);
        assert_eq!(split_line_width(2.0), 6.0);
        assert_eq!(split_line_width(1.5), 5.0);
    }
}
