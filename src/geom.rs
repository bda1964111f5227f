//! Geometry and math utilities
//!
//! Collision primitives for axis-aligned boxes and circles plus the weighted
//! random draw both spawn tables use. No state lives here.

use glam::Vec2;
use rand::Rng;

/// Axis-aligned rectangle. Top-left origin, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Shrink by `dx` on the left/right and `dy` on the top/bottom
    pub fn inset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w - dx * 2.0, self.h - dy * 2.0)
    }

    /// Axis-aligned overlap test
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Circle-vs-rectangle test via the closest point on the rectangle
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.x, rect.right()),
        center.y.clamp(rect.y, rect.bottom()),
    );
    center.distance(closest) < radius
}

/// Linear interpolation
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}

/// Rotate `p` around `center` by `angle` radians
pub fn rotate_about(p: Vec2, center: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let d = p - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Weighted random draw over a weight table.
///
/// Draws uniformly in `[0, total)` and walks the table accumulating partial
/// sums, returning the first index whose cumulative sum covers the draw.
/// A degenerate table (empty or non-positive total) yields index 0.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> usize {
    let total: f32 = weights.iter().copied().filter(|w| *w > 0.0).sum();
    if !(total > 0.0) {
        return 0;
    }
    let draw = rng.random_range(0.0..total);
    let mut sum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        sum += w;
        if draw < sum {
            return i;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        // Touching edges do not overlap
        let d = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Center inside
        assert!(circle_overlaps_rect(Vec2::new(5.0, 5.0), 1.0, &rect));
        // Touching from the right
        assert!(circle_overlaps_rect(Vec2::new(13.0, 5.0), 4.0, &rect));
        assert!(!circle_overlaps_rect(Vec2::new(15.0, 5.0), 4.0, &rect));
        // Corner case: diagonal distance matters, not the bounding box
        assert!(!circle_overlaps_rect(Vec2::new(13.0, 13.0), 4.0, &rect));
    }

    #[test]
    fn test_inset_shrinks() {
        let r = Rect::new(10.0, 20.0, 40.0, 60.0).inset(5.0, 10.0);
        assert_eq!(r, Rect::new(15.0, 30.0, 30.0, 40.0));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    }

    #[test]
    fn test_weighted_index_degenerate() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(weighted_index(&mut rng, &[]), 0);
        assert_eq!(weighted_index(&mut rng, &[0.0, 0.0]), 0);
        assert_eq!(weighted_index(&mut rng, &[0.0, 3.0, 0.0]), 1);
    }

    #[test]
    fn test_weighted_index_converges() {
        // Observed frequencies approach w_i / total over many draws
        let mut rng = Pcg32::seed_from_u64(7);
        let weights = [30.0, 60.0, 10.0];
        let mut counts = [0u32; 3];
        let n = 100_000;
        for _ in 0..n {
            counts[weighted_index(&mut rng, &weights)] += 1;
        }
        let total: f32 = weights.iter().sum();
        for (count, w) in counts.iter().zip(weights.iter()) {
            let observed = *count as f32 / n as f32;
            let expected = w / total;
            assert!(
                (observed - expected).abs() < 0.01,
                "observed {observed} vs expected {expected}"
            );
        }
    }
}
