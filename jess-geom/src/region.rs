//! The region algebra used to express neighborhood constraints.
//!
//! A [`Region`] is a possibly-unbounded subset of ℝ³ that exposes two oracles:
//! point [`Region::inclusion`] and axis-aligned-box [`Region::intersection`]. The
//! intersection oracle must be *sound conservative*: it may answer `true` for a box
//! that does not actually meet the region, but it must never answer `false` for one
//! that does. The kd-tree region query (see [`crate::KdTree`]) relies on that
//! soundness to prune subtrees without missing a hit.

use crate::Vec3;

/// An abstract geometric region over ℝ³.
pub trait Region {
    /// `true` iff `p` lies in the region.
    fn inclusion(&self, p: &Vec3) -> bool;

    /// `true` iff the axis-aligned box `[lo, hi]` has a non-empty intersection with
    /// the region. Must be conservative: false only when provably disjoint.
    fn intersection(&self, lo: &Vec3, hi: &Vec3) -> bool;
}

/// `{x ∈ ℝ³ : a ≤ |x - centre| ≤ b}`.
///
/// Radii are normalized on construction (`a ≤ b`, both clamped to `[0, ∞)`) and
/// stored squared, since every comparison this type performs is against a squared
/// distance.
pub struct Annulus {
    centre: Vec3,
    min_sq: f64,
    max_sq: f64,
}

impl Annulus {
    pub fn new(centre: Vec3, a: f64, b: f64) -> Annulus {
        let a = a.max(0.0);
        let b = b.max(0.0);
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        Annulus { centre, min_sq: a * a, max_sq: b * b }
    }

    pub fn min_sq(&self) -> f64 { self.min_sq }
    pub fn max_sq(&self) -> f64 { self.max_sq }
}

impl Region for Annulus {
    /// ```
    /// use jess_geom::{Annulus, Region, Vec3};
    /// let a = Annulus::new(Vec3::new(0.0, 0.0, 0.0), 1.0, 2.0);
    /// assert!(a.inclusion(&Vec3::new(1.5, 0.0, 0.0)));
    /// assert!(!a.inclusion(&Vec3::new(0.5, 0.0, 0.0)));
    /// assert!(!a.inclusion(&Vec3::new(3.0, 0.0, 0.0)));
    /// ```
    fn inclusion(&self, p: &Vec3) -> bool {
        let d2 = self.centre.distance_square_to(p);
        self.min_sq <= d2 && d2 <= self.max_sq
    }

    /// Conservative box test: a box is declared disjoint only when the nearest
    /// point of the box to the centre is already farther than the outer radius, or
    /// the farthest point of the box is already closer than the inner radius.
    fn intersection(&self, lo: &Vec3, hi: &Vec3) -> bool {
        let mut min_sum = 0.0;
        let mut max_sum = 0.0;
        for i in 0..3 {
            let c = self.centre[i];
            let (l, h) = (lo[i], hi[i]);
            let min_d = if c < l { l - c } else if c > h { c - h } else { 0.0 };
            min_sum += min_d * min_d;
            let max_d = (c - l).abs().max((c - h).abs());
            max_sum += max_d * max_d;
        }
        !(min_sum > self.max_sq || max_sum < self.min_sq)
    }
}

/// Combinator semantics for [`Join`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JoinMode {
    /// Intersection of the children.
    Inner,
    /// Union of the children.
    Outer,
}

/// A fixed-size n-ary combination of regions.
///
/// `Inner` mode conjoins the children's oracles; this is deliberately conservative
/// for `intersection`, since a box may intersect every child annulus individually
/// without a point existing that lies in all of them simultaneously. `Outer` mode
/// disjoins both oracles, which is exact.
pub struct Join {
    children: Vec<Box<dyn Region>>,
    mode: JoinMode,
}

impl Join {
    pub fn new(children: Vec<Box<dyn Region>>, mode: JoinMode) -> Join { Join { children, mode } }

    pub fn inner(children: Vec<Box<dyn Region>>) -> Join { Join::new(children, JoinMode::Inner) }

    pub fn outer(children: Vec<Box<dyn Region>>) -> Join { Join::new(children, JoinMode::Outer) }
}

impl Region for Join {
    fn inclusion(&self, p: &Vec3) -> bool {
        match self.mode {
            JoinMode::Inner => self.children.iter().all(|r| r.inclusion(p)),
            JoinMode::Outer => self.children.iter().any(|r| r.inclusion(p)),
        }
    }

    fn intersection(&self, lo: &Vec3, hi: &Vec3) -> bool {
        match self.mode {
            JoinMode::Inner => self.children.iter().all(|r| r.intersection(lo, hi)),
            JoinMode::Outer => self.children.iter().any(|r| r.intersection(lo, hi)),
        }
    }
}

/// Adaptive-subdivision volume estimate of `region`, restricted to the box `[lo,
/// hi]`. Splits the longest-surviving box in half at the midpoint of a cycling
/// axis until every surviving sub-box has volume at most `eps`, then sums the
/// volumes of the leaves that still intersect the region.
///
/// This is a diagnostic tool (used to sanity-check a hand-built region, e.g. when
/// reporting why a template slot produced no candidates) and is never called from
/// the scanner's hot path.
pub fn region_volume(region: &dyn Region, eps: f64, lo: Vec3, hi: Vec3) -> f64 {
    fn volume_of(lo: &Vec3, hi: &Vec3) -> f64 {
        (hi.x - lo.x) * (hi.y - lo.y) * (hi.z - lo.z)
    }

    fn recurse(region: &dyn Region, eps: f64, lo: Vec3, hi: Vec3, axis: usize) -> f64 {
        if !region.intersection(&lo, &hi) {
            return 0.0;
        }
        let v = volume_of(&lo, &hi);
        if v <= eps {
            return v;
        }
        let mid = (lo[axis] + hi[axis]) / 2.0;
        let mut lo_hi = hi;
        lo_hi[axis] = mid;
        let mut hi_lo = lo;
        hi_lo[axis] = mid;
        let next_axis = (axis + 1) % 3;
        recurse(region, eps, lo, lo_hi, next_axis) + recurse(region, eps, hi_lo, hi, next_axis)
    }

    recurse(region, eps, lo, hi, 0)
}
