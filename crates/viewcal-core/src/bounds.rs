use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Pt2, Real};

/// Inclusive range constraint on a scalar; `Unbounded` accepts everything.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InclusiveBounds {
    #[default]
    Unbounded,
    Range {
        min: Real,
        max: Real,
    },
}

impl InclusiveBounds {
    /// Range between `a` and `b`, in either order.
    pub fn new(a: Real, b: Real) -> Self {
        if b < a {
            Self::Range { min: b, max: a }
        } else {
            Self::Range { min: a, max: b }
        }
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    /// `true` when unbounded or `val` lies within `[min, max]`.
    #[inline]
    pub fn contains(&self, val: Real) -> bool {
        match *self {
            Self::Unbounded => true,
            Self::Range { min, max } => val >= min && val <= max,
        }
    }

    /// `true` only for a bounded range that excludes `val`.
    #[inline]
    pub fn outside(&self, val: Real) -> bool {
        match *self {
            Self::Unbounded => false,
            Self::Range { min, max } => val < min || val > max,
        }
    }

    pub fn min(&self) -> Option<Real> {
        match *self {
            Self::Unbounded => None,
            Self::Range { min, .. } => Some(min),
        }
    }

    pub fn max(&self) -> Option<Real> {
        match *self {
            Self::Unbounded => None,
            Self::Range { max, .. } => Some(max),
        }
    }
}

impl fmt::Display for InclusiveBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "[unbounded]"),
            Self::Range { min, max } => {
                // Forward precision so `{:.2}` applies to both ends.
                match f.precision() {
                    Some(p) => write!(f, "[{:.*}, {:.*}]", p, min, p, max),
                    None => write!(f, "[{}, {}]", min, max),
                }
            }
        }
    }
}

/// Independent range constraints on the two axes of a 2D quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XyInclusiveBounds {
    pub x: InclusiveBounds,
    pub y: InclusiveBounds,
}

impl XyInclusiveBounds {
    pub fn new(x: InclusiveBounds, y: InclusiveBounds) -> Self {
        Self { x, y }
    }

    /// `true` if either axis carries a constraint.
    pub fn is_bounded(&self) -> bool {
        self.x.is_bounded() || self.y.is_bounded()
    }

    pub fn contains(&self, x: Real, y: Real) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }

    pub fn outside(&self, x: Real, y: Real) -> bool {
        self.x.outside(x) || self.y.outside(y)
    }
}

impl fmt::Display for XyInclusiveBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.x.is_bounded(), self.y.is_bounded()) {
            (false, false) => write!(f, "unbounded"),
            (true, false) => write!(f, "x: {}", self.x),
            (false, true) => write!(f, "y: {}", self.y),
            (true, true) => write!(f, "x: {}, y: {}", self.x, self.y),
        }
    }
}

/// Screen-space rectangle in the measurement's own units.
///
/// `top`/`bottom` are named by meaning, not by numeric order: supplying
/// `top < bottom` flips the normalized Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectBounds {
    pub left: Real,
    pub right: Real,
    pub top: Real,
    pub bottom: Real,
}

impl RectBounds {
    /// Axis-aligned bounding box of `points`, with `bottom = min y` and
    /// `top = max y`. `None` for an empty iterator.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Pt2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut out = Self {
            left: first.x,
            right: first.x,
            top: first.y,
            bottom: first.y,
        };
        for p in iter {
            out.left = out.left.min(p.x);
            out.right = out.right.max(p.x);
            out.bottom = out.bottom.min(p.y);
            out.top = out.top.max(p.y);
        }
        Some(out)
    }

    /// Mirror image about the vertical axis through the origin.
    pub fn reflected_horizontally(&self) -> Self {
        Self {
            left: -self.right,
            right: -self.left,
            top: self.top,
            bottom: self.bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> Real {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> Real {
        self.top - self.bottom
    }

    /// `true` if either extent is zero (or not finite).
    pub fn is_degenerate(&self) -> bool {
        let w = self.width();
        let h = self.height();
        !(w.is_finite() && h.is_finite()) || w.abs() <= Real::EPSILON || h.abs() <= Real::EPSILON
    }

    /// Map `p` into unit coordinates: `left → 0`, `right → 1`,
    /// `bottom → 0`, `top → 1`.
    pub fn normalize(&self, p: &Pt2) -> Pt2 {
        Pt2::new(
            (p.x - self.left) / self.width(),
            (p.y - self.bottom) / self.height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_is_distinct_from_any_range() {
        let unbounded = InclusiveBounds::default();
        assert!(!unbounded.is_bounded());
        assert!(unbounded.contains(1e300));
        assert!(!unbounded.outside(-1e300));
        assert_ne!(unbounded, InclusiveBounds::new(Real::MIN, Real::MAX));
    }

    #[test]
    fn range_swaps_reversed_limits() {
        let b = InclusiveBounds::new(5.0, -5.0);
        assert_eq!(b.min(), Some(-5.0));
        assert_eq!(b.max(), Some(5.0));
        assert!(b.contains(-5.0));
        assert!(b.contains(5.0));
        assert!(b.outside(5.000001));
        assert!(!b.contains(-6.0));
    }

    #[test]
    fn display_forms() {
        assert_eq!(InclusiveBounds::Unbounded.to_string(), "[unbounded]");
        assert_eq!(format!("{:.1}", InclusiveBounds::new(1.0, 2.5)), "[1.0, 2.5]");

        let xy = XyInclusiveBounds::default();
        assert_eq!(xy.to_string(), "unbounded");
        let xy = XyInclusiveBounds::new(InclusiveBounds::Unbounded, InclusiveBounds::new(0.0, 1.0));
        assert_eq!(xy.to_string(), "y: [0, 1]");
        let xy = XyInclusiveBounds::new(InclusiveBounds::new(-1.0, 1.0), InclusiveBounds::new(0.0, 1.0));
        assert_eq!(xy.to_string(), "x: [-1, 1], y: [0, 1]");
    }

    #[test]
    fn xy_bounds_check_each_axis() {
        let xy = XyInclusiveBounds::new(InclusiveBounds::new(-30.0, 30.0), InclusiveBounds::Unbounded);
        assert!(xy.is_bounded());
        assert!(xy.contains(10.0, 1000.0));
        assert!(xy.outside(31.0, 0.0));
    }

    #[test]
    fn rect_enclosing_and_normalize() {
        let pts = [Pt2::new(10.0, 20.0), Pt2::new(30.0, 60.0), Pt2::new(20.0, 40.0)];
        let r = RectBounds::enclosing(&pts).unwrap();
        assert_eq!((r.left, r.right, r.bottom, r.top), (10.0, 30.0, 20.0, 60.0));
        let n = r.normalize(&Pt2::new(20.0, 40.0));
        assert!((n.x - 0.5).abs() < 1e-12 && (n.y - 0.5).abs() < 1e-12);
        assert!(RectBounds::enclosing(std::iter::empty::<&Pt2>()).is_none());
    }

    #[test]
    fn rect_reflection_and_degeneracy() {
        let r = RectBounds {
            left: -1.0,
            right: 3.0,
            top: 2.0,
            bottom: 0.0,
        };
        let m = r.reflected_horizontally();
        assert_eq!((m.left, m.right), (-3.0, 1.0));
        assert!(!r.is_degenerate());
        let flat = RectBounds {
            left: 0.0,
            right: 1.0,
            top: 2.0,
            bottom: 2.0,
        };
        assert!(flat.is_degenerate());
    }
}
