//! Screen plane and the in-plane coordinate frame.
//!
//! A screen plane is stored as the coefficients of `Ax + By + Cz + D = 0`
//! with a unit normal `(A, B, C)`. Formula code reads the coefficients
//! through [`ScreenPlane::a`] .. [`ScreenPlane::d`], never by position.

use nalgebra::Vector4;
use serde::{Deserialize, Serialize};

use crate::{Pt3, Real, Vec2, Vec3};

/// Screen plane `Ax + By + Cz + D = 0` with unit normal `(A, B, C)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPlane {
    coeffs: Vector4<Real>,
}

impl ScreenPlane {
    /// Build a plane from a normal and offset; both are rescaled so the
    /// normal has unit length.
    ///
    /// The normal must be non-zero.
    pub fn from_normal_and_offset(normal: Vec3, offset: Real) -> Self {
        let len = normal.norm();
        let n = normal / len;
        Self {
            coeffs: Vector4::new(n.x, n.y, n.z, offset / len),
        }
    }

    /// Plane through `point` with the given normal.
    pub fn through_point(normal: Vec3, point: &Pt3) -> Self {
        let n = normal.normalize();
        Self::from_normal_and_offset(n, -n.dot(&point.coords))
    }

    #[inline]
    pub fn a(&self) -> Real {
        self.coeffs.x
    }

    #[inline]
    pub fn b(&self) -> Real {
        self.coeffs.y
    }

    #[inline]
    pub fn c(&self) -> Real {
        self.coeffs.z
    }

    #[inline]
    pub fn d(&self) -> Real {
        self.coeffs.w
    }

    /// Unit normal `(A, B, C)`.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a(), self.b(), self.c())
    }

    /// Signed distance of `p` from the plane (positive on the normal side).
    #[inline]
    pub fn signed_distance(&self, p: &Pt3) -> Real {
        self.normal().dot(&p.coords) + self.d()
    }

    /// Distance from the eye (origin) to the plane.
    #[inline]
    pub fn distance_from_origin(&self) -> Real {
        self.d().abs()
    }

    /// Foot of the perpendicular dropped from the origin onto the plane.
    #[inline]
    pub fn foot_of_origin(&self) -> Pt3 {
        Pt3::from(self.normal() * -self.d())
    }

    /// Same plane with the normal flipped so that `D <= 0`, i.e. the normal
    /// points from the eye towards the screen.
    pub fn oriented_away_from_origin(self) -> Self {
        if self.d() > 0.0 {
            Self {
                coeffs: -self.coeffs,
            }
        } else {
            self
        }
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn closest_point(&self, p: &Pt3) -> Pt3 {
        p - self.normal() * self.signed_distance(p)
    }
}

/// Orthonormal 2D frame embedded in a screen plane.
///
/// `origin` is the foot of the perpendicular from the eye, `horizontal`
/// follows device +X and `vertical` follows device +Y unless flipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenFrame {
    pub origin: Pt3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
}

impl ScreenFrame {
    /// Minimum in-plane length of the projected device X axis.
    const EDGE_ON_EPS: Real = 1e-6;

    /// Frame for `plane`: device +X projected into the plane, and
    /// `horizontal × normal` for the vertical axis.
    ///
    /// Returns `None` if the plane is (nearly) perpendicular to device X.
    pub fn from_plane(plane: &ScreenPlane) -> Option<Self> {
        let n = plane.normal();
        let x_axis = Vec3::x();
        let in_plane = x_axis - n * n.dot(&x_axis);
        let len = in_plane.norm();
        if len < Self::EDGE_ON_EPS {
            return None;
        }
        let horizontal = in_plane / len;
        let vertical = horizontal.cross(&n).normalize();
        Some(Self {
            origin: plane.foot_of_origin(),
            horizontal,
            vertical,
        })
    }

    /// Flip either axis.
    pub fn flipped(self, flip_horizontal: bool, flip_vertical: bool) -> Self {
        Self {
            origin: self.origin,
            horizontal: if flip_horizontal {
                -self.horizontal
            } else {
                self.horizontal
            },
            vertical: if flip_vertical {
                -self.vertical
            } else {
                self.vertical
            },
        }
    }

    /// In-plane coordinates of `p` (assumed to lie on the plane).
    #[inline]
    pub fn coords(&self, p: &Pt3) -> Vec2 {
        let rel = p - self.origin;
        Vec2::new(rel.dot(&self.horizontal), rel.dot(&self.vertical))
    }

    /// 3D point at in-plane coordinates `uv`.
    #[inline]
    pub fn point(&self, uv: &Vec2) -> Pt3 {
        self.origin + self.horizontal * uv.x + self.vertical * uv.y
    }
}
