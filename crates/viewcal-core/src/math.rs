use nalgebra::{Matrix3, Point2, Point3, Vector2, Vector3};

use crate::ScreenPlane;

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt2 = Point2<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;

/// Denominators below this magnitude are treated as a ray parallel to a plane.
pub const PARALLEL_EPS: Real = 1e-12;

/// Rotation of `p` about the Y axis, in radians.
///
/// Zero points along −Z and positive rotation heads towards −X: the X axis
/// of `atan2` space is −Z in eye space and its Y axis is −X.
#[inline]
pub fn rotation_about_y(p: &Pt3) -> Real {
    (-p.x).atan2(-p.z)
}

/// Project from the origin through `p` onto `plane`.
///
/// Solves `A·sx + B·sy + C·sz + D = 0` for `s` and returns `s·p`. Returns
/// `None` when the ray is parallel to the plane or the result is not finite.
pub fn project_onto_plane(p: &Pt3, plane: &ScreenPlane) -> Option<Pt3> {
    let denom = plane.a() * p.x + plane.b() * p.y + plane.c() * p.z;
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let s = -plane.d() / denom;
    let out = Pt3::from(p.coords * s);
    if out.coords.iter().all(|v| v.is_finite()) {
        Some(out)
    } else {
        None
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance_from(a: &Pt3, b: &Pt3) -> Real {
    nalgebra::distance(a, b)
}

/// Angle between the rays from the origin through `a` and `b`, in radians.
pub fn angle_between(a: &Pt3, b: &Pt3) -> Real {
    let na = a.coords.norm();
    let nb = b.coords.norm();
    if na <= Real::EPSILON || nb <= Real::EPSILON {
        return 0.0;
    }
    let cos = (a.coords.dot(&b.coords) / (na * nb)).clamp(-1.0, 1.0);
    cos.acos()
}
