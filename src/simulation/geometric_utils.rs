//! Geometric primitives shared by the spatial grid and the segment queries.

use geo::Coord;

/// Cross products smaller than this are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-8;

/// Direction components smaller than this are treated as zero.
pub const DIRECTION_EPSILON: f64 = 1e-12;

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Dot product of two 2D vectors.
#[inline]
pub fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Unit direction for `angle`, or `None` when both components vanish.
#[inline]
pub fn unit_direction(angle: f64) -> Option<Coord<f64>> {
    let dir = Coord {
        x: angle.cos(),
        y: angle.sin(),
    };
    // Written so that NaN components also count as degenerate.
    if dir.x.abs() >= DIRECTION_EPSILON || dir.y.abs() >= DIRECTION_EPSILON {
        Some(dir)
    } else {
        None
    }
}

/// Distance along a ray to a segment, if the ray hits it.
///
/// Solves `origin + t * dir = a + u * (b - a)` for `t >= 0` and `u` in `[0, 1]`.
/// `dir` is expected to be a unit vector so that `t` is a distance.
///
/// # Returns
///
/// `None` for misses and for (numerically) parallel ray and segment.
#[inline]
pub fn ray_segment_distance(
    origin: Coord<f64>,
    dir: Coord<f64>,
    a: Coord<f64>,
    b: Coord<f64>,
) -> Option<f64> {
    let edge = b - a;
    let denom = cross(dir, edge);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let w = a - origin;
    let t = cross(w, edge) / denom;
    let u = cross(w, dir) / denom;

    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// A rectangle rotated by `angle` around its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// Center of the box.
    pub center: Coord<f64>,
    /// Half of the extent along the box's local x axis.
    pub half_width: f64,
    /// Half of the extent along the box's local y axis.
    pub half_height: f64,
    /// Rotation in radians.
    pub angle: f64,
}

impl OrientedBox {
    /// Creates a box from its full width and height.
    pub fn new(center: Coord<f64>, width: f64, height: f64, angle: f64) -> Self {
        Self {
            center,
            half_width: width / 2.0,
            half_height: height / 2.0,
            angle,
        }
    }

    /// Local unit axes `(x_axis, y_axis)`.
    pub fn axes(&self) -> (Coord<f64>, Coord<f64>) {
        let (sin, cos) = self.angle.sin_cos();
        (Coord { x: cos, y: sin }, Coord { x: -sin, y: cos })
    }

    /// The four corners in counter-clockwise order.
    pub fn corners(&self) -> [Coord<f64>; 4] {
        let (ux, uy) = self.axes();
        let ex = ux * self.half_width;
        let ey = uy * self.half_height;
        [
            self.center + ex + ey,
            self.center - ex + ey,
            self.center - ex - ey,
            self.center + ex - ey,
        ]
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Coord<f64>, Coord<f64>) {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        (min, max)
    }

    /// Separating axis test against the segment `a`-`b`.
    ///
    /// Candidate axes are the two box axes and the segment normal. Touching
    /// counts as overlapping.
    pub fn intersects_segment(&self, a: Coord<f64>, b: Coord<f64>) -> bool {
        let corners = self.corners();
        let (ux, uy) = self.axes();

        let edge = b - a;
        let len = dot(edge, edge).sqrt();
        let normal = (len > DIRECTION_EPSILON).then(|| Coord {
            x: -edge.y / len,
            y: edge.x / len,
        });

        [Some(ux), Some(uy), normal]
            .into_iter()
            .flatten()
            .all(|axis| !separated_on(axis, &corners, a, b))
    }
}

fn separated_on(axis: Coord<f64>, corners: &[Coord<f64>; 4], a: Coord<f64>, b: Coord<f64>) -> bool {
    let (mut box_min, mut box_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &c in corners {
        let p = dot(c, axis);
        box_min = box_min.min(p);
        box_max = box_max.max(p);
    }

    let pa = dot(a, axis);
    let pb = dot(b, axis);
    let (seg_min, seg_max) = (pa.min(pb), pa.max(pb));

    box_max < seg_min || seg_max < box_min
}

/// Midpoint of a segment.
#[inline]
pub fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    (a + b) / 2.0
}
