//! Right-handed orthonormal placement frames.
//!
//! A [`Frame`] is a rigid transform (rotation plus translation) used both as
//! "where a component sits in the world" and as "where a mate point sits on a
//! component". Frames compose with `*` and re-express with [`Frame::relative_to`].

use std::fmt;
use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};
use nalgebra::{
    Isometry3, Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::default_tolerance;

/// Error raised when a frame cannot be constructed from the given axes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The normal is zero-length, or the x direction is parallel to it.
    #[error("frame axes are degenerate: normal is zero or x direction is parallel to it")]
    DegenerateAxes,
}

/// A right-handed orthonormal coordinate frame in 3-space.
///
/// The z axis is the frame's "normal", x lies in the plane it points out of,
/// and y completes the right-handed set. Stored as a rigid isometry, so
/// composition and inversion are exact rotations (no shear or scale creep).
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    iso: Isometry3<f64>,
}

// ── Construction ────────────────────────────────────────────────────────────

impl Frame {
    /// The world frame: origin at zero, axes along the global basis.
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    /// Build a frame at `origin` with z along `normal` and x along the
    /// component of `x_dir` perpendicular to it.
    ///
    /// `x_dir` need not be normalized or perpendicular to `normal`; it is
    /// projected onto the plane of the frame. Fails if `normal` is
    /// zero-length or `x_dir` has no component off the normal.
    pub fn new(
        origin: Vector3<f64>,
        x_dir: Vector3<f64>,
        normal: Vector3<f64>,
    ) -> Result<Self, FrameError> {
        let tol = default_tolerance();

        if tol.is_zero_length(normal.norm()) {
            return Err(FrameError::DegenerateAxes);
        }
        let z = normal.normalize();

        let in_plane = x_dir - z * x_dir.dot(&z);
        if tol.is_zero_length(in_plane.norm()) {
            return Err(FrameError::DegenerateAxes);
        }
        let x = in_plane.normalize();
        let y = z.cross(&x);

        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
        Ok(Self {
            iso: Isometry3::from_parts(
                Translation3::from(origin),
                UnitQuaternion::from_rotation_matrix(&rotation),
            ),
        })
    }

    /// Frame with default axes at the given origin.
    pub fn from_origin(origin: Vector3<f64>) -> Self {
        Self {
            iso: Isometry3::from_parts(Translation3::from(origin), UnitQuaternion::identity()),
        }
    }

    /// Frame with default axes translated by `(x, y, z)`.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_origin(Vector3::new(x, y, z))
    }

    /// Pure rotation of `angle` radians about the x axis.
    pub fn rotated_x(angle: f64) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle),
            ),
        }
    }

    /// Pure rotation of `angle` radians about the y axis.
    pub fn rotated_y(angle: f64) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle),
            ),
        }
    }

    /// Pure rotation of `angle` radians about the z axis.
    pub fn rotated_z(angle: f64) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
            ),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

// ── Accessors ───────────────────────────────────────────────────────────────

impl Frame {
    /// Position of the frame origin in the parent system.
    pub fn origin(&self) -> Vector3<f64> {
        self.iso.translation.vector
    }

    /// Direction of the frame's x axis in the parent system.
    pub fn x_dir(&self) -> Vector3<f64> {
        self.iso.rotation * Vector3::x()
    }

    /// Direction of the frame's y axis in the parent system.
    pub fn y_dir(&self) -> Vector3<f64> {
        self.iso.rotation * Vector3::y()
    }

    /// Direction of the frame's z axis (the normal) in the parent system.
    pub fn z_dir(&self) -> Vector3<f64> {
        self.iso.rotation * Vector3::z()
    }
}

// ── Algebra ─────────────────────────────────────────────────────────────────

impl Frame {
    /// The inverse placement, mapping this frame's system back to its parent.
    pub fn inverse(&self) -> Self {
        Self {
            iso: self.iso.inverse(),
        }
    }

    /// This frame expressed in `other`'s coordinate system.
    ///
    /// Satisfies `other * a.relative_to(&other) == a`, so a world placement
    /// can be rebased onto any reference frame and recomposed exactly.
    pub fn relative_to(&self, other: &Frame) -> Self {
        Self {
            iso: other.iso.inverse() * self.iso,
        }
    }

    /// Map a point from this frame's local system to the parent system.
    pub fn to_world(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.iso.transform_point(&Point3::from(point)).coords
    }

    /// Map a point from the parent system into this frame's local system.
    pub fn to_local(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.iso.inverse_transform_point(&Point3::from(point)).coords
    }
}

/// Frame composition: `a * b` places `b` inside `a`'s system.
impl Mul for Frame {
    type Output = Frame;

    fn mul(self, rhs: Frame) -> Frame {
        Frame {
            iso: self.iso * rhs.iso,
        }
    }
}

// ── Matrix interchange ──────────────────────────────────────────────────────

impl Frame {
    /// The frame as a homogeneous 4x4 matrix (axes in columns 0..3, origin in
    /// column 3).
    pub fn to_matrix(&self) -> Matrix4<f64> {
        self.iso.to_homogeneous()
    }

    /// Rebuild a frame from a homogeneous matrix.
    ///
    /// The x and z columns are re-orthonormalized on the way in, so a matrix
    /// that drifted slightly from rigidity still yields a clean frame.
    pub fn from_matrix(m: &Matrix4<f64>) -> Result<Self, FrameError> {
        let origin = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
        let x_dir = Vector3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
        let normal = Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
        Self::new(origin, x_dir, normal)
    }
}

// ── Random frames ───────────────────────────────────────────────────────────

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn unit_interval(bits: u64) -> f64 {
    (bits >> 11) as f64 / (1u64 << 53) as f64
}

impl Frame {
    /// Deterministic pseudo-random frame with coordinates in `[-1, 1]`.
    ///
    /// The same seed always yields the same frame, so randomized tests can be
    /// replayed.
    pub fn random(seed: u64) -> Self {
        Self::random_span(seed, 1.0)
    }

    /// Deterministic pseudo-random frame with coordinates in `[-span, span]`.
    ///
    /// Draws are retried until the sampled axes are non-degenerate.
    pub fn random_span(seed: u64, span: f64) -> Self {
        let mut state = seed;
        loop {
            let mut draw = || span * (2.0 * unit_interval(splitmix64(&mut state)) - 1.0);
            let origin = Vector3::new(draw(), draw(), draw());
            let x_dir = Vector3::new(draw(), draw(), draw());
            let normal = Vector3::new(draw(), draw(), draw());
            if let Ok(frame) = Self::new(origin, x_dir, normal) {
                return frame;
            }
        }
    }
}

// ── Comparison and formatting ───────────────────────────────────────────────

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("origin", &self.origin())
            .field("x", &self.x_dir())
            .field("z", &self.z_dir())
            .finish()
    }
}

// Comparisons go through origin and axis directions rather than the raw
// quaternion: q and -q encode the same rotation and must compare equal.
impl AbsDiffEq for Frame {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.origin().abs_diff_eq(&other.origin(), epsilon)
            && self.x_dir().abs_diff_eq(&other.x_dir(), epsilon)
            && self.y_dir().abs_diff_eq(&other.y_dir(), epsilon)
            && self.z_dir().abs_diff_eq(&other.z_dir(), epsilon)
    }
}

impl RelativeEq for Frame {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.origin().relative_eq(&other.origin(), epsilon, max_relative)
            && self.x_dir().relative_eq(&other.x_dir(), epsilon, max_relative)
            && self.y_dir().relative_eq(&other.y_dir(), epsilon, max_relative)
            && self.z_dir().relative_eq(&other.z_dir(), epsilon, max_relative)
    }
}
