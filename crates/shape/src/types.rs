use nalgebra::Vector3;
use rig_geom::Frame;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle to a solid owned by a shape kernel.
    /// Valid only for the kernel session that produced it; never persisted.
    pub struct ShapeHandle;
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Aabb {
    /// Box spanning the two corners; the corners may be given in any order.
    pub fn new(a: Vector3<f64>, b: Vector3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Smallest box containing every point in the iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vector3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min = bounds.min.inf(&p);
            bounds.max = bounds.max.sup(&p);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn contains(&self, point: Vector3<f64>) -> bool {
        self.min.inf(&point) == self.min && self.max.sup(&point) == self.max
    }

    /// Smallest box containing both operands.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// The eight corner points.
    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned bounds of this box carried through a placement.
    pub fn transformed(&self, frame: &Frame) -> Aabb {
        let corners = self.corners();
        let mut min = frame.to_world(corners[0]);
        let mut max = min;
        for corner in &corners[1..] {
            let p = frame.to_world(*corner);
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Aabb { min, max }
    }
}

/// Errors from shape kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShapeError {
    #[error("unknown shape handle: {handle:?}")]
    UnknownHandle { handle: ShapeHandle },

    #[error("shape dimension must be positive: {name} = {value}")]
    InvalidDimension { name: &'static str, value: f64 },
}
