use rig_geom::Frame;

use crate::types::{Aabb, ShapeError, ShapeHandle};

/// A solid-modeling backend the placement layer drives.
///
/// Implementations own the solids; callers only hold [`ShapeHandle`]s. Every
/// operation is fallible so a backend can reject out-of-range input without
/// panicking.
pub trait ShapeKernel {
    /// Create a box with the given extents, centered on the local origin.
    fn make_box(&mut self, length: f64, width: f64, height: f64)
    -> Result<ShapeHandle, ShapeError>;

    /// Create a z-aligned cylinder, centered on the local origin.
    fn make_cylinder(&mut self, radius: f64, height: f64) -> Result<ShapeHandle, ShapeError>;

    /// Create a new solid by carrying an existing one through a placement.
    fn transformed(&mut self, shape: ShapeHandle, frame: &Frame)
    -> Result<ShapeHandle, ShapeError>;

    /// Boolean union of two solids.
    fn fuse(&mut self, a: ShapeHandle, b: ShapeHandle) -> Result<ShapeHandle, ShapeError>;

    /// Boolean subtraction of `tool` from `base`.
    fn cut(&mut self, base: ShapeHandle, tool: ShapeHandle) -> Result<ShapeHandle, ShapeError>;

    /// Axis-aligned bounds of a solid.
    fn bounding_box(&self, shape: ShapeHandle) -> Result<Aabb, ShapeError>;
}
