//! Deterministic in-memory stand-in for a real modeling kernel.
//!
//! Solids are tracked as bounding boxes plus an operation log, which is all
//! the placement layer's tests need to observe.

use nalgebra::Vector3;
use rig_geom::Frame;
use slotmap::SlotMap;

use crate::traits::ShapeKernel;
use crate::types::{Aabb, ShapeError, ShapeHandle};

/// One recorded kernel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    MakeBox,
    MakeCylinder,
    Transformed,
    Fuse,
    Cut,
}

#[derive(Debug, Clone)]
struct MockSolid {
    bounds: Aabb,
}

/// Shape kernel double backed by bounding boxes.
#[derive(Debug, Default)]
pub struct MockKernel {
    solids: SlotMap<ShapeHandle, MockSolid>,
    log: Vec<MockOp>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation performed since construction, in order.
    pub fn ops(&self) -> &[MockOp] {
        &self.log
    }

    /// Number of solids currently tracked.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn solid(&self, handle: ShapeHandle) -> Result<&MockSolid, ShapeError> {
        self.solids
            .get(handle)
            .ok_or(ShapeError::UnknownHandle { handle })
    }

    fn check_positive(name: &'static str, value: f64) -> Result<(), ShapeError> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(ShapeError::InvalidDimension { name, value })
        }
    }
}

impl ShapeKernel for MockKernel {
    fn make_box(
        &mut self,
        length: f64,
        width: f64,
        height: f64,
    ) -> Result<ShapeHandle, ShapeError> {
        Self::check_positive("length", length)?;
        Self::check_positive("width", width)?;
        Self::check_positive("height", height)?;
        self.log.push(MockOp::MakeBox);
        let half = Vector3::new(length, width, height) / 2.0;
        Ok(self.solids.insert(MockSolid {
            bounds: Aabb::new(-half, half),
        }))
    }

    fn make_cylinder(&mut self, radius: f64, height: f64) -> Result<ShapeHandle, ShapeError> {
        Self::check_positive("radius", radius)?;
        Self::check_positive("height", height)?;
        self.log.push(MockOp::MakeCylinder);
        let half = Vector3::new(radius, radius, height / 2.0);
        Ok(self.solids.insert(MockSolid {
            bounds: Aabb::new(-half, half),
        }))
    }

    fn transformed(
        &mut self,
        shape: ShapeHandle,
        frame: &Frame,
    ) -> Result<ShapeHandle, ShapeError> {
        let bounds = self.solid(shape)?.bounds.transformed(frame);
        self.log.push(MockOp::Transformed);
        Ok(self.solids.insert(MockSolid { bounds }))
    }

    fn fuse(&mut self, a: ShapeHandle, b: ShapeHandle) -> Result<ShapeHandle, ShapeError> {
        let bounds = self.solid(a)?.bounds.union(&self.solid(b)?.bounds);
        self.log.push(MockOp::Fuse);
        Ok(self.solids.insert(MockSolid { bounds }))
    }

    fn cut(&mut self, base: ShapeHandle, tool: ShapeHandle) -> Result<ShapeHandle, ShapeError> {
        // A cut never grows the base, so the base bounds stay valid.
        self.solid(tool)?;
        let bounds = self.solid(base)?.bounds;
        self.log.push(MockOp::Cut);
        Ok(self.solids.insert(MockSolid { bounds }))
    }

    fn bounding_box(&self, shape: ShapeHandle) -> Result<Aabb, ShapeError> {
        Ok(self.solid(shape)?.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_make_box_bounds() {
        let mut kernel = MockKernel::new();
        let handle = kernel.make_box(2.0, 4.0, 6.0).unwrap();
        let bounds = kernel.bounding_box(handle).unwrap();
        assert_eq!(bounds.min, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_make_cylinder_bounds() {
        let mut kernel = MockKernel::new();
        let handle = kernel.make_cylinder(1.5, 4.0).unwrap();
        let bounds = kernel.bounding_box(handle).unwrap();
        assert_eq!(bounds.min, Vector3::new(-1.5, -1.5, -2.0));
        assert_eq!(bounds.max, Vector3::new(1.5, 1.5, 2.0));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let mut kernel = MockKernel::new();
        assert!(matches!(
            kernel.make_box(0.0, 1.0, 1.0),
            Err(ShapeError::InvalidDimension { name: "length", .. })
        ));
        assert!(matches!(
            kernel.make_cylinder(1.0, -2.0),
            Err(ShapeError::InvalidDimension { name: "height", .. })
        ));
        assert_eq!(kernel.solid_count(), 0);
        assert!(kernel.ops().is_empty());
    }

    #[test]
    fn test_transformed_translates_bounds() {
        let mut kernel = MockKernel::new();
        let cube = kernel.make_box(2.0, 2.0, 2.0).unwrap();
        let moved = kernel
            .transformed(cube, &Frame::translation(10.0, 0.0, 1.0))
            .unwrap();
        let bounds = kernel.bounding_box(moved).unwrap();
        assert_abs_diff_eq!(bounds.min, Vector3::new(9.0, -1.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(bounds.max, Vector3::new(11.0, 1.0, 2.0), epsilon = 1e-9);
        // The source solid is untouched.
        assert_eq!(
            kernel.bounding_box(cube).unwrap().min,
            Vector3::new(-1.0, -1.0, -1.0)
        );
    }

    #[test]
    fn test_transformed_rotates_bounds() {
        let mut kernel = MockKernel::new();
        let slab = kernel.make_box(4.0, 2.0, 1.0).unwrap();
        let rotated = kernel
            .transformed(slab, &Frame::rotated_z(FRAC_PI_2))
            .unwrap();
        let bounds = kernel.bounding_box(rotated).unwrap();
        assert_abs_diff_eq!(bounds.size(), Vector3::new(2.0, 4.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_fuse_unions_bounds() {
        let mut kernel = MockKernel::new();
        let a = kernel.make_box(2.0, 2.0, 2.0).unwrap();
        let b = kernel.make_box(2.0, 2.0, 2.0).unwrap();
        let moved = kernel
            .transformed(b, &Frame::translation(3.0, 0.0, 0.0))
            .unwrap();
        let fused = kernel.fuse(a, moved).unwrap();
        let bounds = kernel.bounding_box(fused).unwrap();
        assert_abs_diff_eq!(bounds.min, Vector3::new(-1.0, -1.0, -1.0), epsilon = 1e-9);
        assert_abs_diff_eq!(bounds.max, Vector3::new(4.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_cut_keeps_base_bounds() {
        let mut kernel = MockKernel::new();
        let base = kernel.make_box(4.0, 4.0, 4.0).unwrap();
        let tool = kernel.make_box(1.0, 1.0, 1.0).unwrap();
        let cut = kernel.cut(base, tool).unwrap();
        assert_eq!(
            kernel.bounding_box(cut).unwrap(),
            kernel.bounding_box(base).unwrap()
        );
    }

    #[test]
    fn test_unknown_handle_is_rejected() {
        let mut kernel = MockKernel::new();
        let handle = kernel.make_box(1.0, 1.0, 1.0).unwrap();
        let mut other = MockKernel::new();
        assert!(matches!(
            other.bounding_box(handle),
            Err(ShapeError::UnknownHandle { .. })
        ));
        assert!(matches!(
            other.transformed(handle, &Frame::identity()),
            Err(ShapeError::UnknownHandle { .. })
        ));
    }

    #[test]
    fn test_op_log_records_order() {
        let mut kernel = MockKernel::new();
        let a = kernel.make_box(1.0, 1.0, 1.0).unwrap();
        let b = kernel.make_cylinder(0.5, 1.0).unwrap();
        let _ = kernel.cut(a, b).unwrap();
        assert_eq!(
            kernel.ops(),
            &[MockOp::MakeBox, MockOp::MakeCylinder, MockOp::Cut]
        );
    }
}
