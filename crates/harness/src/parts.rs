//! Ready-made part definitions for assembly tests and demos.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

use rig_core::{MateRegistry, PartDef};
use rig_geom::Frame;
use rig_shape::{ShapeError, ShapeHandle, ShapeKernel};
use serde::{Deserialize, Serialize};

/// Parts whose mate scheme runs along their own z axis.
pub trait Axial {
    fn height(&self) -> f64;
}

/// Mate table shared by every axial part: `origin`, `top` and `bottom`.
///
/// `top` and `bottom` keep the part's orientation, so stacking one part's
/// `bottom` onto another's `top` piles them up without flipping.
pub fn axial_mates<T: Axial>() -> MateRegistry<T> {
    MateRegistry::new()
        .with("top", |part: &T| {
            Frame::translation(0.0, 0.0, part.height() / 2.0)
        })
        .with("bottom", |part: &T| {
            Frame::translation(0.0, 0.0, -part.height() / 2.0)
        })
}

/// Rectangular solid centered on its origin, with a mate on every face.
///
/// `length`, `width` and `height` run along x, y and z. The four side
/// mates point z out of their face and x up the brick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Brick {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    pub fn cube(size: f64) -> Self {
        Self::new(size, size, size)
    }

    pub fn registry() -> &'static MateRegistry<Brick> {
        static REGISTRY: OnceLock<MateRegistry<Brick>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            axial_mates()
                .with("pos_x", |b: &Brick| {
                    Frame::translation(b.length / 2.0, 0.0, 0.0)
                        * Frame::rotated_y(-FRAC_PI_2)
                        * Frame::rotated_x(PI)
                })
                .with("neg_x", |b: &Brick| {
                    Frame::translation(-b.length / 2.0, 0.0, 0.0) * Frame::rotated_y(-FRAC_PI_2)
                })
                .with("pos_y", |b: &Brick| {
                    Frame::translation(0.0, b.width / 2.0, 0.0)
                        * Frame::rotated_x(-FRAC_PI_2)
                        * Frame::rotated_z(-FRAC_PI_2)
                })
                .with("neg_y", |b: &Brick| {
                    Frame::translation(0.0, -b.width / 2.0, 0.0)
                        * Frame::rotated_x(FRAC_PI_2)
                        * Frame::rotated_z(FRAC_PI_2)
                })
        })
    }
}

impl Axial for Brick {
    fn height(&self) -> f64 {
        self.height
    }
}

impl PartDef for Brick {
    fn make(&self, kernel: &mut dyn ShapeKernel) -> Result<ShapeHandle, ShapeError> {
        kernel.make_box(self.length, self.width, self.height)
    }

    fn local_mate(&self, name: &str) -> Option<Frame> {
        Self::registry().local(self, name)
    }

    fn mate_names(&self) -> Vec<&'static str> {
        Self::registry().names()
    }
}

/// Upright cylinder centered on its origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub radius: f64,
    pub height: f64,
}

impl Cylinder {
    pub fn new(radius: f64, height: f64) -> Self {
        Self { radius, height }
    }

    pub fn registry() -> &'static MateRegistry<Cylinder> {
        static REGISTRY: OnceLock<MateRegistry<Cylinder>> = OnceLock::new();
        REGISTRY.get_or_init(axial_mates)
    }
}

impl Axial for Cylinder {
    fn height(&self) -> f64 {
        self.height
    }
}

impl PartDef for Cylinder {
    fn make(&self, kernel: &mut dyn ShapeKernel) -> Result<ShapeHandle, ShapeError> {
        kernel.make_cylinder(self.radius, self.height)
    }

    fn local_mate(&self, name: &str) -> Option<Frame> {
        Self::registry().local(self, name)
    }

    fn mate_names(&self) -> Vec<&'static str> {
        Self::registry().names()
    }
}
