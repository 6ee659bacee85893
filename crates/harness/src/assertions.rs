//! Assertion helpers with diagnostic output.
//!
//! Every failure names the calling context and prints expected versus
//! actual values at full precision.

use nalgebra::Vector3;
use rig_core::{ComponentId, ComponentStore};
use rig_geom::Frame;

/// Comparison tolerance for placements produced by exact frame algebra.
pub const PLACEMENT_TOL: f64 = 1e-9;

/// Assert that `id` is placed with its origin at `expected`.
#[track_caller]
pub fn assert_origin_at(store: &ComponentStore, id: ComponentId, expected: [f64; 3], ctx: &str) {
    let Some(frame) = store.world_frame(id) else {
        panic!("[{ctx}] component {id:?} has no world placement");
    };
    let expected = Vector3::from(expected);
    let actual = frame.origin();
    if (actual - expected).norm() > PLACEMENT_TOL {
        panic!(
            "[{ctx}] origin mismatch for {id:?}:\n  expected {:?}\n  got      {:?}",
            expected, actual,
        );
    }
}

/// Assert that two frames agree in origin and all three axes.
#[track_caller]
pub fn assert_frames_eq(actual: &Frame, expected: &Frame, ctx: &str) {
    let checks = [
        ("origin", actual.origin(), expected.origin()),
        ("x axis", actual.x_dir(), expected.x_dir()),
        ("y axis", actual.y_dir(), expected.y_dir()),
        ("z axis", actual.z_dir(), expected.z_dir()),
    ];
    for (what, got, want) in checks {
        if (got - want).norm() > PLACEMENT_TOL {
            panic!(
                "[{ctx}] frame {what} mismatch:\n  expected {:?}\n  got      {:?}\nfull frames:\n  expected {expected:?}\n  got      {actual:?}",
                want, got,
            );
        }
    }
}

/// Assert that `id` exists but has not been placed.
#[track_caller]
pub fn assert_unplaced(store: &ComponentStore, id: ComponentId, ctx: &str) {
    assert!(store.contains(id), "[{ctx}] component {id:?} is not in the store");
    if let Some(frame) = store.world_frame(id) {
        panic!("[{ctx}] expected {id:?} to be unplaced, found {frame:?}");
    }
}
