pub mod frame;

// Re-export the frame algebra at crate root for convenience.
pub use frame::{Frame, FrameError};

/// Global tolerance configuration for frame comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Lengths smaller than this are considered zero (model units).
    pub linear: f64,
    /// Angles smaller than this (radians) are considered zero.
    pub angular: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: 1e-9,
            angular: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.linear
    }

    pub fn is_zero_angle(&self, angle: f64) -> bool {
        angle.abs() < self.angular
    }
}

/// Process-wide default tolerance.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
