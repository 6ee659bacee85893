//! Ready-made parts, plans and assertion helpers for assembly tests.
//!
//! # Key Components
//!
//! - [`parts`] — parametric [`Brick`] and [`Cylinder`] definitions with
//!   shared mate tables
//! - [`plans`] — [`Stack`] and [`Tower`] assembly plans
//! - [`assertions`] — placement assertions with diagnostic output

pub mod assertions;
pub mod parts;
pub mod plans;

pub use parts::{Axial, Brick, Cylinder, axial_mates};
pub use plans::{Stack, Tower};
