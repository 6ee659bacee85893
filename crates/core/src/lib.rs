pub mod build;
pub mod component;
pub mod constraint;
pub mod error;
pub mod mate;
pub mod solve;
pub mod store;
pub mod tree;

pub use build::{BuildCtx, BuildReport, RoundReport};
pub use component::*;
pub use constraint::Constraint;
pub use error::*;
pub use mate::*;
pub use solve::*;
pub use store::*;
pub use tree::ComponentTree;
