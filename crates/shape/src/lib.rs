pub mod mock_kernel;
pub mod traits;
pub mod types;

pub use mock_kernel::{MockKernel, MockOp};
pub use traits::*;
pub use types::*;
