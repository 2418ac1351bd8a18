pub mod backend;
pub mod mock_backend;

pub use backend::*;
pub use mock_backend::*;
