pub mod client;
pub mod error;
pub mod session;
pub mod singleflight;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use session::SessionStore;
pub use singleflight::Singleflight;
pub use types::*;
