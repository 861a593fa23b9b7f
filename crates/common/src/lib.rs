pub mod error;
pub mod fsutil;
pub mod logging;

pub use error::VisionError;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, VisionError>;
