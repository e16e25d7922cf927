pub mod annotation;
pub mod detection;
pub mod device;
pub mod pipeline;
pub mod relay;
pub mod shared;
pub mod video;

/// Error type carried across trait seams that may cross thread boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
