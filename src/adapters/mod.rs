// Adapters layer: concrete implementations for external systems.

pub mod local;
pub mod postgres;

#[cfg(feature = "cloud")]
pub mod s3;
