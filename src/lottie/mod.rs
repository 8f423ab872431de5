//! Lottie document model: the JSON subset, animated properties and shape geometry.

pub mod ease;
pub mod geometry;
pub mod model;
pub mod property;
