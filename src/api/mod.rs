pub mod client;
pub mod models;
pub mod response;

pub use client::{InferenceProvider, ReplicateClient};
pub use models::{ModelRef, Prediction, PredictionStatus};
