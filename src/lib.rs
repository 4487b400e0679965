pub mod config;
pub mod engine;
pub mod error;
pub mod feature_store;
pub mod features;
pub mod metrics;
pub mod model;
pub mod routes;
pub mod sampler;
pub mod types;

pub use engine::{Prediction, PredictionEngine};
pub use error::AppError;
