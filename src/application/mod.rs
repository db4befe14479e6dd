//! Application layer: Use cases and services.
//!
//! Each component receives the shared artifact bundle at construction and
//! never mutates it.

mod assembler;
mod encoder;
mod pipeline;
mod predictor;

pub use assembler::FeatureAssembler;
pub use encoder::{EncodedCategories, FeatureEncoder};
pub use pipeline::{HealthReport, PredictionPipeline};
pub use predictor::Predictor;
