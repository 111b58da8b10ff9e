//! Runtime utilities.

pub mod ids;

pub use ids::CorrelationId;
