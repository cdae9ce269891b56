// Domain layer - Core models and pure rendering
pub mod dashboard;
pub mod error;
pub mod vehicle;
