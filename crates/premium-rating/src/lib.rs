pub mod applications;
pub mod config;
pub mod error;
pub mod rating;
pub mod telemetry;

pub use error::AppError;
