pub mod error;
pub mod models;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use error::ApiError;
pub use error::ApiResult;
pub use service::ElevatorService;
