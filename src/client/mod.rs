// File: ./src/client/mod.rs
pub mod core;
pub mod error;
pub mod middleware;
pub mod service;

pub use crate::client::core::{ApiClient, DEFAULT_TIMEOUT};
pub use crate::client::error::ApiError;
pub use crate::client::service::EventService;
