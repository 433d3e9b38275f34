//! HTTP collaborator for the legacy Linode JSON API (`api_action` requests)

pub mod client;
pub mod common;
pub mod error;

#[cfg(test)]
mod test_helpers;

pub use client::{Client, RetryConfig, DEFAULT_ENDPOINT};
pub use common::{ApiErrorEntry, ApiParams, ApiResponse};
pub use error::ApiError;
