//! HTTP access to the prediction service.

mod client;
mod error;

pub use client::ApiClient;
pub use error::TransportError;
