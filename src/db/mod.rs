//! Durable key/value storage behind the history log.

use std::future::Future;

use anyhow::Result;

mod connection;
mod memory;
mod migrations;

pub use connection::Database;
pub use memory::MemoryStore;

/// String values under string keys.
///
/// `update` is a read-modify-write against the value stored at the moment it
/// runs; no other write to the same store can interleave with it.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;

    fn update<F>(&self, key: &str, apply: F) -> impl Future<Output = Result<String>> + Send
    where
        F: FnOnce(Option<String>) -> Result<String> + Send + 'static;
}
