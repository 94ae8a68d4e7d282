//! Port abstraction for the meter-photo blob store.
//!
//! Storage failure degrades gracefully: a reading whose photo cannot be
//! persisted is still recorded, with the reference left unset.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by blob store adapters.
    pub enum PhotoStoreError {
        /// The blob could not be written.
        Write { message: String } => "photo store write failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Persist decoded binary content under a generated name.
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), PhotoStoreError>;
}
