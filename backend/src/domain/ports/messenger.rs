//! Port abstraction for the external messaging gateway.
//!
//! The gateway is unreliable by contract: every delivery attempt may fail
//! independently, and the broadcaster treats a failure (including a
//! timeout) as an ordinary per-recipient outcome, never a batch error.

use async_trait::async_trait;

use crate::domain::user::ExternalId;

use super::define_port_error;

define_port_error! {
    /// Delivery failures reported by messaging gateway adapters.
    pub enum DeliveryError {
        /// The gateway answered and refused the message.
        Rejected { message: String } => "gateway rejected the message: {message}",
        /// The gateway could not be reached, or the call timed out.
        Transport { message: String } => "gateway transport failure: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Push one pre-rendered message to one external recipient.
    async fn deliver(&self, recipient: &ExternalId, text: &str) -> Result<(), DeliveryError>;
}
