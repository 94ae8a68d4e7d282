//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend on
//! domain ports only and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Broadcaster, CatalogRepository, ComplaintDesk, Identity, MeterLedger, Reporting,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn Identity>,
    pub ledger: Arc<dyn MeterLedger>,
    pub complaints: Arc<dyn ComplaintDesk>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub reports: Arc<dyn Reporting>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl HttpState {
    /// Construct state from the port bundle.
    pub fn new(
        identity: Arc<dyn Identity>,
        ledger: Arc<dyn MeterLedger>,
        complaints: Arc<dyn ComplaintDesk>,
        broadcaster: Arc<dyn Broadcaster>,
        reports: Arc<dyn Reporting>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            identity,
            ledger,
            complaints,
            broadcaster,
            reports,
            catalog,
        }
    }
}
