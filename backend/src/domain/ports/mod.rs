//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, the messaging gateway, the photo store) are
//! implemented by outbound adapters; driving ports (use-case traits) are
//! implemented by the domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod broadcaster;
mod catalog_repository;
mod complaint_desk;
mod complaint_repository;
mod identity;
mod messenger;
mod meter_ledger;
mod notification_repository;
mod photo_store;
mod reading_repository;
mod reporting;
mod user_repository;

#[cfg(test)]
pub use broadcaster::MockBroadcaster;
pub use broadcaster::{Broadcaster, BroadcastRequest, MessagingStats, NotificationView};
#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{CatalogPersistenceError, CatalogRepository};
#[cfg(test)]
pub use complaint_desk::MockComplaintDesk;
pub use complaint_desk::{ComplaintDesk, CreateComplaint};
#[cfg(test)]
pub use complaint_repository::MockComplaintRepository;
pub use complaint_repository::{ComplaintChanges, ComplaintPersistenceError, ComplaintRepository};
#[cfg(test)]
pub use identity::MockIdentity;
pub use identity::{ExternalLogin, Identity, LoginOutcome};
#[cfg(test)]
pub use messenger::MockMessenger;
pub use messenger::{DeliveryError, Messenger};
#[cfg(test)]
pub use meter_ledger::MockMeterLedger;
pub use meter_ledger::{MeterLedger, ReadingGroup, SubmitReading};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
#[cfg(test)]
pub use photo_store::MockPhotoStore;
pub use photo_store::{PhotoStore, PhotoStoreError};
#[cfg(test)]
pub use reading_repository::MockReadingRepository;
pub use reading_repository::{ReadingFilter, ReadingPersistenceError, ReadingRepository};
#[cfg(test)]
pub use reporting::MockReporting;
pub use reporting::{
    AdminStats, ExportKind, LastReading, Reporting, ResidentRow, TabularReport,
    UnknownExportKindError, UserStats,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{BuildingRef, UserPersistenceError, UserRepository};
