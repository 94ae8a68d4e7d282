//! Meter ledger service.
//!
//! Owns the append-only reading chain per `(user, meter kind)`, the
//! verification sub-state, and the best-effort photo side effect.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use mockable::Clock;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::Error;
use super::guard::load_admin;
use super::meter::{MeterKind, MeterReading};
use super::ports::{
    MeterLedger, PhotoStore, ReadingFilter, ReadingGroup, ReadingPersistenceError,
    ReadingRepository, SubmitReading, UserRepository,
};
use super::user::{User, UserId};

/// Serialises submissions per `(user, kind)` so two concurrent submissions
/// for the same chain never observe the same head. Unrelated chains
/// proceed concurrently.
#[derive(Default)]
struct ChainLocks {
    inner: Mutex<HashMap<(UserId, MeterKind), Arc<tokio::sync::Mutex<()>>>>,
}

impl ChainLocks {
    fn handle(&self, key: (UserId, MeterKind)) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(map.entry(key).or_default())
    }
}

fn map_reading_error(error: ReadingPersistenceError) -> Error {
    Error::internal(format!("reading repository failure: {error}"))
}

/// Strip an optional `data:...;base64,` prefix and decode the payload.
fn decode_photo(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = payload
        .split_once(',')
        .map_or(payload, |(_, tail)| tail);
    BASE64.decode(encoded.trim())
}

/// Meter ledger service implementing the driving port.
#[derive(Clone)]
pub struct LedgerService<R, U, P> {
    readings: Arc<R>,
    users: Arc<U>,
    photos: Arc<P>,
    clock: Arc<dyn Clock>,
    chains: Arc<ChainLocks>,
}

impl<R, U, P> LedgerService<R, U, P> {
    /// Create a new service.
    pub fn new(readings: Arc<R>, users: Arc<U>, photos: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            readings,
            users,
            photos,
            clock,
            chains: Arc::new(ChainLocks::default()),
        }
    }
}

impl<R, U, P> LedgerService<R, U, P>
where
    R: ReadingRepository,
    U: UserRepository,
    P: PhotoStore,
{
    /// Decode and persist a photo payload; any failure is logged and the
    /// reading keeps an unset reference.
    async fn store_photo(&self, request: &SubmitReading) -> Option<String> {
        let payload = request.photo.as_deref()?;
        let bytes = match decode_photo(payload) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(user_id = %request.user_id, %error, "discarding undecodable photo payload");
                return None;
            }
        };
        let name = format!(
            "meter_{}_{}_{}.jpg",
            request.user_id,
            request.kind,
            self.clock.utc().format("%Y%m%d_%H%M%S"),
        );
        match self.photos.store(&name, &bytes).await {
            Ok(()) => Some(name),
            Err(error) => {
                warn!(user_id = %request.user_id, %error, "photo store write failed");
                None
            }
        }
    }
}

#[async_trait]
impl<R, U, P> MeterLedger for LedgerService<R, U, P>
where
    R: ReadingRepository,
    U: UserRepository,
    P: PhotoStore,
{
    async fn submit(&self, request: SubmitReading) -> Result<MeterReading, Error> {
        if !request.value.is_finite() {
            return Err(Error::invalid_request("value must be a finite number")
                .with_details(json!({ "field": "value" })));
        }

        let photo = self.store_photo(&request).await;

        let chain = self.chains.handle((request.user_id, request.kind));
        let _head_guard = chain.lock().await;

        let previous = self
            .readings
            .latest_for(request.user_id, request.kind)
            .await
            .map_err(map_reading_error)?;
        // A previous value of 0.0 is real history; only an empty chain
        // leaves the pair unset.
        let previous_value = previous.map(|head| head.value);
        let consumption = previous_value.map(|head| request.value - head);

        let now = self.clock.utc();
        let reading = MeterReading {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            kind: request.kind,
            value: request.value,
            previous_value,
            consumption,
            notes: request.notes,
            photo,
            is_verified: false,
            verified_by: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        };
        self.readings
            .insert(&reading)
            .await
            .map_err(map_reading_error)?;
        Ok(reading)
    }

    async fn verify(&self, admin_id: UserId, reading_id: Uuid) -> Result<MeterReading, Error> {
        let admin = load_admin(self.users.as_ref(), admin_id).await?;
        let reading = self
            .readings
            .find_by_id(reading_id)
            .await
            .map_err(map_reading_error)?
            .ok_or_else(|| Error::not_found("reading not found"))?;
        // Re-verification keeps the first stamp.
        if reading.is_verified {
            return Ok(reading);
        }
        self.readings
            .apply_verification(reading_id, &admin.display_name(), self.clock.utc())
            .await
            .map_err(map_reading_error)?
            .ok_or_else(|| Error::not_found("reading not found"))
    }

    async fn readings_for(&self, user_id: UserId) -> Result<Vec<ReadingGroup>, Error> {
        let readings = self
            .readings
            .list_for_user(user_id)
            .await
            .map_err(map_reading_error)?;
        let mut groups: Vec<ReadingGroup> = Vec::new();
        for reading in readings {
            match groups.iter_mut().find(|group| group.kind == reading.kind) {
                Some(group) => group.readings.push(reading),
                None => groups.push(ReadingGroup {
                    kind: reading.kind,
                    readings: vec![reading],
                }),
            }
        }
        Ok(groups)
    }

    async fn readings_admin(
        &self,
        admin_id: UserId,
        filter: ReadingFilter,
    ) -> Result<Vec<(MeterReading, User)>, Error> {
        load_admin(self.users.as_ref(), admin_id).await?;
        self.readings
            .list_filtered(&filter)
            .await
            .map_err(map_reading_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::fixtures::{fixed_instant, sample_admin, sample_reading, sample_user};
    use crate::domain::ports::{MockPhotoStore, MockReadingRepository, MockUserRepository};
    use mockable::MockClock;

    type Service = LedgerService<MockReadingRepository, MockUserRepository, MockPhotoStore>;

    fn service(
        readings: MockReadingRepository,
        users: MockUserRepository,
        photos: MockPhotoStore,
    ) -> Service {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixed_instant);
        LedgerService::new(
            Arc::new(readings),
            Arc::new(users),
            Arc::new(photos),
            Arc::new(clock),
        )
    }

    fn submit_request(user_id: UserId, value: f64) -> SubmitReading {
        SubmitReading {
            user_id,
            kind: MeterKind::Electricity,
            value,
            notes: None,
            photo: None,
        }
    }

    #[tokio::test]
    async fn first_reading_has_no_consumption() {
        let user_id = UserId::random();
        let mut readings = MockReadingRepository::new();
        readings.expect_latest_for().return_once(|_, _| Ok(None));
        readings.expect_insert().return_once(|_| Ok(()));

        let reading = service(readings, MockUserRepository::new(), MockPhotoStore::new())
            .submit(submit_request(user_id, 100.0))
            .await
            .expect("submission succeeds");
        assert_eq!(reading.previous_value, None);
        assert_eq!(reading.consumption, None);
    }

    #[tokio::test]
    async fn subsequent_reading_captures_the_chain_head() {
        let user_id = UserId::random();
        let mut readings = MockReadingRepository::new();
        readings.expect_latest_for().return_once(move |user, kind| {
            Ok(Some(sample_reading(user, kind, 100.0)))
        });
        readings
            .expect_insert()
            .withf(|reading: &MeterReading| {
                reading.previous_value == Some(100.0) && reading.consumption == Some(35.0)
            })
            .return_once(|_| Ok(()));

        let reading = service(readings, MockUserRepository::new(), MockPhotoStore::new())
            .submit(submit_request(user_id, 135.0))
            .await
            .expect("submission succeeds");
        assert_eq!(reading.consumption, Some(35.0));
    }

    #[tokio::test]
    async fn zero_valued_history_still_yields_consumption() {
        let user_id = UserId::random();
        let mut readings = MockReadingRepository::new();
        readings.expect_latest_for().return_once(move |user, kind| {
            Ok(Some(sample_reading(user, kind, 0.0)))
        });
        readings.expect_insert().return_once(|_| Ok(()));

        let reading = service(readings, MockUserRepository::new(), MockPhotoStore::new())
            .submit(submit_request(user_id, 12.0))
            .await
            .expect("submission succeeds");
        assert_eq!(reading.previous_value, Some(0.0));
        assert_eq!(reading.consumption, Some(12.0));
    }

    #[tokio::test]
    async fn non_finite_values_are_rejected() {
        let error = service(
            MockReadingRepository::new(),
            MockUserRepository::new(),
            MockPhotoStore::new(),
        )
        .submit(submit_request(UserId::random(), f64::NAN))
        .await
        .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn photo_failure_degrades_to_an_unset_reference() {
        let user_id = UserId::random();
        let mut readings = MockReadingRepository::new();
        readings.expect_latest_for().return_once(|_, _| Ok(None));
        readings
            .expect_insert()
            .withf(|reading: &MeterReading| reading.photo.is_none())
            .return_once(|_| Ok(()));
        let mut photos = MockPhotoStore::new();
        photos.expect_store().return_once(|_, _| {
            Err(crate::domain::ports::PhotoStoreError::write("disk full"))
        });

        let mut request = submit_request(user_id, 50.0);
        request.photo = Some(BASE64.encode(b"jpeg-bytes"));
        let reading = service(readings, MockUserRepository::new(), photos)
            .submit(request)
            .await
            .expect("submission still succeeds");
        assert!(reading.photo.is_none());
    }

    #[tokio::test]
    async fn stored_photos_keep_their_reference() {
        let user_id = UserId::random();
        let mut readings = MockReadingRepository::new();
        readings.expect_latest_for().return_once(|_, _| Ok(None));
        readings.expect_insert().return_once(|_| Ok(()));
        let mut photos = MockPhotoStore::new();
        photos
            .expect_store()
            .withf(|name: &str, bytes: &[u8]| name.ends_with(".jpg") && bytes == b"jpeg-bytes")
            .return_once(|_, _| Ok(()));

        let mut request = submit_request(user_id, 50.0);
        request.photo = Some(format!("data:image/jpeg;base64,{}", BASE64.encode(b"jpeg-bytes")));
        let reading = service(readings, MockUserRepository::new(), photos)
            .submit(request)
            .await
            .expect("submission succeeds");
        assert!(reading.photo.is_some_and(|name| name.starts_with("meter_")));
    }

    #[tokio::test]
    async fn verify_requires_the_admin_flag() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_user(id))));
        let mut readings = MockReadingRepository::new();
        readings.expect_apply_verification().times(0);

        let error = service(readings, users, MockPhotoStore::new())
            .verify(UserId::random(), Uuid::new_v4())
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn verify_stamps_the_admin_name() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut readings = MockReadingRepository::new();
        readings.expect_find_by_id().return_once(|id| {
            let mut reading = sample_reading(UserId::random(), MeterKind::Gas, 8.0);
            reading.id = id;
            Ok(Some(reading))
        });
        readings
            .expect_apply_verification()
            .withf(|_, verifier, _| verifier == "Pavel Orlov")
            .return_once(|id, verifier, at| {
                let mut reading = sample_reading(UserId::random(), MeterKind::Gas, 8.0);
                reading.id = id;
                reading.is_verified = true;
                reading.verified_by = Some(verifier.to_owned());
                reading.verified_at = Some(at);
                Ok(Some(reading))
            });

        let reading = service(readings, users, MockPhotoStore::new())
            .verify(UserId::random(), Uuid::new_v4())
            .await
            .expect("verification succeeds");
        assert!(reading.is_verified);
        assert_eq!(reading.verified_by.as_deref(), Some("Pavel Orlov"));
    }

    #[tokio::test]
    async fn second_verify_is_a_no_op() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut readings = MockReadingRepository::new();
        readings.expect_find_by_id().return_once(|id| {
            let mut reading = sample_reading(UserId::random(), MeterKind::Gas, 8.0);
            reading.id = id;
            reading.is_verified = true;
            reading.verified_by = Some("Earlier Admin".to_owned());
            Ok(Some(reading))
        });
        readings.expect_apply_verification().times(0);

        let reading = service(readings, users, MockPhotoStore::new())
            .verify(UserId::random(), Uuid::new_v4())
            .await
            .expect("no-op verification");
        assert!(reading.is_verified);
        assert_eq!(reading.verified_by.as_deref(), Some("Earlier Admin"));
    }

    #[tokio::test]
    async fn verify_missing_reading_is_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(sample_admin(id))));
        let mut readings = MockReadingRepository::new();
        readings.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(readings, users, MockPhotoStore::new())
            .verify(UserId::random(), Uuid::new_v4())
            .await
            .expect_err("not found");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn readings_group_by_kind_preserving_recency_order() {
        let user_id = UserId::random();
        let mut readings = MockReadingRepository::new();
        readings.expect_list_for_user().return_once(move |user| {
            Ok(vec![
                sample_reading(user, MeterKind::Electricity, 140.0),
                sample_reading(user, MeterKind::Gas, 9.0),
                sample_reading(user, MeterKind::Electricity, 120.0),
            ])
        });

        let groups = service(readings, MockUserRepository::new(), MockPhotoStore::new())
            .readings_for(user_id)
            .await
            .expect("listing succeeds");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, MeterKind::Electricity);
        assert_eq!(groups[0].readings.len(), 2);
        assert_eq!(groups[0].readings[0].value, 140.0);
        assert_eq!(groups[1].kind, MeterKind::Gas);
    }

    #[test]
    fn photo_decoding_handles_data_urls() {
        let encoded = format!("data:image/jpeg;base64,{}", BASE64.encode(b"abc"));
        assert_eq!(decode_photo(&encoded).expect("decodes"), b"abc");
        assert_eq!(
            decode_photo(&BASE64.encode(b"abc")).expect("decodes"),
            b"abc"
        );
    }
}
