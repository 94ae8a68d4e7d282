//! Signed bearer-token issuing and verification.
//!
//! Credentials are HS256 JWTs carrying the user id and a 30-day expiry.
//! The codec is pure: it never touches storage, so the identity service
//! layers the "user still exists" check on top.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::UserId;

/// Token lifetime matching the source system's 30-day sessions.
const TOKEN_TTL_DAYS: i64 = 30;

/// Process-wide signing secret.
///
/// The raw bytes are wiped on drop; logs only ever see the fingerprint.
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Short SHA-256 fingerprint safe to log at startup.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        let mut rendered = hex::encode(digest);
        rendered.truncate(12);
        rendered
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// Reasons a credential fails verification.
///
/// The distinction exists for observability only; callers collapse every
/// variant to a uniform unauthorised outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("credential is expired")]
    Expired,
    #[error("credential is malformed or carries a bad signature")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: uuid::Uuid,
    exp: i64,
}

/// Issues and verifies signed bearer credentials.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    fingerprint: String,
}

impl TokenCodec {
    /// Build a codec from the process-wide secret.
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            fingerprint: secret.fingerprint(),
        }
    }

    /// Fingerprint of the signing secret for startup logging.
    pub fn fingerprint(&self) -> &str {
        self.fingerprint.as_str()
    }

    /// Issue a credential for the given user, valid for 30 days from `now`.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.as_uuid(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Invalid)
    }

    /// Verify a credential and extract the user id it references.
    pub fn verify(&self, credential: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(credential, &self.decoding, &Validation::default()).map_err(
            |error| match error.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;
        Ok(UserId::from_uuid(data.claims.sub))
    }
}
