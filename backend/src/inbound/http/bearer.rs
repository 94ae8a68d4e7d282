//! Bearer-credential extractor applied uniformly to protected handlers.
//!
//! Concentrates the "strip the Bearer prefix and resolve the identity"
//! logic in one place so every handler receives an already-resolved user id
//! instead of a raw credential string.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::Error;
use crate::domain::user::UserId;

use super::error::ApiError;
use super::state::HttpState;

/// A resolved, authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub UserId);

fn bearer_credential(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let credential = bearer_credential(req);
        Box::pin(async move {
            let state = state
                .ok_or_else(|| ApiError::from(Error::internal("HTTP state not configured")))?;
            let credential = credential
                .ok_or_else(|| ApiError::from(Error::unauthorized("missing bearer credential")))?;
            let user_id = state.identity.authenticate(&credential).await?;
            Ok(Self(user_id))
        })
    }
}
