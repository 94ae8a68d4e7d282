//! Authentication endpoint.
//!
//! ```text
//! POST /api/auth/telegram
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::ExternalLogin;
use crate::domain::user::ExternalId;

use super::error::ApiResult;
use super::schemas::UserView;
use super::state::HttpState;
use super::validation::missing_field_error;

/// The login callback delivers the external chat id either as a number or
/// as a string; both are accepted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ExternalIdField {
    Number(i64),
    Text(String),
}

impl ExternalIdField {
    fn into_string(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

/// Login payload from the messaging platform's web-app callback.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelegramAuthRequest {
    pub id: Option<ExternalIdField>,
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// Authenticate against the external identity, creating the user on first
/// sight, and issue a bearer credential.
#[utoipa::path(
    post,
    path = "/api/auth/telegram",
    request_body = TelegramAuthRequest,
    responses(
        (status = 200, description = "Issued credential and resolved profile"),
        (status = 400, description = "Payload lacks the external identity"),
    ),
    tags = ["auth"]
)]
#[post("/auth/telegram")]
pub async fn telegram_auth(
    state: web::Data<HttpState>,
    payload: web::Json<TelegramAuthRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let raw_id = payload
        .id
        .ok_or_else(|| missing_field_error("id"))?
        .into_string();
    let external_id =
        ExternalId::new(raw_id).map_err(|_| missing_field_error("id"))?;

    let outcome = state
        .identity
        .login(ExternalLogin {
            external_id,
            first_name: payload.first_name.unwrap_or_default(),
            last_name: payload.last_name,
            username: payload.username,
        })
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "token": outcome.token,
        "user": UserView::from(outcome.user),
    })))
}
