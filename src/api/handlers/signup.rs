use super::types::{ErrorResponse, MessageResponse, SignupRequest};
use crate::{
    api::{email::EmailMessage, error::ApiError, AppState},
    otp,
    store::{self, UserRecord},
};
use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const SIGNUP_FAILED: &str = "Signup failed.";
pub const SIGNUP_OK: &str = "Signup successful. OTP sent!";

/// Email a fresh OTP, then store the full record and resync the cache.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "OTP sent and user stored", body = MessageResponse),
        (status = 400, description = "Body is not JSON", body = String),
        (status = 500, description = "Delivery or storage failed", body = ErrorResponse)
    ),
    tag = "signup"
)]
pub async fn signup(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::MissingPayload),
    };

    debug!("signup request: {:?}", request);

    let email = request.email.unwrap_or_default();
    let _guard = state.locks().lock(&email).await;

    let otp = otp::generate();

    // Deliver before persisting: a failed email must not leave a record behind.
    if let Err(err) = state
        .mailer()
        .send(&EmailMessage::signup_otp(&email, &otp))
        .await
    {
        error!(email = %email, "Failed to send signup OTP: {err}");
        return Err(ApiError::failed(SIGNUP_FAILED, err));
    }

    let record = UserRecord {
        email,
        name: request.name,
        password: request.password,
        otp,
    };

    if let Err(err) = state.store().upsert(&record).await {
        error!(email = %record.email, "Failed to store user: {err}");
        return Err(ApiError::failed(SIGNUP_FAILED, err));
    }

    if let Err(err) = store::resync(state.store(), state.cache()).await {
        error!(email = %record.email, "Failed to sync local cache: {err}");
        return Err(ApiError::failed(SIGNUP_FAILED, err));
    }

    info!(email = %record.email, "signup OTP sent");

    Ok((StatusCode::CREATED, Json(MessageResponse::new(SIGNUP_OK))))
}
