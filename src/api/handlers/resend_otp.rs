use super::types::{ErrorResponse, MessageResponse, ResendOtpRequest};
use crate::{
    api::{email::EmailMessage, error::ApiError, AppState},
    otp, store,
};
use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const RESEND_FAILED: &str = "Failed to resend OTP.";
pub const RESEND_OK: &str = "OTP resent successfully.";

/// Replace the OTP of an existing user and email the new code.
#[utoipa::path(
    post,
    path = "/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "New OTP sent", body = MessageResponse),
        (status = 400, description = "Body is not JSON", body = String),
        (status = 404, description = "Email not found", body = MessageResponse),
        (status = 500, description = "Delivery or storage failed", body = ErrorResponse)
    ),
    tag = "signup"
)]
pub async fn resend_otp(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let request: ResendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(ApiError::MissingPayload),
    };

    let Some(email) = request.email else {
        debug!("resend-otp without email");
        return Err(ApiError::EmailNotFound);
    };

    let _guard = state.locks().lock(&email).await;

    match state.store().find(&email).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            debug!(email = %email, "resend-otp for unknown email");
            return Err(ApiError::EmailNotFound);
        }
        Err(err) => {
            error!(email = %email, "Failed to look up user: {err}");
            return Err(ApiError::failed(RESEND_FAILED, err));
        }
    }

    let otp = otp::generate();

    if let Err(err) = state
        .mailer()
        .send(&EmailMessage::resend_otp(&email, &otp))
        .await
    {
        error!(email = %email, "Failed to resend OTP: {err}");
        return Err(ApiError::failed(RESEND_FAILED, err));
    }

    if let Err(err) = state.store().set_otp(&email, &otp).await {
        error!(email = %email, "Failed to update OTP: {err}");
        return Err(ApiError::failed(RESEND_FAILED, err));
    }

    if let Err(err) = store::resync(state.store(), state.cache()).await {
        error!(email = %email, "Failed to sync local cache: {err}");
        return Err(ApiError::failed(RESEND_FAILED, err));
    }

    info!(email = %email, "OTP resent");

    Ok((StatusCode::OK, Json(MessageResponse::new(RESEND_OK))))
}
