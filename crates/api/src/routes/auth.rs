//! Auth route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::response::{Created, Envelope};
use crate::services::auth::{AuthService, TokenPair};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// POST /api/auth/register
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Created<Value>> {
    let auth = AuthService::new(state.pool(), state.email());
    let user = auth
        .register(&body.email, &body.password, &body.full_name)
        .await?;

    Ok(Created(json!({
        "user": user,
        "message": "verification code sent",
    })))
}

/// POST /api/auth/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Envelope<Value>> {
    let auth = AuthService::new(state.pool(), state.email());
    let (user, tokens) = auth.login(&body.email, &body.password).await?;

    Ok(Envelope::new(json!({
        "user": user,
        "tokens": tokens,
    })))
}

/// POST /api/auth/verify-otp
#[instrument(skip(state, body))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Envelope<Value>> {
    let auth = AuthService::new(state.pool(), state.email());
    auth.verify_email_otp(&body.email, &body.code).await?;

    Ok(Envelope::new(json!({ "message": "email verified" })))
}

/// POST /api/auth/refresh
#[instrument(skip(state, body))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Envelope<TokenPair>> {
    let auth = AuthService::new(state.pool(), state.email());
    let tokens = auth.refresh(&body.refresh_token).await?;

    Ok(Envelope::new(tokens))
}

/// POST /api/auth/logout
#[instrument(skip(state, body))]
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Envelope<Value>> {
    let auth = AuthService::new(state.pool(), state.email());
    auth.logout(&body.refresh_token).await?;

    Ok(Envelope::new(json!({ "message": "logged out" })))
}

/// POST /api/auth/forgot-password
///
/// Always answers 200; whether the email has an account is not revealed.
#[instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Envelope<Value>> {
    let auth = AuthService::new(state.pool(), state.email());
    auth.forgot_password(&body.email).await?;

    Ok(Envelope::new(
        json!({ "message": "if the account exists, a reset code was sent" }),
    ))
}

/// POST /api/auth/reset-password
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Envelope<Value>> {
    let auth = AuthService::new(state.pool(), state.email());
    auth.reset_password(&body.email, &body.code, &body.new_password)
        .await?;

    Ok(Envelope::new(json!({ "message": "password updated" })))
}
