//! Admin coupon CRUD.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::{CouponId, Money};

use crate::db::{CouponRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Coupon;
use crate::response::{Created, Envelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub percent_off: Option<Decimal>,
    pub amount_off: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCouponRequest {
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/coupons
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Envelope<Vec<Coupon>>> {
    let coupons = CouponRepository::new(state.pool()).list_all().await?;
    Ok(Envelope::new(coupons))
}

/// POST /api/admin/coupons
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateCouponRequest>,
) -> Result<Created<Coupon>> {
    if body.code.trim().is_empty() {
        return Err(AppError::BadRequest("code is required".to_owned()));
    }

    // Exactly one discount form
    match (body.percent_off, body.amount_off) {
        (Some(_), Some(_)) | (None, None) => {
            return Err(AppError::BadRequest(
                "set exactly one of percent_off or amount_off".to_owned(),
            ));
        }
        (Some(percent), None) if percent <= Decimal::ZERO || percent > Decimal::from(100) => {
            return Err(AppError::BadRequest(
                "percent_off must be in (0, 100]".to_owned(),
            ));
        }
        (None, Some(amount)) if amount <= Decimal::ZERO => {
            return Err(AppError::BadRequest(
                "amount_off must be positive".to_owned(),
            ));
        }
        _ => {}
    }

    let coupon = CouponRepository::new(state.pool())
        .create(
            body.code.trim(),
            body.percent_off,
            body.amount_off.map(Money::new),
            body.expires_at,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => other.into(),
        })?;

    Ok(Created(coupon))
}

/// PUT /api/admin/coupons/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CouponId>,
    Json(body): Json<UpdateCouponRequest>,
) -> Result<Envelope<Coupon>> {
    let coupon = CouponRepository::new(state.pool())
        .update(id, body.expires_at, body.is_active.unwrap_or(true))
        .await?
        .ok_or_else(|| AppError::NotFound("coupon not found".to_owned()))?;

    Ok(Envelope::new(coupon))
}

/// DELETE /api/admin/coupons/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CouponId>,
) -> Result<Envelope<Value>> {
    if !CouponRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("coupon not found".to_owned()));
    }

    Ok(Envelope::new(json!({ "message": "coupon deleted" })))
}
