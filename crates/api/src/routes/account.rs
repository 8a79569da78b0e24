//! Account route handlers: profile, password, addresses, wishlist.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use sundry_core::{AddressId, ProductId};

use crate::db::addresses::AddressInput;
use crate::db::{AddressRepository, ProductRepository, UserRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Address, ProductSummary, User};
use crate::response::{Created, Envelope};
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub label: Option<String>,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

impl AddressRequest {
    fn into_input(self) -> Result<AddressInput> {
        let input = AddressInput {
            label: self.label.unwrap_or_default(),
            recipient: self.recipient,
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            country: self.country,
            phone: self.phone,
        };

        for (field, value) in [
            ("recipient", &input.recipient),
            ("line1", &input.line1),
            ("city", &input.city),
            ("postal_code", &input.postal_code),
            ("country", &input.country),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{field} is required")));
            }
        }

        Ok(input)
    }
}

// =============================================================================
// Profile
// =============================================================================

/// GET /api/account/profile
#[instrument(skip(state, user))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Envelope<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Envelope::new(user))
}

/// PUT /api/account/profile
#[instrument(skip(state, user, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Envelope<User>> {
    let full_name = body.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::BadRequest("full_name is required".to_owned()));
    }

    let user = UserRepository::new(state.pool())
        .update_profile(user.id, full_name)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Envelope::new(user))
}

/// PUT /api/account/password
#[instrument(skip(state, user, body))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Envelope<Value>> {
    AuthService::new(state.pool(), state.email())
        .change_password(
            user.id,
            &user.email,
            &body.current_password,
            &body.new_password,
        )
        .await?;

    Ok(Envelope::new(json!({ "message": "password updated" })))
}

// =============================================================================
// Addresses
// =============================================================================

/// GET /api/account/addresses
#[instrument(skip(state, user))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Envelope<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Envelope::new(addresses))
}

/// POST /api/account/addresses
#[instrument(skip(state, user, body))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddressRequest>,
) -> Result<Created<Address>> {
    let input = body.into_input()?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    Ok(Created(address))
}

/// PUT /api/account/addresses/{id}
#[instrument(skip(state, user, body))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<Envelope<Address>> {
    let input = body.into_input()?;
    let address = AddressRepository::new(state.pool())
        .update(user.id, id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound("address not found".to_owned()))?;

    Ok(Envelope::new(address))
}

/// DELETE /api/account/addresses/{id}
#[instrument(skip(state, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Envelope<Value>> {
    if !AddressRepository::new(state.pool()).delete(user.id, id).await? {
        return Err(AppError::NotFound("address not found".to_owned()));
    }

    Ok(Envelope::new(json!({ "message": "address deleted" })))
}

/// POST /api/account/addresses/{id}/default
#[instrument(skip(state, user))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Envelope<Value>> {
    if !AddressRepository::new(state.pool())
        .set_default(user.id, id)
        .await?
    {
        return Err(AppError::NotFound("address not found".to_owned()));
    }

    Ok(Envelope::new(json!({ "message": "default address updated" })))
}

// =============================================================================
// Wishlist
// =============================================================================

/// GET /api/account/wishlist
#[instrument(skip(state, user))]
pub async fn wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Envelope<Vec<ProductSummary>>> {
    let products = WishlistRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Envelope::new(products))
}

/// POST /api/account/wishlist
#[instrument(skip(state, user))]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<WishlistRequest>,
) -> Result<Envelope<Value>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    WishlistRepository::new(state.pool())
        .add(user.id, product.id)
        .await?;

    Ok(Envelope::new(json!({ "message": "added to wishlist" })))
}

/// DELETE /api/account/wishlist/{product_id}
#[instrument(skip(state, user))]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Envelope<Value>> {
    if !WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?
    {
        return Err(AppError::NotFound("product not in wishlist".to_owned()));
    }

    Ok(Envelope::new(json!({ "message": "removed from wishlist" })))
}
