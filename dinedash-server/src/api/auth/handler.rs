//! Authentication Handlers
//!
//! Registration, login, and current-account lookup.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::AccountRole;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AccountView, RestaurantCreate};
use crate::db::repository::{AccountRepository, RestaurantRepository};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_email, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

const MIN_PASSWORD_LEN: usize = 8;

/// Role selection at registration. Staff registration carries the
/// restaurant it will own.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RegisterRole {
    Customer,
    Staff { restaurant: RestaurantCreate },
    Contractor,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(flatten)]
    pub role: RegisterRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub account: AccountView,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    validate_email(&req.email)?;
    validate_required_text(&req.display_name, "display_name", MAX_NAME_LEN)?;
    if req.password.len() < MIN_PASSWORD_LEN || req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }

    let accounts = AccountRepository::new(state.db.clone());

    let account = match req.role {
        RegisterRole::Customer => {
            accounts
                .create(
                    &req.email,
                    &req.display_name,
                    &req.password,
                    AccountRole::Customer,
                )
                .await?
        }
        RegisterRole::Contractor => {
            accounts
                .create(
                    &req.email,
                    &req.display_name,
                    &req.password,
                    AccountRole::Contractor,
                )
                .await?
        }
        RegisterRole::Staff { restaurant } => {
            validate_required_text(&restaurant.name, "restaurant name", MAX_NAME_LEN)?;

            // Account first, then its restaurant, then tag the role
            // with the restaurant it owns.
            let account = accounts
                .create(
                    &req.email,
                    &req.display_name,
                    &req.password,
                    AccountRole::Customer,
                )
                .await?;
            let account_id = account
                .id
                .clone()
                .ok_or_else(|| AppError::database("Account record without id"))?;

            let setup = async {
                let restaurants = RestaurantRepository::new(state.db.clone());
                let created = restaurants.create(account_id.clone(), restaurant).await?;
                let restaurant_key = created
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .ok_or_else(|| AppError::database("Restaurant record without id"))?;

                Ok::<_, AppError>(
                    accounts
                        .set_role(
                            &account_id.to_string(),
                            AccountRole::Staff {
                                restaurant: restaurant_key,
                            },
                        )
                        .await?,
                )
            };
            match setup.await {
                Ok(account) => account,
                Err(err) => {
                    // Back out the account so the email is free for a retry
                    if let Err(cleanup) = accounts.delete(&account_id.to_string()).await {
                        tracing::error!(error = %cleanup, "Failed to remove half-registered account");
                    }
                    return Err(err);
                }
            }
        }
    };

    let view = AccountView::from(&account);
    let token = issue_token(&state, &view, &account.role)?;
    tracing::info!(email = %account.email, role = %account.role.label(), "Account registered");

    Ok(ok(LoginResponse {
        token,
        account: view,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    let accounts = AccountRepository::new(state.db.clone());
    let account = accounts.find_by_email(&req.email).await?;

    // Fixed delay before inspecting the result, prevents timing attacks
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match account {
        Some(a) if a.is_active => a,
        Some(_) => return Err(AppError::forbidden("Account has been disabled")),
        None => {
            tracing::warn!(target: "security", email = %req.email, "Login failed, unknown email");
            return Err(AppError::invalid_credentials());
        }
    };

    let valid = account
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        tracing::warn!(target: "security", email = %req.email, "Login failed, bad password");
        return Err(AppError::invalid_credentials());
    }

    let view = AccountView::from(&account);
    let token = issue_token(&state, &view, &account.role)?;
    Ok(ok(LoginResponse {
        token,
        account: view,
    }))
}

/// GET /api/auth/me
pub async fn me(user: CurrentUser) -> AppResult<Json<AppResponse<AccountView>>> {
    Ok(ok(AccountView {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
    }))
}

fn issue_token(
    state: &ServerState,
    view: &AccountView,
    role: &AccountRole,
) -> AppResult<String> {
    state
        .jwt_service
        .generate_token(&view.id, &view.email, &view.display_name, role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))
}
