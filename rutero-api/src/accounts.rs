use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use rutero_accounts::{AccountError, Credentials, ProfileChange, Registration, User};

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/accounts", post(register).get(get_account))
        .route("/v1/accounts/login", post(login))
        .route("/v1/accounts/update", post(update_account))
}

fn reject(err: AccountError) -> AppError {
    if err.is_caller_error() {
        AppError::BadRequest(err.to_string())
    } else {
        AppError::Anyhow(err.into())
    }
}

#[derive(Debug, Deserialize)]
struct AccountKeyParams {
    id: String,
    username: String,
}

/// Login response: the profile plus a session token for subsequent calls.
#[derive(Debug, Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: User,
    token: String,
}

async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<Json<User>, AppError> {
    let user = state.accounts.register(registration).await.map_err(reject)?;
    Ok(Json(user))
}

async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state.accounts.login(credentials).await.map_err(reject)?;
    let token = auth::issue_token(&user, &state.auth)?;

    Ok(Json(LoginResponse { user, token }))
}

async fn get_account(
    State(state): State<AppState>,
    Query(params): Query<AccountKeyParams>,
) -> Result<Json<User>, AppError> {
    let user = state
        .accounts
        .find(&params.id, &params.username)
        .await
        .map_err(reject)?
        .ok_or_else(|| {
            AppError::BadRequest("the account you're trying to fetch is non-existent".to_string())
        })?;
    Ok(Json(user))
}

async fn update_account(
    State(state): State<AppState>,
    Query(params): Query<AccountKeyParams>,
    Json(change): Json<ProfileChange>,
) -> Result<Json<User>, AppError> {
    let user = state
        .accounts
        .update(&params.id, &params.username, change)
        .await
        .map_err(reject)?;
    Ok(Json(user))
}
