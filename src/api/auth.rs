use crate::{
    auth::{self, RequestingAccount},
    error::{AppError, AppResult},
    models::Account,
    schema::*,
    DbPool,
};
use axum::{http::StatusCode, routing::post, Extension, Json, Router};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    pub account_id: String,
    pub auth_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    pub token: String,
    pub club_id: Option<String>,
    pub is_admin: bool,
}

impl LoginResponse {
    fn from_account(account: &Account) -> anyhow::Result<LoginResponse> {
        Ok(LoginResponse {
            // expires after one day
            token: auth::generate_jwt(
                &RequestingAccount::from(account),
                Duration::from_secs(24 * 60 * 60),
            )?,
            club_id: account.club_id.clone(),
            is_admin: account.is_admin,
        })
    }
}

async fn login(
    Extension(pool): Extension<DbPool>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let conn = &mut pool.get().await?;

    if let Some(account) = accounts::table
        .find(&req.account_id)
        .first::<Account>(conn)
        .await
        .optional()?
    {
        if auth::verify_password(req.auth_token, &account.auth_hash)? {
            tracing::info!(account_id = %account.account_id, "login");
            return Ok(Json(LoginResponse::from_account(&account)?));
        }
    }
    tracing::warn!(account_id = %req.account_id, "failed login attempt");
    Err(AppError::from(
        StatusCode::UNAUTHORIZED,
        "invalid account or token",
    ))
}

pub fn app() -> Router {
    Router::new().route("/login", post(login))
}
