use crate::{
    auth::AdminOnly,
    error::{AppError, AppResult},
    models::{Account, Tag},
    provision,
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

pub const TAG_LABEL_MAX: usize = 40;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountCreatedResponse {
    account_id: String,
    club_id: Option<String>,
    auth_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    account_id: String,
    club_id: Option<String>,
    is_admin: bool,
    created_at: NaiveDateTime,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            club_id: account.club_id,
            is_admin: account.is_admin,
            created_at: account.created_at,
        }
    }
}

async fn create_account(
    AdminOnly: AdminOnly,
    Extension(pool): Extension<DbPool>,
) -> AppResult<Json<AccountCreatedResponse>> {
    let conn = &mut pool.get().await?;

    let provisioned = provision::club_account(conn).await?;

    Ok(Json(AccountCreatedResponse {
        account_id: provisioned.account.account_id,
        club_id: provisioned.account.club_id,
        auth_token: provisioned.auth_token,
    }))
}

async fn list_accounts(
    AdminOnly: AdminOnly,
    Extension(pool): Extension<DbPool>,
) -> AppResult<Json<Vec<AccountResponse>>> {
    let conn = &mut pool.get().await?;

    Ok(Json(
        accounts::table
            .order(accounts::created_at.asc())
            .load::<Account>(conn)
            .await?
            .into_iter()
            .map(AccountResponse::from)
            .collect(),
    ))
}

async fn account_info(
    AdminOnly: AdminOnly,
    Extension(pool): Extension<DbPool>,
    Path(account_id): Path<String>,
) -> AppResult<Json<AccountResponse>> {
    let conn = &mut pool.get().await?;

    let account = accounts::table
        .find(account_id)
        .first::<Account>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "the account does not exist"))?;

    Ok(Json(account.into()))
}

#[derive(Deserialize)]
struct TagRequest {
    label: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TagCreatedResponse {
    tag_id: String,
    label: String,
}

async fn create_tag(
    AdminOnly: AdminOnly,
    Extension(pool): Extension<DbPool>,
    Json(req): Json<TagRequest>,
) -> AppResult<Json<TagCreatedResponse>> {
    let label = req.label.trim();
    if label.is_empty() {
        return Err(AppError::from(StatusCode::BAD_REQUEST, "label is required"));
    }
    if label.chars().count() > TAG_LABEL_MAX {
        return Err(AppError::from(
            StatusCode::BAD_REQUEST,
            format!("label must be at most {TAG_LABEL_MAX} characters"),
        ));
    }

    let conn = &mut pool.get().await?;

    let tag = diesel::insert_into(tags::table)
        .values(Tag {
            tag_id: nanoid!(),
            label: label.to_string(),
        })
        .on_conflict(tags::label)
        .do_nothing()
        .get_result::<Tag>(conn)
        .await
        .optional()?;

    let Some(tag) = tag else {
        return Err(AppError::from(StatusCode::CONFLICT, "tag already exists"));
    };

    tracing::info!(tag_id = %tag.tag_id, label = %tag.label, "created tag");
    Ok(Json(TagCreatedResponse {
        tag_id: tag.tag_id,
        label: tag.label,
    }))
}

pub fn app() -> Router {
    Router::new()
        .route("/account/create", post(create_account))
        .route("/account/all", get(list_accounts))
        .route("/account/user/:account_id", get(account_info))
        .route("/tag/create", post(create_tag))
}
