use crate::{
    api::tag::TagResponse,
    auth::ExtractAuth,
    error::{AppError, AppResult},
    models::{AccountPicture, Club, ClubTag, Tag},
    pictures::picture_url,
    profile::{self, ProfileUpdate},
    schema::*,
    DbPool,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::{pg::AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClubResponse {
    club_id: String,
    name: String,
    website: Option<String>,
    email: Option<String>,
    group_link: Option<String>,
    video_link: Option<String>,
    description: Option<String>,
    published: bool,
    pictures: Vec<String>,
    tags: Vec<TagResponse>,
}

async fn load_clubs(
    conn: &mut AsyncPgConnection,
    clubs: Vec<Club>,
) -> AppResult<Vec<ClubResponse>> {
    let tags = club_tags::table
        .inner_join(tags::table)
        .filter(club_tags::club_id.eq_any(clubs.iter().map(|c| &c.club_id)))
        .order(tags::label.asc())
        .load::<(ClubTag, Tag)>(conn)
        .await?
        .grouped_by(&clubs);

    let picture_ids = clubs
        .iter()
        .flat_map(|c| c.picture_slots())
        .flatten()
        .collect::<Vec<_>>();
    let file_names = HashMap::<_, _>::from_iter(
        account_pictures::table
            .filter(account_pictures::picture_id.eq_any(&picture_ids))
            .load::<AccountPicture>(conn)
            .await?
            .into_iter()
            .map(|p| (p.picture_id, p.file_name)),
    );

    Ok(clubs
        .into_iter()
        .zip(tags)
        .map(|(club, tags)| {
            let pictures = club
                .picture_slots()
                .into_iter()
                .flatten()
                .filter_map(|id| file_names.get(id))
                .map(|name| picture_url(name))
                .collect();
            ClubResponse {
                pictures,
                tags: tags
                    .into_iter()
                    .map(|(_, tag)| TagResponse::from(tag))
                    .collect(),
                club_id: club.club_id,
                name: club.name,
                website: club.website,
                email: club.email,
                group_link: club.group_link,
                video_link: club.video_link,
                description: club.description,
                published: club.published,
            }
        })
        .collect())
}

async fn list(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<ClubResponse>>> {
    let conn = &mut pool.get().await?;

    let clubs = clubs::table
        .filter(clubs::published.eq(true))
        .order(clubs::name.asc())
        .load::<Club>(conn)
        .await?;

    Ok(Json(load_clubs(conn, clubs).await?))
}

async fn load_one(conn: &mut AsyncPgConnection, club: Club) -> AppResult<ClubResponse> {
    Ok(load_clubs(conn, vec![club])
        .await?
        .pop()
        .ok_or_else(|| anyhow::anyhow!("`load_clubs` should return one club"))?)
}

async fn info(
    Extension(pool): Extension<DbPool>,
    Path(club_id): Path<String>,
) -> AppResult<Json<ClubResponse>> {
    let conn = &mut pool.get().await?;

    let club = clubs::table
        .find(club_id)
        .filter(clubs::published.eq(true))
        .first::<Club>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "the club does not exist"))?;

    Ok(Json(load_one(conn, club).await?))
}

async fn own_info(
    ExtractAuth(account): ExtractAuth,
    Extension(pool): Extension<DbPool>,
) -> AppResult<Json<ClubResponse>> {
    let Some(club_id) = account.club_id else {
        return Err(AppError::from(
            StatusCode::NOT_FOUND,
            "this account does not manage a club",
        ));
    };

    let conn = &mut pool.get().await?;

    let club = clubs::table
        .find(club_id)
        .first::<Club>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "the club does not exist"))?;

    Ok(Json(load_one(conn, club).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubUpdateRequest {
    club_id: String,
    #[serde(flatten)]
    profile: ProfileUpdate,
}

async fn update_info(
    ExtractAuth(account): ExtractAuth,
    Extension(pool): Extension<DbPool>,
    Json(req): Json<ClubUpdateRequest>,
) -> AppResult<Json<()>> {
    profile::update_club_profile(&pool, &account, &req.club_id, &req.profile)
        .await
        .map_err(AppError::from_profile)?;

    Ok(Json(()))
}

pub fn app() -> Router {
    Router::new()
        .route("/list", get(list))
        .route("/info", get(own_info).post(update_info))
        .route("/info/:club_id", get(info))
}
