use crate::{error::AppResult, models::Tag, schema::*, DbPool};
use axum::{routing::get, Extension, Json, Router};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TagResponse {
    tag_id: String,
    label: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            tag_id: tag.tag_id,
            label: tag.label,
        }
    }
}

async fn list(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<TagResponse>>> {
    let conn = &mut pool.get().await?;

    Ok(Json(
        tags::table
            .order(tags::label.asc())
            .load::<Tag>(conn)
            .await?
            .into_iter()
            .map(TagResponse::from)
            .collect(),
    ))
}

pub fn app() -> Router {
    Router::new().route("/list", get(list))
}
