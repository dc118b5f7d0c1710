use crate::{
    auth::ExtractAuth,
    error::{AppError, AppResult},
    pictures::{image_extension, PictureStore, MAX_PICTURE_BYTES},
    schema::*,
    DbPool,
};
use axum::{
    extract::Multipart,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use nanoid::nanoid;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PictureUploadResponse {
    picture_id: String,
}

#[derive(Insertable)]
#[diesel(table_name = account_pictures)]
struct NewPicture<'a> {
    picture_id: &'a str,
    account_id: &'a str,
    file_name: &'a str,
}

fn bad_request(message: &'static str) -> AppError {
    AppError::from(StatusCode::BAD_REQUEST, message)
}

fn too_large() -> AppError {
    AppError::from(StatusCode::PAYLOAD_TOO_LARGE, "picture is too large")
}

/// Pulls the single `image` field out of the form. Reading stops as soon as
/// the field grows past `MAX_PICTURE_BYTES`.
async fn single_image(multipart: &mut Multipart) -> AppResult<(Option<String>, Vec<u8>)> {
    let mut image = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("malformed multipart body"))?
    {
        if field.name() != Some("image") {
            continue;
        }
        if image.is_some() {
            return Err(bad_request("picture number not supported"));
        }
        let content_type = field.content_type().map(str::to_string);
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| bad_request("malformed multipart body"))?
        {
            if bytes.len() + chunk.len() > MAX_PICTURE_BYTES {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        image = Some((content_type, bytes));
    }
    image.ok_or_else(|| bad_request("picture number not supported"))
}

fn declared_as_image(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .map_or(false, |ct| ct.type_() == mime::IMAGE)
}

async fn upload(
    ExtractAuth(account): ExtractAuth,
    Extension(pool): Extension<DbPool>,
    Extension(store): Extension<PictureStore>,
    mut multipart: Multipart,
) -> AppResult<Json<PictureUploadResponse>> {
    let (content_type, bytes) = single_image(&mut multipart).await?;

    let extension = match image_extension(&bytes) {
        Some(ext) if declared_as_image(content_type.as_deref()) => ext,
        _ => return Err(bad_request("only picture uploads are supported")),
    };

    let picture_id = nanoid!();
    let file_name = format!("{picture_id}.{extension}");

    let conn = &mut pool.get().await?;

    let new_picture = NewPicture {
        picture_id: &picture_id,
        account_id: &account.account_id,
        file_name: &file_name,
    };
    let (store, bytes) = (&store, bytes.as_slice());

    // the row only commits once the file is on disk
    let saved = conn
        .transaction::<_, anyhow::Error, _>(|conn| {
            async move {
                let file_name = new_picture.file_name;
                diesel::insert_into(account_pictures::table)
                    .values(new_picture)
                    .execute(conn)
                    .await?;
                store.save(file_name, bytes).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await;

    if let Err(err) = saved {
        if let Err(cleanup) = store.remove(&file_name).await {
            tracing::debug!(error = %cleanup, file_name = %file_name, "no picture file to clean up");
        }
        return Err(err.into());
    }

    tracing::info!(
        account_id = %account.account_id,
        picture_id = %picture_id,
        size = bytes.len(),
        "picture uploaded"
    );
    Ok(Json(PictureUploadResponse { picture_id }))
}

pub fn app() -> Router {
    Router::new().route("/picture", post(upload))
}
