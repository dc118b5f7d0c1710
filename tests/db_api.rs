//! HTTP round trips against a real Postgres.
//!
//! Set `TEST_DATABASE_URL` to run these; without it every test returns early.

mod common;

use axum::{
    http::{Method, StatusCode},
    Router,
};
use club_hub::{pictures::PictureStore, provision, schema::*, DbPool};
use common::{body_json, db_app, json_request, multipart_request, token_for};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::{json, Value};
use std::path::PathBuf;
use tower::ServiceExt;

const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

fn picture_dir() -> PathBuf {
    std::env::temp_dir().join(format!("club_hub_db_pictures_{}", nanoid::nanoid!()))
}

async fn club_account(pool: &DbPool) -> (String, String) {
    let conn = &mut pool.get().await.expect("connect");
    let provisioned = provision::club_account(conn).await.expect("provision account");
    let club_id = provisioned.account.club_id.expect("club account has a club");
    (provisioned.account.account_id, club_id)
}

async fn insert_picture(pool: &DbPool, account_id: &str) -> String {
    let conn = &mut pool.get().await.expect("connect");
    let picture_id = nanoid::nanoid!();
    diesel::insert_into(account_pictures::table)
        .values((
            account_pictures::picture_id.eq(&picture_id),
            account_pictures::account_id.eq(account_id),
            account_pictures::file_name.eq(format!("{picture_id}.png")),
        ))
        .execute(conn)
        .await
        .expect("insert picture");
    picture_id
}

async fn picture_rows(pool: &DbPool, account_id: &str) -> Vec<(String, String)> {
    let conn = &mut pool.get().await.expect("connect");
    account_pictures::table
        .filter(account_pictures::account_id.eq(account_id))
        .select((account_pictures::picture_id, account_pictures::file_name))
        .load(conn)
        .await
        .expect("load pictures")
}

async fn call(app: &Router, req: axum::http::Request<axum::body::Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("call app");
    let status = resp.status();
    (status, body_json(resp).await)
}

#[tokio::test]
async fn upload_stores_row_and_file() {
    let Some(pool) = common::test_pool().await else { return };
    let (account_id, club_id) = club_account(&pool).await;
    let dir = picture_dir();
    let store = PictureStore::new(&dir);
    store.ensure_root().await.expect("create picture dir");
    let app = db_app(pool.clone(), store);

    let token = token_for(&account_id, Some(&club_id), false);
    let (status, body) = call(
        &app,
        multipart_request(&token, &[("image", "image/png", PNG)]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = picture_rows(&pool, &account_id).await;
    assert_eq!(rows.len(), 1);
    let (picture_id, file_name) = &rows[0];
    assert_eq!(body["pictureId"], picture_id.as_str());
    assert_eq!(file_name, &format!("{picture_id}.png"));
    assert_eq!(
        tokio::fs::read(dir.join(file_name)).await.expect("stored file"),
        PNG
    );

    tokio::fs::remove_dir_all(&dir).await.expect("clean up");
}

#[tokio::test]
async fn failed_file_write_leaves_no_row() {
    let Some(pool) = common::test_pool().await else { return };
    let (account_id, club_id) = club_account(&pool).await;
    // never created, so every write fails
    let app = db_app(pool.clone(), PictureStore::new(picture_dir()));

    let token = token_for(&account_id, Some(&club_id), false);
    let (status, _) = call(
        &app,
        multipart_request(&token, &[("image", "image/png", PNG)]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(picture_rows(&pool, &account_id).await.is_empty());
}

#[tokio::test]
async fn published_club_is_browsable_with_pictures_in_slot_order() {
    let Some(pool) = common::test_pool().await else { return };
    let (account_id, club_id) = club_account(&pool).await;
    let (_, hidden_club) = club_account(&pool).await;
    let first = insert_picture(&pool, &account_id).await;
    let second = insert_picture(&pool, &account_id).await;
    let app = db_app(pool.clone(), PictureStore::new(picture_dir()));

    let token = token_for(&account_id, Some(&club_id), false);
    let update = json!({
        "clubId": club_id,
        "name": "Chess Club",
        "description": "We play chess.",
        "published": true,
        "pictureIds": [second, first],
    })
    .to_string();
    let (status, _) = call(
        &app,
        json_request(Method::POST, "/api/club/info", Some(&token), &update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let expected_pictures = json!([
        format!("/static/clubphoto/{second}.png"),
        format!("/static/clubphoto/{first}.png"),
    ]);

    let (status, own) = call(
        &app,
        json_request(Method::GET, "/api/club/info", Some(&token), ""),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["name"], "Chess Club");
    assert_eq!(own["pictures"], expected_pictures);

    let (status, public) = call(
        &app,
        json_request(Method::GET, &format!("/api/club/info/{club_id}"), None, ""),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["description"], "We play chess.");
    assert_eq!(public["pictures"], expected_pictures);

    let (status, _) = call(
        &app,
        json_request(Method::GET, &format!("/api/club/info/{hidden_club}"), None, ""),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = call(
        &app,
        json_request(Method::GET, "/api/club/list", None, ""),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = list
        .as_array()
        .expect("club list")
        .iter()
        .map(|club| club["clubId"].as_str().expect("club id").to_string())
        .collect::<Vec<_>>();
    assert!(listed.contains(&club_id));
    assert!(!listed.contains(&hidden_club));
}

#[tokio::test]
async fn provisioned_account_can_log_in() {
    let Some(pool) = common::test_pool().await else { return };
    let app = db_app(pool, PictureStore::new(picture_dir()));

    let admin = token_for("admin", None, true);
    let (status, created) = call(
        &app,
        json_request(Method::POST, "/api/admin/account/create", Some(&admin), "{}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let account_id = created["accountId"].as_str().expect("account id");
    let auth_token = created["authToken"].as_str().expect("auth token");

    let wrong = json!({ "accountId": account_id, "authToken": "not the token" }).to_string();
    let (status, _) = call(
        &app,
        json_request(Method::POST, "/api/auth/login", None, &wrong),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let login = json!({ "accountId": account_id, "authToken": auth_token }).to_string();
    let (status, session) = call(
        &app,
        json_request(Method::POST, "/api/auth/login", None, &login),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["clubId"], created["clubId"]);
    assert_eq!(session["isAdmin"], false);

    let token = session["token"].as_str().expect("jwt");
    let (status, own) = call(
        &app,
        json_request(Method::GET, "/api/club/info", Some(token), ""),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["name"], provision::DEFAULT_CLUB_NAME);
    assert_eq!(own["published"], false);
}
