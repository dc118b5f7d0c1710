#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Extension, Router,
};
use club_hub::{
    auth::{generate_jwt, RequestingAccount},
    connect_to_db,
    pictures::PictureStore,
    DbPool,
};
use diesel_async::SimpleAsyncConnection;
use std::time::Duration;

const MIGRATION: &str = include_str!("../../migrations/2022-11-20-000000_create_club_hub/up.sql");

pub fn set_jwt_secret() {
    // base64 of "club hub test secret"
    std::env::set_var("JWT_SECRET", "Y2x1YiBodWIgdGVzdCBzZWNyZXQ=");
}

/// Router wired like `main`, backed by a pool that never connects unless a
/// handler gets far enough to check a connection out.
pub fn offline_app() -> Router {
    set_jwt_secret();
    let pool = connect_to_db("postgres://club_hub@localhost:1/unreachable").expect("build pool");
    let store = PictureStore::new(std::env::temp_dir().join("club_hub_offline_pictures"));
    club_hub::app(store).layer(Extension(pool))
}

pub fn multipart_request(token: &str, parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    let boundary = "club-hub-boundary";
    let mut body = Vec::new();
    for (name, content_type, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/club/picture")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .expect("build request")
}

/// Router wired like `main` over a real pool and picture directory.
pub fn db_app(pool: DbPool, store: PictureStore) -> Router {
    set_jwt_secret();
    club_hub::app(store).layer(Extension(pool))
}

pub fn token_for(account_id: &str, club_id: Option<&str>, is_admin: bool) -> String {
    set_jwt_secret();
    generate_jwt(
        &RequestingAccount {
            account_id: account_id.to_string(),
            club_id: club_id.map(str::to_string),
            is_admin,
        },
        Duration::from_secs(60),
    )
    .expect("sign token")
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("build request")
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Pool against `TEST_DATABASE_URL` with the schema applied, or `None` when
/// no test database is configured.
pub async fn test_pool() -> Option<DbPool> {
    let _ = dotenv::dotenv();
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = connect_to_db(&url).expect("build pool");
    let mut conn = pool.get().await.expect("connect to test database");
    conn.batch_execute(&format!(
        "SELECT pg_advisory_lock(7341);\n{MIGRATION}\nSELECT pg_advisory_unlock(7341);"
    ))
    .await
    .expect("apply schema");
    drop(conn);

    Some(pool)
}
