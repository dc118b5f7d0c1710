use axum::{routing::get, Json, Router};
use serde::Serialize;

pub mod admin;
pub mod auth;
pub mod club;
pub mod picture;
pub mod tag;

#[derive(Serialize)]
struct Pong {
    message: &'static str,
}

async fn ping() -> Json<Pong> {
    Json(Pong { message: "pong" })
}

pub fn app() -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest("/auth", auth::app())
        .nest("/admin", admin::app())
        .nest("/club", club::app().merge(picture::app()))
        .nest("/tag", tag::app())
}
