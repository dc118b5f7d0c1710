use std::io;

use axum::{http::StatusCode, routing::get_service, Extension, Router};
use deadpool::managed::Pool;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use pictures::{PictureStore, PICTURE_URL_PREFIX};
use tower_http::services::ServeDir;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pictures;
pub mod profile;
pub mod provision;
pub mod schema;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Builds the pool. Connections are opened lazily on first checkout.
pub fn connect_to_db(db_url: &str) -> anyhow::Result<DbPool> {
    let db_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Ok(Pool::builder(db_config).build()?)
}

/// The database pool is expected as an `Extension` layered on by the caller.
pub fn app(store: PictureStore) -> Router {
    let serve = get_service(ServeDir::new(store.root())).handle_error(handle_error);
    Router::new()
        .nest("/api", api::app())
        .nest(PICTURE_URL_PREFIX, serve)
        .layer(Extension(store))
}

async fn handle_error(_: io::Error) -> error::AppError {
    error::AppError::from(StatusCode::INTERNAL_SERVER_ERROR, "failed to fetch picture")
}
