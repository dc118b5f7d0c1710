use axum::{http::Method, Extension};
use club_hub::{
    auth::ensure_jwt_secret_is_valid, config::Config, connect_to_db, pictures::PictureStore,
};
use envconfig::Envconfig;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::init_from_env()?;
    ensure_jwt_secret_is_valid();

    let store = PictureStore::new(&config.picture_storage_path);
    store.ensure_root().await?;
    tracing::info!(path = %config.picture_storage_path.display(), "storing pictures");

    let pool = connect_to_db(&config.db_url)?;
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = club_hub::app(store)
        .layer(Extension(pool))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
