//! Provisions an administrator account and prints its login token.
//!
//! Administrators cannot be created over HTTP, so the first one is made here.

use club_hub::{config::Config, connect_to_db, provision};
use envconfig::Envconfig;

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
    let pool = connect_to_db(&config.db_url)?;
    let conn = &mut pool.get().await?;

    let admin = provision::admin_account(conn).await?;

    println!("account id: {}", admin.account.account_id);
    println!("auth token: {}", admin.auth_token);
    Ok(())
}
