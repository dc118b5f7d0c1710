//! Account provisioning.

use crate::{auth, models::Account, schema::*};
use diesel::prelude::*;
use diesel_async::{
    scoped_futures::ScopedFutureExt, AsyncConnection, AsyncPgConnection, RunQueryDsl,
};
use nanoid::nanoid;

/// Name a freshly provisioned club carries until its manager edits it.
pub const DEFAULT_CLUB_NAME: &str = "New Club";

pub struct ProvisionedAccount {
    pub account: Account,
    /// Plain login token. Only the hash is stored.
    pub auth_token: String,
}

#[derive(Insertable)]
#[diesel(table_name = accounts)]
struct NewAccount<'a> {
    account_id: &'a str,
    auth_hash: &'a str,
    club_id: Option<&'a str>,
    is_admin: bool,
}

#[derive(Insertable)]
#[diesel(table_name = clubs)]
struct NewClub<'a> {
    club_id: &'a str,
    name: &'a str,
    published: bool,
}

/// Creates a club manager account together with its empty club profile.
/// Either both rows exist afterwards or neither does.
pub async fn club_account(
    conn: &mut AsyncPgConnection,
) -> anyhow::Result<ProvisionedAccount> {
    let account_id = nanoid!();
    let club_id = nanoid!();
    let auth_token = auth::generate_auth_token();
    let auth_hash = auth::hash_password(&auth_token)?;

    let account = conn
        .transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let account = diesel::insert_into(accounts::table)
                    .values(NewAccount {
                        account_id: &account_id,
                        auth_hash: &auth_hash,
                        club_id: Some(&club_id),
                        is_admin: false,
                    })
                    .get_result::<Account>(conn)
                    .await?;

                diesel::insert_into(clubs::table)
                    .values(NewClub {
                        club_id: &club_id,
                        name: DEFAULT_CLUB_NAME,
                        published: false,
                    })
                    .execute(conn)
                    .await?;

                Ok(account)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(account_id = %account.account_id, "provisioned club account");
    Ok(ProvisionedAccount {
        account,
        auth_token,
    })
}

/// Creates an administrator account. Used by the `create_admin` binary.
pub async fn admin_account(
    conn: &mut AsyncPgConnection,
) -> anyhow::Result<ProvisionedAccount> {
    let account_id = nanoid!();
    let auth_token = auth::generate_auth_token();
    let auth_hash = auth::hash_password(&auth_token)?;

    let account = diesel::insert_into(accounts::table)
        .values(NewAccount {
            account_id: &account_id,
            auth_hash: &auth_hash,
            club_id: None,
            is_admin: true,
        })
        .get_result::<Account>(conn)
        .await?;

    tracing::info!(account_id = %account.account_id, "provisioned admin account");
    Ok(ProvisionedAccount {
        account,
        auth_token,
    })
}
