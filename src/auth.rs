use crate::error::AppError;
use argon2::Argon2;
use axum::{
    async_trait,
    extract::{FromRequest, RequestParts, TypedHeader},
    headers::{authorization::Bearer, Authorization},
    http::StatusCode,
};
use jsonwebtoken::{
    errors::Result as JwtResult, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::{ops::Deref, time::Duration};

pub fn hash_password(password: impl AsRef<[u8]>) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_ref(), &salt)
        .map(|h| h.to_string())
}

pub fn verify_password(
    password: impl AsRef<[u8]>,
    password_hash: impl AsRef<str>,
) -> password_hash::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash.as_ref())?;
    Ok(Argon2::default()
        .verify_password(password.as_ref(), &parsed_hash)
        .is_ok())
}

/// Login token handed out once when an account is provisioned.
pub fn generate_auth_token() -> String {
    format!("{:x}", Sha512::digest(rand::random::<[u8; 32]>()))
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

lazy_static::lazy_static! {
    static ref KEYS: Keys = {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        Keys {
            encoding: EncodingKey::from_base64_secret(&secret).expect("JWT_SECRET is not valid base64"),
            decoding: DecodingKey::from_base64_secret(&secret).expect("JWT_SECRET is not valid base64"),
        }
    };
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: String,
    pub club_id: Option<String>,
    pub is_admin: bool,
    pub exp: u64,
}

#[allow(unused_must_use)]
pub fn ensure_jwt_secret_is_valid() {
    KEYS.deref();
}

pub fn generate_jwt(account: &RequestingAccount, exp: Duration) -> JwtResult<String> {
    jsonwebtoken::encode(
        &Header::default(),
        &Claims {
            account_id: account.account_id.clone(),
            club_id: account.club_id.clone(),
            is_admin: account.is_admin,
            exp: jsonwebtoken::get_current_timestamp() + exp.as_secs(),
        },
        &KEYS.encoding,
    )
}

pub fn validate_jwt(token: &str) -> JwtResult<TokenData<Claims>> {
    jsonwebtoken::decode::<Claims>(token, &KEYS.decoding, &Validation::default())
}

/// The caller of a request, resolved from its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestingAccount {
    pub account_id: String,
    pub club_id: Option<String>,
    pub is_admin: bool,
}

impl From<Claims> for RequestingAccount {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.account_id,
            club_id: claims.club_id,
            is_admin: claims.is_admin,
        }
    }
}

impl From<&crate::models::Account> for RequestingAccount {
    fn from(account: &crate::models::Account) -> Self {
        Self {
            account_id: account.account_id.clone(),
            club_id: account.club_id.clone(),
            is_admin: account.is_admin,
        }
    }
}

pub struct ExtractAuth(pub RequestingAccount);

#[async_trait]
impl<B: Send> FromRequest<B> for ExtractAuth {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request(req)
                .await
                .map_err(|_| AppError::from(StatusCode::UNAUTHORIZED, "not logged in"))?;

        let claims = validate_jwt(bearer.token())
            .map_err(|_| AppError::from(StatusCode::UNAUTHORIZED, "invalid or expired token"))?
            .claims;

        Ok(ExtractAuth(claims.into()))
    }
}

pub struct AdminOnly;

#[async_trait]
impl<B: Send> FromRequest<B> for AdminOnly {
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let ExtractAuth(account) = ExtractAuth::from_request(req).await?;
        if !account.is_admin {
            return Err(AppError::from(StatusCode::FORBIDDEN, "no permission"));
        }
        Ok(AdminOnly)
    }
}

#[cfg(test)]
pub(crate) fn set_test_secret() {
    // base64 of "club hub test secret"
    std::env::set_var("JWT_SECRET", "Y2x1YiBodWIgdGVzdCBzZWNyZXQ=");
}
