use crate::profile::ProfileError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;

#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    ResponseStatusError(StatusCode, Cow<'static, str>),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct AppErrorResponse {
            status: u16,
            message: Cow<'static, str>,
        }

        match self {
            AppError::InternalServerError(err) => {
                tracing::error!(error = ?err, "request failed");
                AppError::from(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .into_response()
            }
            AppError::ResponseStatusError(code, s) => (
                code,
                Json(AppErrorResponse {
                    status: code.as_u16(),
                    message: s,
                }),
            )
                .into_response(),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> AppError {
        AppError::InternalServerError(e.into())
    }
}

impl AppError {
    pub fn from(code: StatusCode, s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::ResponseStatusError(code, s.into())
    }

    /// Client-caused profile errors keep their message, storage failures
    /// become an opaque 500.
    pub fn from_profile(err: ProfileError) -> AppError {
        let code = match &err {
            ProfileError::NotOwner => StatusCode::FORBIDDEN,
            ProfileError::ClubNotFound => StatusCode::NOT_FOUND,
            ProfileError::Invalid(_)
            | ProfileError::UnknownTag
            | ProfileError::ForeignPicture => StatusCode::BAD_REQUEST,
            ProfileError::Storage(_) | ProfileError::Pool(_) => {
                return AppError::InternalServerError(err.into())
            }
        };
        AppError::from(code, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ResponseStatusError(code, _) => *code,
        }
    }
}
