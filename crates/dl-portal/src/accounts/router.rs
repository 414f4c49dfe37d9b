use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::Registration;
use super::repository::{AccountRepository, TokenBlacklist};
use super::service::{AccountError, AccountService};
use crate::registry::repository::IdentityDirectory;

/// Router builder exposing the unauthenticated account endpoints.
pub fn account_router<I, R, B>(service: Arc<AccountService<I, R, B>>) -> Router
where
    I: IdentityDirectory + 'static,
    R: AccountRepository + 'static,
    B: TokenBlacklist + 'static,
{
    Router::new()
        .route("/register", post(register_handler::<I, R, B>))
        .route("/login", post(login_handler::<I, R, B>))
        .route("/logout", post(logout_handler::<I, R, B>))
        .with_state(service)
}

pub(crate) async fn register_handler<I, R, B>(
    State(service): State<Arc<AccountService<I, R, B>>>,
    axum::Json(registration): axum::Json<Registration>,
) -> Response
where
    I: IdentityDirectory + 'static,
    R: AccountRepository + 'static,
    B: TokenBlacklist + 'static,
{
    match service.register(registration) {
        Ok((_, pair)) => {
            let payload = json!({ "refresh": pair.refresh, "access": pair.access });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) password: String,
}

pub(crate) async fn login_handler<I, R, B>(
    State(service): State<Arc<AccountService<I, R, B>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    I: IdentityDirectory + 'static,
    R: AccountRepository + 'static,
    B: TokenBlacklist + 'static,
{
    match service.login(&request.email, &request.password) {
        Ok(pair) => {
            let payload = json!({ "refresh": pair.refresh, "access": pair.access });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogoutRequest {
    #[serde(default)]
    pub(crate) refresh_token: String,
}

pub(crate) async fn logout_handler<I, R, B>(
    State(service): State<Arc<AccountService<I, R, B>>>,
    axum::Json(request): axum::Json<LogoutRequest>,
) -> Response
where
    I: IdentityDirectory + 'static,
    R: AccountRepository + 'static,
    B: TokenBlacklist + 'static,
{
    match service.logout(&request.refresh_token) {
        Ok(()) => StatusCode::RESET_CONTENT.into_response(),
        // Malformed, expired, and replayed tokens all collapse into the same
        // generic rejection; the reason is not disclosed to the caller.
        Err(_) => {
            let payload = json!({ "error": "invalid request" });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(error: AccountError) -> Response {
    let status = match &error {
        AccountError::MissingField(_)
        | AccountError::MissingCredentials
        | AccountError::UnknownNationalId
        | AccountError::EmailTaken
        | AccountError::TokenRevoked => StatusCode::BAD_REQUEST,
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::Hashing(_) | AccountError::Token(_) | AccountError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
