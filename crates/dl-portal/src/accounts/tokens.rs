use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::registry::domain::NationalId;

/// Distinguishes the two halves of a token pair; a refresh token must never
/// pass the access-token gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// National id of the account holder.
    pub sub: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

/// The access/refresh pair handed out on register and login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signs and verifies the HS256 token pairs.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.token_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    pub fn issue_pair(&self, national_id: &NationalId) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(national_id, TokenKind::Access, self.access_ttl)?,
            refresh: self.issue(national_id, TokenKind::Refresh, self.refresh_ttl)?,
        })
    }

    fn issue(
        &self,
        national_id: &NationalId,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: national_id.0.clone(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Verify signature and expiry, then check the token is of the expected
    /// kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        Ok(data.claims)
    }
}

/// Error raised when signing or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("invalid or expired token")]
    Invalid,
    #[error("wrong token kind")]
    WrongKind,
}

/// Request extension carrying the verified holder of the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedHolder(pub NationalId);

/// Middleware gating a router behind a valid access token. The verified
/// national id is attached as an extension; workflow operations still take
/// the applicant identity from the request payload.
pub async fn require_auth(
    State(issuer): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match bearer.map(|token| issuer.verify(token, TokenKind::Access)) {
        Some(Ok(claims)) => {
            request
                .extensions_mut()
                .insert(AuthenticatedHolder(NationalId(claims.sub)));
            next.run(request).await
        }
        _ => {
            let payload = json!({ "error": "invalid or missing access token" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
    }
}
