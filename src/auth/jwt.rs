use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    auth::claims::{Claims, Role},
    config::JwtConfig,
    error::ApiError,
    state::AppState,
};

/// Signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { secret, ttl_hours } = state.config.jwt.clone();
        Self::new(&secret, ttl_hours)
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: TimeDuration::hours(ttl_hours),
        }
    }

    /// Sign a token asserting `{id, email, role}`, expiring `ttl` from now.
    pub fn issue(&self, id: i32, email: &str, role: Role) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            id,
            email: email.to_string(),
            role,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = id, "jwt issued");
        Ok(token)
    }

    /// Returns the claims, or `None` for a bad signature, malformed token, or
    /// expired token. Callers treat every failure uniformly as
    /// unauthenticated; nothing propagates past this boundary.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => {
                debug!(user_id = data.claims.id, "jwt verified");
                Some(data.claims)
            }
            Err(err) => {
                debug!(error = %err, "jwt rejected");
                None
            }
        }
    }
}

/// Authenticated identity, extracted from the `Authorization: Bearer <token>`
/// header. The scheme match is exact; any other scheme, a missing header, or
/// a token that fails verification rejects with 401 before the handler runs.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authorization scheme"))?;

        let claims = keys.verify(token).ok_or_else(|| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(claims))
    }
}
