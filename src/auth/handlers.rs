use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AccountUser, AuthResponse, LoginRequest, MeResponse, PublicUser, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password, repo,
    },
    error::ApiError,
    extract::JsonBody,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        payload.name.filter(|s| !s.is_empty()),
        payload.email.filter(|s| !s.is_empty()),
        payload.password.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::validation("Name, email, and password are required"));
    };

    // Characters, not bytes: a short multibyte password must not slip past.
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("registration password too short");
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation("Invalid email format"));
    }

    if repo::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered"));
    }

    let hash = password::hash_password(&password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e)
    })?;

    let user = repo::insert(&state.db, &name, &email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id, &user.email, user.role)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (
        payload.email.filter(|s| !s.is_empty()),
        payload.password.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    // Unknown email and bad password produce the same response so a caller
    // cannot tell which factor failed.
    let Some(user) = repo::find_by_email(&state.db, &email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    };

    let ok = password::verify_password(&password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal(e)
    })?;

    if !ok {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(user.id, &user.email, user.role)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: PublicUser::from(&user),
        token,
    }))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    // The token outlives user state; the row may be gone by now.
    let Some(user) = repo::find_by_id(&state.db, claims.id).await? else {
        warn!(user_id = claims.id, "token holder no longer exists");
        return Err(ApiError::NotFound("User not found"));
    };

    Ok(Json(MeResponse {
        user: AccountUser::from(user),
    }))
}
