use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tripsage_core::password::{self, MIN_PASSWORD_LEN};
use tripsage_core::token::{SessionIdentity, RESET_TOKEN_TTL_SECONDS};
use tripsage_core::user::PublicUser;

use crate::error::{AppError, BodyJson};
use crate::middleware::require_session;
use crate::state::AppState;

/// Returned for every forgot-password request, whether or not the email
/// is registered, to prevent account enumeration.
const FORGOT_PASSWORD_MESSAGE: &str =
    "If that email is registered, a password reset link has been sent.";

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(current_user))
        .layer(axum::middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .merge(protected)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordRequest {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResetPasswordRequest {
    token: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    user: PublicUser,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user: PublicUser,
    token: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn signup(
    State(state): State<AppState>,
    BodyJson(req): BodyJson<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::ValidationError("missing required field: name".to_string()))?;
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| e.contains('@'))
        .ok_or_else(|| AppError::ValidationError("missing or invalid field: email".to_string()))?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::ValidationError("missing required field: password".to_string()))?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let hash = hash_password_blocking(password.to_string()).await?;
    let user = state.users.create(name, email, &hash).await?;

    Ok(Json(UserResponse {
        user: user.public(),
    }))
}

async fn login(
    State(state): State<AppState>,
    BodyJson(req): BodyJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = req
        .email
        .as_deref()
        .ok_or_else(|| AppError::ValidationError("missing required field: email".to_string()))?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::ValidationError("missing required field: password".to_string()))?;

    // Unknown email and wrong password produce the identical failure.
    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()))?;

    let hash = user.password_hash.0.clone();
    let password_owned = password.to_string();
    let matches = tokio::task::spawn_blocking(move || {
        password::verify_password(&password_owned, &hash)
    })
    .await
    .map_err(|e| AppError::InternalServerError(format!("verification task failed: {}", e)))?;

    if !matches {
        return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
    }

    let token = state
        .tokens
        .issue_session(user.id, &user.email)
        .map_err(|e| AppError::InternalServerError(format!("token encoding failed: {}", e)))?;

    Ok(Json(LoginResponse {
        user: user.public(),
        token,
    }))
}

async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("unauthorized".to_string()))?;

    Ok(Json(UserResponse {
        user: user.public(),
    }))
}

async fn forgot_password(
    State(state): State<AppState>,
    BodyJson(req): BodyJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::ValidationError("missing required field: email".to_string()))?;

    // Any failure past this point still returns the generic message;
    // the response must not reveal whether the account exists.
    match state.users.find_by_email(email).await {
        Ok(Some(user)) => {
            let token = state.tokens.mint_reset_token();
            let expires_at = Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECONDS);
            match state
                .users
                .store_reset_token(user.id, &token, expires_at)
                .await
            {
                Ok(()) => {
                    let body = format!(
                        "Hi {},\n\nUse this token to reset your TripSage password \
                         within the next hour:\n\n{}\n\nIf you did not request \
                         a reset, you can ignore this message.",
                        user.name, token
                    );
                    if let Err(e) = state
                        .mailer
                        .send(&user.email, "Reset your TripSage password", &body)
                        .await
                    {
                        warn!(error = %e, "failed to send password reset email");
                    }
                }
                Err(e) => warn!(error = %e, "failed to persist password reset token"),
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "forgot-password lookup failed"),
    }

    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE.to_string(),
    }))
}

async fn reset_password(
    State(state): State<AppState>,
    BodyJson(req): BodyJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let token = req
        .token
        .as_deref()
        .ok_or_else(|| AppError::ValidationError("missing required field: token".to_string()))?;
    let password = req
        .password
        .as_deref()
        .ok_or_else(|| AppError::ValidationError("missing required field: password".to_string()))?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    // Consuming the token marks it used in the same conditional update,
    // so a second call with the same token fails even inside the window.
    let user_id = state
        .users
        .consume_reset_token(token)
        .await?
        .ok_or_else(|| {
            AppError::ValidationError("invalid or expired reset token".to_string())
        })?;

    let hash = hash_password_blocking(password.to_string()).await?;
    state.users.update_password(user_id, &hash).await?;

    Ok(Json(MessageResponse {
        message: "password updated".to_string(),
    }))
}

/// bcrypt is CPU-bound; run it off the async worker threads.
async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("failed to hash password: {}", e)))
}
