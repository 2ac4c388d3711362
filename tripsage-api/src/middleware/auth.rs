use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tripsage_core::token::SessionIdentity;

use crate::error::AppError;
use crate::state::AppState;

/// Pure token validation: extracts the bearer token, verifies it via the
/// token service, and injects the decoded identity into request
/// extensions. Never touches storage; fetching the full user record is
/// the handler's job.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, req.headers())
        .ok_or_else(|| AppError::AuthenticationError("unauthorized".to_string()))?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Decodes `Authorization: Bearer <token>` if present and valid. Used
/// directly by routes where authentication is optional.
pub fn bearer_identity(state: &AppState, headers: &HeaderMap) -> Option<SessionIdentity> {
    let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;
    state.tokens.verify_session(token)
}
