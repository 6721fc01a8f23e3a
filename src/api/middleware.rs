use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::crypto::token;
use crate::db::UserRepository;
use crate::error::AppError;

/// Pull the session token out of the Cookie header, if any.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == token::SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Authentication middleware. Verifies the session cookie and attaches the
/// user record to request extensions. The password hash never serializes,
/// so downstream handlers can return the user as-is.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers())
        .ok_or_else(|| AppError::Auth("No token provided".to_string()))?;

    let claims = token::verify_token(&token, &state.config.jwt_secret)?;

    // Token may outlive the account it was issued for.
    let user = UserRepository::get_by_id(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
