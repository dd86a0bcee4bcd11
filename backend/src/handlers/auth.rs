//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use shared::SessionUser;

use crate::error::AppResult;
use crate::middleware::auth::{session_cookie, session_token};
use crate::services::auth::{LoginInput, SignupInput};
use crate::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// Signup endpoint handler
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignupInput>,
) -> AppResult<(StatusCode, CookieJar, Json<MessageResponse>)> {
    let (_, grant) = state.auth.signup(body).await?;
    let session = &state.config.session;
    let cookie = session_cookie(session, &grant.token, session.ttl_seconds)?;

    Ok((StatusCode::CREATED, jar.add(cookie), message("User registered!")))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginInput>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let grant = state.auth.login(body).await?;
    tracing::info!("User {} logged in", grant.user.id);

    let session = &state.config.session;
    let cookie = session_cookie(session, &grant.token, session.ttl_seconds)?;

    Ok((jar.add(cookie), message("Login successful!")))
}

/// Logout endpoint handler. Always expires the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let session = &state.config.session;
    let token = session_token(&jar, &session.cookie_name);

    if let Err(e) = state.auth.logout(token.as_deref()).await {
        tracing::error!("Failed to revoke session: {}", e);
    }

    let expired = session_cookie(session, "", 0)?;
    Ok((jar.add(expired), message("Logged out successfully")))
}

/// Current session user, or `null`
pub async fn get_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<Option<SessionUser>> {
    let token = session_token(&jar, &state.config.session.cookie_name);
    Json(state.auth.current_user(token.as_deref()).await)
}

/// Whether the request carries a live session
pub async fn check_auth(State(state): State<AppState>, jar: CookieJar) -> Json<AuthCheckResponse> {
    let token = session_token(&jar, &state.config.session.cookie_name);
    let authenticated = state.auth.current_user(token.as_deref()).await.is_some();
    Json(AuthCheckResponse { authenticated })
}
