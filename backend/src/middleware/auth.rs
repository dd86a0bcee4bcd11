//! Session authentication middleware
//!
//! Resolves the session cookie to a `SessionUser` and rejects the request
//! with 401 when there is none.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use shared::SessionUser;

use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Session token carried by the request, if any
pub fn session_token(jar: &CookieJar, cookie_name: &str) -> Option<String> {
    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Session cookie: HttpOnly, SameSite=Lax, path `/`, Max-Age in seconds
pub fn session_cookie(
    config: &SessionConfig,
    value: &str,
    max_age_seconds: u64,
) -> AppResult<Cookie<'static>> {
    let mut cookie = Cookie::parse(format!(
        "{}={}; Max-Age={}",
        config.cookie_name, value, max_age_seconds
    ))
    .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))?;

    cookie.set_http_only(true);
    cookie.set_secure(config.secure_cookie);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    Ok(cookie)
}

/// Authentication middleware that validates the session cookie
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(&jar, &state.config.session.cookie_name);

    let Some(user) = state.auth.current_user(token.as_deref()).await else {
        return AppError::Unauthorized("Authentication required".to_string()).into_response();
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Extractor for the authenticated user
/// Use this in handlers behind `session_middleware`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub SessionUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
