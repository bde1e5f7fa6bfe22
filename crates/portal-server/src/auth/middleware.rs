use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, routes::AppState};

/// Identity attached to the request once the session token checks out.
/// Carries the token itself so logout can tear down exactly this session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub session: Uuid,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .and_then(|t| t.parse::<Uuid>().ok())
        .ok_or(AppError::Unauthenticated)?;

    // Resolving also rolls the expiry forward.
    let user_id = state
        .sessions
        .resolve(token)
        .await
        .ok_or(AppError::Unauthenticated)?;

    let auth_user = AuthUser {
        id: user_id,
        session: token,
    };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
