use axum::{extract::State, Extension, Json};
use portal_shared::api::{AuthResponse, LoginRequest, RegisterRequest};
use portal_shared::User;

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::AppError;
use crate::routes::AppState;
use crate::store::NewUser;
use crate::validation::{
    validate_email, validate_full_name, validate_password, validate_username,
};

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_username(&req.username).map_err(AppError::Validation)?;
    validate_email(&req.email).map_err(AppError::Validation)?;
    validate_password(&req.password).map_err(AppError::Validation)?;
    validate_full_name(&req.full_name).map_err(AppError::Validation)?;

    // Checked here first so the caller learns which field collided; the
    // store enforces uniqueness again on insert.
    if state
        .users
        .get_user_by_username(&req.username)
        .await
        .is_some()
    {
        return Err(AppError::DuplicateUsername);
    }
    if state.users.get_user_by_email(&req.email).await.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(&req.password)?;

    let user = state
        .users
        .create_user(NewUser {
            username: req.username,
            password_hash,
            email: req.email,
            full_name: req.full_name,
            bio: req.bio,
            program: req.program,
            year_of_study: req.year_of_study,
        })
        .await?;

    let token = state.sessions.create(user.id).await;

    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // An unknown username and a wrong password are indistinguishable to
    // the caller.
    let user = state
        .users
        .get_user_by_username(&req.username)
        .await
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.sessions.create(user.id).await;

    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<(), AppError> {
    state.sessions.destroy(user.session).await;

    Ok(())
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .get_user(user.id)
        .await
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.public()))
}
