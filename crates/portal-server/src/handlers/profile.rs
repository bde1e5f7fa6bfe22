use axum::{extract::State, Extension, Json};
use portal_shared::api::UpdateProfileRequest;
use portal_shared::User;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::routes::AppState;
use crate::store::ProfileUpdate;
use crate::validation::{validate_email, validate_full_name};

/// PATCH /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    if let Some(ref full_name) = req.full_name {
        validate_full_name(full_name).map_err(AppError::Validation)?;
    }
    if let Some(ref email) = req.email {
        validate_email(email).map_err(AppError::Validation)?;
    }

    let updated = state
        .users
        .update_user(
            user.id,
            ProfileUpdate {
                full_name: req.full_name,
                email: req.email,
                bio: req.bio,
                program: req.program,
                year_of_study: req.year_of_study,
            },
        )
        .await?;

    Ok(Json(updated.public()))
}
