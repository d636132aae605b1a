use crate::{
    auth::{
        verify_password, AuthMiddleware, AuthenticatedUser, ChangePasswordRequest, PasswordHasher,
        UpdateUserRequest,
    },
    error::AppError,
    models::{Role, User, UserResponse},
    routes::parse_id,
};
use actix_web::{post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Update a user's name and/or email.
///
/// Callers may only update themselves unless their token carries the `ADMIN` role.
/// Someone else's id is answered with `404`, like an id that does not exist.
#[put("/update-user/{id}", wrap = "AuthMiddleware::user()")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    caller: AuthenticatedUser,
    user_id: web::Path<String>,
    update_data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    update_data.validate()?;

    if user_id != caller.id && caller.role != Some(Role::Admin) {
        return Err(AppError::NotFound("User not found".into()));
    }

    if let Some(email) = &update_data.email {
        if User::email_taken(&pool, email, Some(user_id)).await? {
            return Err(AppError::Conflict("Email already in use".into()));
        }
    }

    let user = User::update_profile(
        &pool,
        user_id,
        update_data.name.as_deref(),
        update_data.email.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    log::info!("user {} updated by {}", user.id, caller.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully",
        "user": UserResponse::from(user),
    })))
}

/// Change the caller's password.
///
/// The user is always the one named by the token, never one from the body.
#[post("/change-password", wrap = "AuthMiddleware::user()")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    caller: AuthenticatedUser,
    password_data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    password_data.validate()?;

    let user = User::find_by_id(&pool, caller.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&password_data.old_password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let password_hash = hasher.hash(&password_data.new_password)?;
    User::update_password(&pool, user.id, &password_hash).await?;

    log::info!("user {} changed their password", user.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}
