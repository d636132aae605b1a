//! Admin-only user management. The whole `/admin` scope sits behind
//! `AuthMiddleware::admin()`.

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{User, UserResponse},
    routes::parse_id,
};
use actix_web::{delete, get, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

#[get("/get-all-users")]
pub async fn get_all_users(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let users: Vec<UserResponse> = User::list_all(&pool)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[get("/get-user/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let user = User::find_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(json!({ "user": UserResponse::from(user) })))
}

/// Delete a user.
///
/// Users who still own boards, or who created or are assigned tasks, are refused
/// with `400`; their records must be removed or reassigned first.
#[delete("/delete-user/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    admin: AuthenticatedUser,
    user_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user_id = parse_id(&user_id, "user")?;

    if User::find_by_id(&pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    if User::has_dependents(&pool, user_id).await? {
        return Err(AppError::Conflict(
            "User still owns boards or tasks and cannot be deleted".into(),
        ));
    }

    if User::delete(&pool, user_id).await? == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    log::info!("user {} deleted by admin {}", user_id, admin.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}
