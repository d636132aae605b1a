use crate::{
    auth::{verify_password, AuthResponse, LoginRequest, PasswordHasher, RegisterRequest, TokenService},
    error::AppError,
    models::{NewUser, User},
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a user (role `USER` unless another role is given) and returns it with a
/// freshly issued token. A previously used email is rejected with `400`.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    hasher: web::Data<PasswordHasher>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    if User::find_by_email(&pool, &register_data.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hasher.hash(&register_data.password)?;

    // A concurrent registration with the same email trips the unique index and
    // surfaces as `Conflict` as well.
    let user = User::create(
        &pool,
        NewUser {
            name: &register_data.name,
            email: &register_data.email,
            password_hash: &password_hash,
            role: register_data.role.unwrap_or_default(),
        },
    )
    .await?;

    let token = tokens.issue(user.id, Some(user.role), tokens.policy().register_ttl)?;

    log::info!("registered user {}", user.id);
    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".into(),
        user: user.into(),
        token,
    }))
}

/// Login user
///
/// An unknown email and a wrong password produce the same `401` response, after
/// the same amount of hashing work.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    hasher: web::Data<PasswordHasher>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    // Unknown emails still pay for a bcrypt check so response time does not
    // reveal which accounts exist.
    let user = User::find_by_email(&pool, &login_data.email).await?;
    let verified = match &user {
        Some(user) => verify_password(&login_data.password, &user.password_hash)?,
        None => hasher.verify_decoy(&login_data.password)?,
    };
    let user = match user {
        Some(user) if verified => user,
        _ => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    let token = tokens.issue(user.id, Some(user.role), tokens.policy().login_ttl)?;

    log::info!("user {} logged in", user.id);
    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "User logged in successfully".into(),
        user: user.into(),
        token,
    }))
}
