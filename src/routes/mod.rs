pub mod admin;
pub mod auth;
pub mod boards;
pub mod health;
pub mod search;
pub mod tasks;
pub mod users;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route plus JSON/query/path extractor settings that turn payload
/// errors into `{"error": ...}` responses.
///
/// Expects `web::Data<PgPool>`, `web::Data<TokenService>` and
/// `web::Data<PasswordHasher>` to be registered on the `App`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(health::health)
        .service(
            web::scope("/user")
                .service(auth::register)
                .service(auth::login)
                .service(users::update_user)
                .service(users::change_password),
        )
        .service(
            web::scope("/admin")
                .wrap(AuthMiddleware::admin())
                .service(admin::get_all_users)
                .service(admin::get_user)
                .service(admin::delete_user),
        )
        .service(
            web::scope("/board")
                .wrap(AuthMiddleware::user())
                .service(boards::create_board)
                .service(boards::my_boards)
                .service(boards::delete_board),
        )
        .service(
            web::scope("/task")
                .wrap(AuthMiddleware::user())
                .service(tasks::create_task)
                .service(tasks::my_tasks)
                .service(tasks::delete_task)
                .service(tasks::update_task),
        )
        .service(search::search)
        .service(search::filter);
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid JSON body: {}", err)).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Route not found" }))
}

/// Parses a path or body identifier, reporting a malformed one as `400`.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID format", what)))
}

/// Like [`parse_id`], but a missing or blank value is its own error.
pub(crate) fn require_id(raw: Option<&str>, what: &str) -> Result<Uuid, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_id(raw, what),
        None => Err(AppError::BadRequest(format!("{} ID not provided", capitalize(what)))),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
