#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

pub const SECRET: &str = "integration_test_secret";

/// Connects to `DATABASE_URL` and applies migrations. Returns `None` (and the
/// calling test skips itself) when no database is configured or reachable.
pub async fn pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        }
    };
    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("database unreachable ({}), skipping database test", e);
            return None;
        }
    };
    taskboard::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// Builds the full application on top of `pool`.
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(taskboard::auth::TokenService::new(
                    common::SECRET,
                    taskboard::auth::TokenPolicy::default(),
                )))
                .app_data(actix_web::web::Data::new(
                    taskboard::auth::PasswordHasher::new(4),
                ))
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskboard::routes::config),
        )
        .await
    };
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Sends `req` and returns the status with the JSON body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn register_user<S, B>(app: &S, name: &str, role: Option<&str>) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let email = unique_email(name);
    let mut payload = json!({ "name": name, "email": email, "password": "p1" });
    if let Some(role) = role {
        payload["role"] = json!(role);
    }
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    TestUser {
        id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
        email,
        token: body["token"].as_str().unwrap().to_string(),
    }
}

pub async fn create_board<S, B>(app: &S, user: &TestUser, name: &str) -> Uuid
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/board/create-board")
        .insert_header(("x-auth-token", user.token.clone()))
        .set_json(json!({ "name": name }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "board creation failed: {}", body);
    body["board"]["id"].as_str().unwrap().parse().unwrap()
}

pub async fn create_task<S, B>(app: &S, user: &TestUser, board_id: Uuid, extra: Value) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut payload = json!({
        "title": "Untitled",
        "priority": "MEDIUM",
        "status": "To Do",
        "board_id": board_id,
    });
    if let (Some(payload), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            payload.insert(key.clone(), value.clone());
        }
    }
    let req = test::TestRequest::post()
        .uri("/task/create-task")
        .insert_header(("x-auth-token", user.token.clone()))
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "task creation failed: {}", body);
    body["task"].clone()
}

pub async fn cleanup_users(pool: &PgPool, ids: &[Uuid]) {
    let _ = sqlx::query("DELETE FROM tasks WHERE creator_id = ANY($1) OR assignee_id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM boards WHERE user_id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await;
}
