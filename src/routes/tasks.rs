use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskUpdate},
    routes::{parse_id, require_id},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// `?board_id=` on the task listing and delete routes.
#[derive(Debug, Deserialize)]
pub struct BoardScope {
    pub board_id: Option<String>,
}

/// Creates a task on a board.
///
/// `board_id` is checked in three steps, each with its own answer: missing
/// (`400`), malformed (`400`), pointing at no board (`404`). The existence checks
/// and the insert share one transaction. `assignee_id` defaults to the caller and
/// must name an existing user.
///
/// ## Responses:
/// - `201 Created`: `{"task": Task}`.
/// - `400 Bad Request`: bad `board_id` or invalid task fields.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: the board or the assignee does not exist.
#[post("/create-task")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    creator: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let board_id = require_id(task_data.board_id.as_deref(), "board")?;
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), creator.id, board_id);
    let task = Task::insert(&pool, &task).await?;

    log::info!("task {} created on board {} by {}", task.id, board_id, creator.id);
    Ok(HttpResponse::Created().json(json!({ "task": task })))
}

/// Lists the tasks the caller created on one board.
#[get("/my-tasks")]
pub async fn my_tasks(
    pool: web::Data<PgPool>,
    creator: AuthenticatedUser,
    scope: web::Query<BoardScope>,
) -> Result<impl Responder, AppError> {
    let board_id = require_id(scope.board_id.as_deref(), "board")?;
    let tasks = Task::list_for_creator(&pool, creator.id, board_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "tasks": tasks })))
}

/// Deletes one of the caller's tasks.
///
/// Deleting a task that does not match (or no longer exists) still answers `200`.
#[delete("/delete/{task_id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    creator: AuthenticatedUser,
    task_id: web::Path<String>,
    scope: web::Query<BoardScope>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_id(&task_id, "task")?;
    let board_id = require_id(scope.board_id.as_deref(), "board")?;

    let deleted = Task::delete_owned(&pool, task_id, creator.id, board_id).await?;
    if deleted == 0 {
        log::info!("task {} not found for {}, nothing deleted", task_id, creator.id);
    } else {
        log::info!("task {} deleted by {}", task_id, creator.id);
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}

/// Updates the provided fields of one of the caller's tasks.
///
/// Fields left out of the body keep their value. `null` clears `description`
/// or `due_date`, and resets `assignee_id` to the caller.
#[put("/update-task/{task_id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    creator: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task_id = parse_id(&task_id, "task")?;
    let board_id = require_id(task_data.board_id.as_deref(), "board")?;
    task_data.validate()?;

    let mut task = Task::find_owned(&pool, task_id, creator.id, board_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found or unauthorized".into()))?;

    task.apply(task_data.into_inner());
    let task = task.save(&pool).await?;

    log::info!("task {} updated by {}", task.id, creator.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": task,
    })))
}
