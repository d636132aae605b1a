//! Public text search over boards and tasks.

use std::collections::HashMap;

use crate::{
    error::AppError,
    models::{contains_pattern, Board, BoardWithTasks, Task, TaskWithBoard},
};
use actix_web::{get, web, HttpResponse, Responder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Enum filters arrive as text so that an empty value means "no filter".
#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub query: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

fn required_query(query: Option<&str>) -> Result<&str, AppError> {
    query.filter(|q| !q.is_empty()).ok_or_else(|| {
        AppError::BadRequest("Query parameter is required and must be a string".into())
    })
}

fn optional_filter<T: DeserializeOwned>(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<T>, AppError> {
    match raw.filter(|value| !value.is_empty()) {
        Some(value) => serde_json::from_value(serde_json::Value::String(value.to_string()))
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, value))),
        None => Ok(None),
    }
}

/// Pairs every board with its tasks, keeping board order.
fn boards_with_tasks(boards: Vec<Board>, tasks: Vec<Task>) -> Vec<BoardWithTasks> {
    let mut by_board: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_board.entry(task.board_id).or_default().push(task);
    }
    boards
        .into_iter()
        .map(|board| BoardWithTasks {
            tasks: by_board.remove(&board.id).unwrap_or_default(),
            board,
        })
        .collect()
}

/// Pairs every task with its board, keeping task order.
fn tasks_with_boards(tasks: Vec<Task>, boards: Vec<Board>) -> Vec<TaskWithBoard> {
    let by_id: HashMap<Uuid, Board> = boards.into_iter().map(|b| (b.id, b)).collect();
    tasks
        .into_iter()
        .map(|task| TaskWithBoard {
            board: by_id.get(&task.board_id).cloned(),
            task,
        })
        .collect()
}

fn distinct_board_ids<'a>(ids: impl Iterator<Item = &'a Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.copied().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn attach_boards(pool: &PgPool, tasks: Vec<Task>) -> Result<Vec<TaskWithBoard>, AppError> {
    let board_ids = distinct_board_ids(tasks.iter().map(|t| &t.board_id));
    let boards = Board::find_many(pool, &board_ids).await?;
    Ok(tasks_with_boards(tasks, boards))
}

async fn attach_tasks(pool: &PgPool, boards: Vec<Board>) -> Result<Vec<BoardWithTasks>, AppError> {
    let board_ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
    let tasks = Task::list_by_boards(pool, &board_ids).await?;
    Ok(boards_with_tasks(boards, tasks))
}

/// Boards whose name contains `query` (with their tasks) and tasks whose title or
/// description contains it (with their board). Matching is case-insensitive.
#[get("/search")]
pub async fn search(
    pool: web::Data<PgPool>,
    params: web::Query<SearchQuery>,
) -> Result<impl Responder, AppError> {
    let pattern = contains_pattern(required_query(params.query.as_deref())?);

    let (boards, tasks) = tokio::try_join!(
        Board::search_by_name(&pool, &pattern),
        Task::search(&pool, &pattern, None, None),
    )?;
    let (boards, tasks) = tokio::try_join!(attach_tasks(&pool, boards), attach_boards(&pool, tasks))?;

    Ok(HttpResponse::Ok().json(json!({ "boards": boards, "tasks": tasks })))
}

/// Tasks matching `query`, narrowed to an exact `status` and/or `priority`.
#[get("/filter")]
pub async fn filter(
    pool: web::Data<PgPool>,
    params: web::Query<FilterQuery>,
) -> Result<impl Responder, AppError> {
    let pattern = contains_pattern(required_query(params.query.as_deref())?);
    let status = optional_filter(params.status.as_deref(), "status")?;
    let priority = optional_filter(params.priority.as_deref(), "priority")?;

    let tasks = Task::search(&pool, &pattern, status, priority).await?;
    let tasks = attach_boards(&pool, tasks).await?;

    Ok(HttpResponse::Ok().json(json!({ "tasks": tasks })))
}
