use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::board::Board;
use crate::models::user::User;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum, whose labels contain spaces.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[sqlx(rename = "To Do")]
    #[serde(rename = "To Do")]
    ToDo,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sqlx(rename = "Completed")]
    #[serde(rename = "Completed")]
    Completed,
}

/// A unit of work on a board, as stored and as returned by the API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub creator_id: Uuid,
    /// Never null: falls back to `creator_id`.
    pub assignee_id: Uuid,
    pub board_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /task/create-task`.
///
/// `board_id` is kept as raw text so a missing id and a malformed id can be
/// told apart from a board that does not exist.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub board_id: Option<String>,
    pub assignee_id: Option<Uuid>,
}

/// Payload for `PUT /task/update-task/{task_id}`.
///
/// Omitted fields keep their stored value. For the nullable columns an explicit
/// `null` clears the value; an explicit `null` assignee resets it to the creator.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    pub board_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 1000))]
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<Uuid>>,
}

/// Marks a field that appeared in the payload, even as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A task together with the board it belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TaskWithBoard {
    #[serde(flatten)]
    pub task: Task,
    pub board: Option<Board>,
}

/// A board together with all of its tasks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BoardWithTasks {
    #[serde(flatten)]
    pub board: Board,
    pub tasks: Vec<Task>,
}

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, creator_id, \
                            assignee_id, board_id, created_at";

impl Task {
    /// Builds a new task owned by `creator_id` on `board_id`.
    /// The assignee defaults to the creator.
    pub fn new(input: TaskInput, creator_id: Uuid, board_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date,
            creator_id,
            assignee_id: input.assignee_id.unwrap_or(creator_id),
            board_id,
            created_at: Utc::now(),
        }
    }

    /// Merges the provided fields of `update` into this task.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(assignee_id) = update.assignee_id {
            self.assignee_id = assignee_id.unwrap_or(self.creator_id);
        }
    }

    /// Inserts the task after confirming, in the same transaction, that its
    /// creator, board and assignee exist. Those rows are held `FOR SHARE` so none
    /// can be deleted in between.
    ///
    /// A deleted creator is `Unauthorized`; a missing board or assignee is `NotFound`.
    pub async fn insert(db: &PgPool, task: &Task) -> Result<Task, AppError> {
        let mut tx = db.begin().await?;
        if !User::lock_for_share(&mut tx, task.creator_id).await? {
            return Err(AppError::Unauthorized("User no longer exists".into()));
        }
        if !Board::lock_for_share(&mut tx, task.board_id).await? {
            return Err(AppError::NotFound("Board not found".into()));
        }
        if !User::lock_for_share(&mut tx, task.assignee_id).await? {
            return Err(AppError::NotFound("Assignee not found".into()));
        }

        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, priority, status, due_date, creator_id, assignee_id, board_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.creator_id)
        .bind(task.assignee_id)
        .bind(task.board_id)
        .bind(task.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_owned(
        db: &PgPool,
        id: Uuid,
        creator_id: Uuid,
        board_id: Uuid,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND creator_id = $2 AND board_id = $3",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(creator_id)
        .bind(board_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Tasks on `board_id` created by `creator_id`. Tasks merely assigned to the
    /// user are not included.
    pub async fn list_for_creator(
        db: &PgPool,
        creator_id: Uuid,
        board_id: Uuid,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE creator_id = $1 AND board_id = $2 ORDER BY created_at",
            TASK_COLUMNS
        ))
        .bind(creator_id)
        .bind(board_id)
        .fetch_all(db)
        .await?;
        Ok(tasks)
    }

    pub async fn list_by_boards(db: &PgPool, board_ids: &[Uuid]) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE board_id = ANY($1) ORDER BY created_at",
            TASK_COLUMNS
        ))
        .bind(board_ids)
        .fetch_all(db)
        .await?;
        Ok(tasks)
    }

    /// Persists every mutable column of this task. The assignee must exist.
    pub async fn save(&self, db: &PgPool) -> Result<Task, AppError> {
        let mut tx = db.begin().await?;
        if !User::lock_for_share(&mut tx, self.assignee_id).await? {
            return Err(AppError::NotFound("Assignee not found".into()));
        }

        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $2, description = $3, priority = $4, status = $5, due_date = $6, assignee_id = $7
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.priority)
        .bind(self.status)
        .bind(self.due_date)
        .bind(self.assignee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Returns the number of deleted rows.
    pub async fn delete_owned(
        db: &PgPool,
        id: Uuid,
        creator_id: Uuid,
        board_id: Uuid,
    ) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM tasks WHERE id = $1 AND creator_id = $2 AND board_id = $3")
                .bind(id)
                .bind(creator_id)
                .bind(board_id)
                .execute(db)
                .await?;
        Ok(result.rows_affected())
    }

    /// Tasks whose title or description matches `pattern` (an `ILIKE` pattern),
    /// optionally narrowed to an exact status and priority.
    pub async fn search(
        db: &PgPool,
        pattern: &str,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks
             WHERE (title ILIKE $1 OR description ILIKE $1)
               AND ($2::task_status IS NULL OR status = $2)
               AND ($3::task_priority IS NULL OR priority = $3)
             ORDER BY created_at",
            TASK_COLUMNS
        ))
        .bind(pattern)
        .bind(status)
        .bind(priority)
        .fetch_all(db)
        .await?;
        Ok(tasks)
    }
}
