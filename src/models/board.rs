use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::user::User;

/// A named collection of tasks owned by exactly one user.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /board/create-board`.
#[derive(Debug, Deserialize, Validate)]
pub struct BoardInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

const BOARD_COLUMNS: &str = "id, name, user_id, created_at";

impl Board {
    /// Inserts a board for `owner_id`. An owner whose account was deleted after
    /// their token was issued is `Unauthorized`.
    pub async fn create(db: &PgPool, owner_id: Uuid, name: &str) -> Result<Board, AppError> {
        let mut tx = db.begin().await?;
        if !User::lock_for_share(&mut tx, owner_id).await? {
            return Err(AppError::Unauthorized("User no longer exists".into()));
        }

        let board = sqlx::query_as::<_, Board>(&format!(
            "INSERT INTO boards (id, name, user_id) VALUES ($1, $2, $3) RETURNING {}",
            BOARD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(board)
    }

    pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> Result<Vec<Board>, AppError> {
        let boards = sqlx::query_as::<_, Board>(&format!(
            "SELECT {} FROM boards WHERE user_id = $1 ORDER BY created_at",
            BOARD_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(boards)
    }

    /// Locks the board row against deletion for the rest of the transaction.
    /// Returns `false` when no such board exists.
    pub async fn lock_for_share(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM boards WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(found.is_some())
    }

    /// Deletes the board only if `owner_id` owns it. Its tasks go with it
    /// (`ON DELETE CASCADE`). Returns the number of deleted rows.
    pub async fn delete_owned(db: &PgPool, id: Uuid, owner_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn search_by_name(db: &PgPool, pattern: &str) -> Result<Vec<Board>, AppError> {
        let boards = sqlx::query_as::<_, Board>(&format!(
            "SELECT {} FROM boards WHERE name ILIKE $1 ORDER BY created_at",
            BOARD_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(boards)
    }

    pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> Result<Vec<Board>, AppError> {
        let boards = sqlx::query_as::<_, Board>(&format!(
            "SELECT {} FROM boards WHERE id = ANY($1)",
            BOARD_COLUMNS
        ))
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(boards)
    }
}
