use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Board, BoardInput},
    routes::parse_id,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Creates a board owned by the caller.
///
/// ## Responses:
/// - `201 Created`: `{"board": Board}`.
/// - `400 Bad Request`: missing, non-text or blank `name`.
/// - `401 Unauthorized`: missing or invalid token.
#[post("/create-board")]
pub async fn create_board(
    pool: web::Data<PgPool>,
    owner: AuthenticatedUser,
    board_data: web::Json<BoardInput>,
) -> Result<impl Responder, AppError> {
    if board_data.validate().is_err() || board_data.name.trim().is_empty() {
        return Err(AppError::BadRequest("Invalid board name".into()));
    }

    let board = Board::create(&pool, owner.id, &board_data.name).await?;

    log::info!("board {} created by {}", board.id, owner.id);
    Ok(HttpResponse::Created().json(json!({ "board": board })))
}

/// Lists the caller's boards, oldest first.
#[get("/my-boards")]
pub async fn my_boards(
    pool: web::Data<PgPool>,
    owner: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let boards = Board::list_by_owner(&pool, owner.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "boards": boards })))
}

/// Deletes one of the caller's boards together with all of its tasks.
///
/// Ownership is part of the delete predicate: another user's board is reported
/// as `404`, exactly like a board that does not exist.
#[delete("/delete/{id}")]
pub async fn delete_board(
    pool: web::Data<PgPool>,
    owner: AuthenticatedUser,
    board_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let board_id = parse_id(&board_id, "board")?;

    if Board::delete_owned(&pool, board_id, owner.id).await? == 0 {
        return Err(AppError::NotFound("Board not found".into()));
    }

    log::info!("board {} and its tasks deleted by {}", board_id, owner.id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Board and related tasks deleted successfully"
    })))
}
