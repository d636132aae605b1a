#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

fn board_ids(body: &Value) -> Vec<String> {
    body["boards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn test_boards_are_listed_only_for_their_owner() {
    let Some(pool) = common::pool().await else { return };
    let app = test_app!(pool);
    let owner = common::register_user(&app, "owner", None).await;
    let stranger = common::register_user(&app, "stranger", None).await;

    let board_id = common::create_board(&app, &owner, "Sprint").await;
    let second_id = common::create_board(&app, &owner, "Sprint").await;
    assert_ne!(board_id, second_id);

    let req = test::TestRequest::get()
        .uri("/board/my-boards")
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (status, body) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let mut listed = board_ids(&body);
    listed.sort();
    let mut expected = vec![board_id.to_string(), second_id.to_string()];
    expected.sort();
    assert_eq!(listed, expected);
    assert!(body["boards"]
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["user_id"] == json!(owner.id)));

    let req = test::TestRequest::get()
        .uri("/board/my-boards")
        .insert_header(("x-auth-token", stranger.token.clone()))
        .to_request();
    let (status, body) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(board_ids(&body).is_empty());

    common::cleanup_users(&pool, &[owner.id, stranger.id]).await;
}

#[actix_rt::test]
async fn test_only_the_owner_can_delete_a_board() {
    let Some(pool) = common::pool().await else { return };
    let app = test_app!(pool);
    let owner = common::register_user(&app, "owner", None).await;
    let stranger = common::register_user(&app, "stranger", None).await;
    let board_id = common::create_board(&app, &owner, "Private").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/board/delete/{}", board_id))
        .insert_header(("x-auth-token", stranger.token.clone()))
        .to_request();
    let (status, body) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Board not found");

    let req = test::TestRequest::delete()
        .uri(&format!("/board/delete/{}", board_id))
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (status, _) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/board/my-boards")
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (_, body) = common::send(&app, req).await;
    assert!(!board_ids(&body).contains(&board_id.to_string()));

    // Already gone.
    let req = test::TestRequest::delete()
        .uri(&format!("/board/delete/{}", board_id))
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (status, _) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup_users(&pool, &[owner.id, stranger.id]).await;
}

#[actix_rt::test]
async fn test_deleting_a_board_removes_its_tasks() {
    let Some(pool) = common::pool().await else { return };
    let app = test_app!(pool);
    let owner = common::register_user(&app, "cascade", None).await;
    let board_id = common::create_board(&app, &owner, "Doomed").await;

    for title in ["first", "second"] {
        common::create_task(&app, &owner, board_id, json!({ "title": title })).await;
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/board/delete/{}", board_id))
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (status, body) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Board and related tasks deleted successfully");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE board_id = $1")
        .bind(board_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    common::cleanup_users(&pool, &[owner.id]).await;
}

#[actix_rt::test]
async fn test_delete_board_rejects_malformed_id() {
    let Some(pool) = common::pool().await else { return };
    let app = test_app!(pool);
    let owner = common::register_user(&app, "malformed", None).await;

    let req = test::TestRequest::delete()
        .uri("/board/delete/not-a-uuid")
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (status, _) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/board/delete/{}", Uuid::new_v4()))
        .insert_header(("x-auth-token", owner.token.clone()))
        .to_request();
    let (status, _) = common::send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup_users(&pool, &[owner.id]).await;
}
