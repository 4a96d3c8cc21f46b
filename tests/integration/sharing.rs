//! End-to-end HTTP tests for task sharing: visibility grants, creator-only
//! authorization, and idempotent set semantics.

use std::sync::Arc;

use serde_json::{Value, json};
use taskhub_core::user::{User, UserId};
use taskhub_server::directory::{SeedUser, UserDirectory};
use taskhub_server::server::{self, AppState};
use uuid::Uuid;

const BOB_ID: u128 = 2;
const CAROL_ID: u128 = 3;

fn seed_user(n: u128, name: &str, token: &str) -> SeedUser {
    SeedUser {
        user: User {
            id: UserId::from_uuid(Uuid::from_u128(n)),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        },
        token: token.to_string(),
    }
}

async fn spawn_server() -> String {
    let directory = Arc::new(UserDirectory::new(vec![
        seed_user(1, "Alice", "token-alice"),
        seed_user(BOB_ID, "Bob", "token-bob"),
        seed_user(CAROL_ID, "Carol", "token-carol"),
    ]));
    let state = Arc::new(AppState::new(directory));
    let (addr, _handle) = server::start_server("127.0.0.1:0", state)
        .await
        .expect("failed to start test server");
    format!("http://{addr}")
}

async fn create_task(base: &str, token: &str) -> String {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/tasks"))
        .bearer_auth(token)
        .json(&json!({ "title": "Shared work", "priority": "HIGH" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let task: Value = response.json().await.unwrap();
    task["id"].as_str().unwrap().to_string()
}

async fn share(base: &str, token: &str, task_id: &str, with: &[u128]) -> reqwest::Response {
    let user_ids: Vec<String> = with.iter().map(|n| Uuid::from_u128(*n).to_string()).collect();
    reqwest::Client::new()
        .post(format!("{base}/api/tasks/{task_id}/share"))
        .bearer_auth(token)
        .json(&json!({ "userIds": user_ids }))
        .send()
        .await
        .unwrap()
}

async fn list_tasks(base: &str, token: &str) -> Vec<Value> {
    let response = reqwest::Client::new()
        .get(format!("{base}/api/tasks"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let tasks: Value = response.json().await.unwrap();
    tasks.as_array().unwrap().clone()
}

#[tokio::test]
async fn unshared_task_is_invisible_to_others() {
    let base = spawn_server().await;
    create_task(&base, "token-alice").await;

    assert!(list_tasks(&base, "token-bob").await.is_empty());
    assert_eq!(list_tasks(&base, "token-alice").await.len(), 1);
}

#[tokio::test]
async fn grantee_can_change_status_after_share() {
    let base = spawn_server().await;
    let task_id = create_task(&base, "token-alice").await;

    // Before sharing, Bob gets the same signal as for an absent task.
    let denied = reqwest::Client::new()
        .patch(format!("{base}/api/tasks/{task_id}/status"))
        .bearer_auth("token-bob")
        .json(&json!({ "status": "DONE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 404);

    let shared = share(&base, "token-alice", &task_id, &[BOB_ID]).await;
    assert_eq!(shared.status(), 200);

    let allowed = reqwest::Client::new()
        .patch(format!("{base}/api/tasks/{task_id}/status"))
        .bearer_auth("token-bob")
        .json(&json!({ "status": "DONE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), 200);
    let body: Value = allowed.json().await.unwrap();
    assert_eq!(body["status"], "DONE");
}

#[tokio::test]
async fn non_creator_cannot_share() {
    let base = spawn_server().await;
    let task_id = create_task(&base, "token-alice").await;
    assert_eq!(share(&base, "token-alice", &task_id, &[BOB_ID]).await.status(), 200);

    // Bob is visible-but-not-creator; his grant attempt reads as not-found.
    let denied = share(&base, "token-bob", &task_id, &[CAROL_ID]).await;
    assert_eq!(denied.status(), 404);
    let body: Value = denied.json().await.unwrap();
    assert_eq!(body["message"], "Task not found");

    // And sharedWith is unchanged: Bob only.
    let tasks = list_tasks(&base, "token-alice").await;
    let shared_with = tasks[0]["sharedWith"].as_array().unwrap();
    assert_eq!(shared_with.len(), 1);
    assert_eq!(shared_with[0]["name"], "Bob");
}

#[tokio::test]
async fn sharing_is_idempotent() {
    let base = spawn_server().await;
    let task_id = create_task(&base, "token-alice").await;

    assert_eq!(share(&base, "token-alice", &task_id, &[BOB_ID]).await.status(), 200);
    let again = share(&base, "token-alice", &task_id, &[BOB_ID]).await;
    assert_eq!(again.status(), 200);

    let body: Value = again.json().await.unwrap();
    assert_eq!(body["sharedWith"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unshare_revokes_visibility() {
    let base = spawn_server().await;
    let task_id = create_task(&base, "token-alice").await;
    share(&base, "token-alice", &task_id, &[BOB_ID]).await;
    assert_eq!(list_tasks(&base, "token-bob").await.len(), 1);

    let response = reqwest::Client::new()
        .delete(format!(
            "{base}/api/tasks/{task_id}/share/{}",
            Uuid::from_u128(BOB_ID)
        ))
        .bearer_auth("token-alice")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["sharedWith"].as_array().unwrap().is_empty());

    assert!(list_tasks(&base, "token-bob").await.is_empty());
}

#[tokio::test]
async fn unshare_non_member_is_noop() {
    let base = spawn_server().await;
    let task_id = create_task(&base, "token-alice").await;
    share(&base, "token-alice", &task_id, &[BOB_ID]).await;

    let response = reqwest::Client::new()
        .delete(format!(
            "{base}/api/tasks/{task_id}/share/{}",
            Uuid::from_u128(CAROL_ID)
        ))
        .bearer_auth("token-alice")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    // Bob's grant is untouched.
    assert_eq!(body["sharedWith"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn assignee_sees_task_without_explicit_share() {
    let base = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/tasks"))
        .bearer_auth("token-alice")
        .json(&json!({
            "title": "Assigned work",
            "priority": "MODERATE",
            "assignees": [Uuid::from_u128(BOB_ID).to_string()]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let bobs = list_tasks(&base, "token-bob").await;
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0]["assignees"][0]["name"], "Bob");
}
