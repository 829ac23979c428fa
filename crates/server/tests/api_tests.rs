//! Integration tests for the HTTP surface

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use cloudboard::commands::CommandExecutor;
use cloudboard::storage::InMemoryStorage;
use serde_json::{json, Value};
use std::sync::Arc;

fn as_user(request: TestRequest, user: &'static str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_static(user),
    )
}

/// Helper to create test server with initialized storage
fn create_test_server() -> TestServer {
    let executor = CommandExecutor::new(InMemoryStorage::new());
    executor.init().expect("Failed to init");

    let app = cloudboard_server::routes::create_routes(Arc::new(executor));
    TestServer::new(app).expect("Failed to create test server")
}

/// Creates a project as user 1 and returns (project id, default board id)
async fn create_project(server: &TestServer) -> (i64, i64) {
    let project: Value = as_user(server.post("/projects"), "1")
        .json(&json!({ "name": "Apollo", "description": "Moon" }))
        .await
        .json();
    let project_id = project["id"].as_i64().unwrap();

    let boards: Value = as_user(server.get(&format!("/projects/{}/boards", project_id)), "1")
        .await
        .json();
    (project_id, boards[0]["id"].as_i64().unwrap())
}

async fn create_backlog_item(server: &TestServer, project_id: i64, body: Value) -> Value {
    let response = as_user(server.post(&format!("/projects/{}/backlog", project_id)), "1")
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_needs_no_user() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_work_item_types_lists_hierarchy() {
    let server = create_test_server();
    let rules: Value = server.get("/work-item-types").await.json();
    assert_eq!(rules.as_array().unwrap().len(), 5);
    assert_eq!(rules[0]["type"], "Epic");
    assert_eq!(rules[0]["allowedChildren"], json!(["Feature", "Bug"]));
    assert_eq!(rules[2]["displayName"], "Product Backlog Item");
}

#[tokio::test]
async fn test_missing_or_bad_user_header_is_401() {
    let server = create_test_server();

    let response = server.get("/projects").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let problem: Value = response.json();
    assert_eq!(problem["status"], 401);
    assert_eq!(problem["instance"], "/projects");
    assert!(problem["traceId"].is_string());

    as_user(server.get("/projects"), "abc")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_path_id_is_problem_400() {
    let server = create_test_server();

    for path in ["/work-items/abc", "/projects/1x/boards", "/sprints/99999999999999999999/stats"] {
        let response = as_user(server.get(path), "1").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
        let problem: Value = response.json();
        assert_eq!(problem["title"], "Invalid Argument");
        assert_eq!(problem["status"], 400);
        assert_eq!(problem["instance"], path);
    }
}

#[tokio::test]
async fn test_other_user_gets_403() {
    let server = create_test_server();
    let (project_id, _) = create_project(&server).await;

    let response = as_user(server.get(&format!("/projects/{}", project_id)), "2").await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["title"], "Access Denied");
}

#[tokio::test]
async fn test_illegal_child_is_400_with_message() {
    let server = create_test_server();
    let (project_id, _) = create_project(&server).await;
    let epic = create_backlog_item(&server, project_id, json!({ "title": "Epic", "type": "Epic" })).await;

    let response = as_user(server.post(&format!("/projects/{}/backlog", project_id)), "1")
        .json(&json!({ "title": "Task", "type": "Task", "parentId": epic["id"] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let problem: Value = response.json();
    assert_eq!(
        problem["detail"],
        "A Epic cannot have a Task as a child. Allowed children: Feature, Bug"
    );
    assert_eq!(problem["type"], "https://httpstatuses.com/400");
}

#[tokio::test]
async fn test_delete_parent_with_children_is_rejected() {
    let server = create_test_server();
    let (project_id, _) = create_project(&server).await;
    let epic = create_backlog_item(&server, project_id, json!({ "title": "Epic", "type": "Epic" })).await;
    let feature = create_backlog_item(
        &server,
        project_id,
        json!({ "title": "Feature", "type": "Feature", "parentId": epic["id"] }),
    )
    .await;

    as_user(server.delete(&format!("/work-items/{}", epic["id"])), "1")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    as_user(server.delete(&format!("/work-items/{}", feature["id"])), "1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    as_user(server.delete(&format!("/work-items/{}", epic["id"])), "1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    as_user(server.get(&format!("/work-items/{}", epic["id"])), "1")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_move_to_parent_rejects_cycle() {
    let server = create_test_server();
    let (project_id, _) = create_project(&server).await;
    let epic = create_backlog_item(&server, project_id, json!({ "title": "Epic", "type": "Epic" })).await;
    let feature = create_backlog_item(
        &server,
        project_id,
        json!({ "title": "Feature", "type": "Feature", "parentId": epic["id"] }),
    )
    .await;

    let response = as_user(server.patch(&format!("/work-items/{}/parent", epic["id"])), "1")
        .json(&json!({ "parentId": feature["id"] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["detail"],
        "This would create a circular reference in the hierarchy"
    );
}

#[tokio::test]
async fn test_backlog_reorder_round_trip() {
    let server = create_test_server();
    let (project_id, _) = create_project(&server).await;
    let a = create_backlog_item(&server, project_id, json!({ "title": "a", "type": "Epic" })).await;
    let b = create_backlog_item(&server, project_id, json!({ "title": "b", "type": "Epic" })).await;
    assert_eq!(a["backlogOrder"], 0);
    assert_eq!(b["backlogOrder"], 100);

    as_user(server.put(&format!("/projects/{}/backlog/order", project_id)), "1")
        .json(&json!({ "items": [
            { "itemId": a["id"], "order": 500 },
            { "itemId": b["id"], "order": 5 }
        ] }))
        .await
        .assert_status_ok();

    let backlog: Value = as_user(server.get(&format!("/projects/{}/backlog", project_id)), "1")
        .await
        .json();
    assert_eq!(backlog[0]["title"], "b");
    assert_eq!(backlog[1]["backlogOrder"], 500);

    as_user(server.put(&format!("/projects/{}/backlog/order", project_id)), "1")
        .json(&json!({ "items": [{ "itemId": 999, "order": 1 }] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_type_change_returns_warnings() {
    let server = create_test_server();
    let (project_id, _) = create_project(&server).await;
    let story = create_backlog_item(&server, project_id, json!({ "title": "Story", "type": "PBI" })).await;
    create_backlog_item(
        &server,
        project_id,
        json!({ "title": "Defect", "type": "Bug", "parentId": story["id"] }),
    )
    .await;

    let response = as_user(server.put(&format!("/work-items/{}", story["id"])), "1")
        .json(&json!({ "title": "Story", "type": "Feature", "status": "To Do" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["item"]["type"], "Feature");
    assert_eq!(body["warnings"], json!(["This change will affect 1 child items"]));
}

#[tokio::test]
async fn test_board_columns_and_sprint_flow() {
    let server = create_test_server();
    let (_, board_id) = create_project(&server).await;

    let item: Value = as_user(server.post(&format!("/boards/{}/work-items", board_id)), "1")
        .json(&json!({ "title": "Card", "type": "Task", "estimatedHours": 8.0 }))
        .await
        .json();
    assert_eq!(item["status"], "To Do");

    let sprint = as_user(server.post(&format!("/boards/{}/sprints", board_id)), "1")
        .json(&json!({
            "name": "Sprint 1",
            "startDate": "2024-03-01T00:00:00Z",
            "endDate": "2024-03-10T00:00:00Z"
        }))
        .await;
    sprint.assert_status(StatusCode::CREATED);
    let sprint: Value = sprint.json();
    assert_eq!(sprint["status"], "Planning");

    as_user(server.patch(&format!("/work-items/{}/sprint", item["id"])), "1")
        .json(&json!({ "sprintId": sprint["id"] }))
        .await
        .assert_status_ok();
    as_user(server.post(&format!("/sprints/{}/start", sprint["id"])), "1")
        .await
        .assert_status_ok();

    let stats: Value = as_user(server.get(&format!("/sprints/{}/stats", sprint["id"])), "1")
        .await
        .json();
    assert_eq!(stats["totalItems"], 1);
    assert_eq!(stats["todoCount"], 1);
    assert_eq!(stats["remainingEstimatedHours"], 8.0);

    let burndown: Value = as_user(server.get(&format!("/sprints/{}/burndown", sprint["id"])), "1")
        .await
        .json();
    assert_eq!(burndown.as_array().unwrap().len(), 11);

    let completion: Value = as_user(server.post(&format!("/sprints/{}/complete", sprint["id"])), "1")
        .await
        .json();
    assert_eq!(completion["movedToBacklog"], 1);

    let too_many: Vec<Value> = (0..6)
        .map(|i| json!({ "name": format!("C{}", i), "order": i, "category": "InProgress" }))
        .collect();
    let response = as_user(server.put(&format!("/boards/{}", board_id)), "1")
        .json(&json!({ "name": "Board", "columns": too_many }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["detail"],
        "Board must have between 1 and 5 columns"
    );
}

#[tokio::test]
async fn test_malformed_body_is_problem_400() {
    let server = create_test_server();
    let response = as_user(server.post("/projects"), "1")
        .json(&json!({ "description": "no name" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["title"], "Invalid Argument");
}
