// Remote repository against a mocked record backend

use common::errors::{FieldError, RepositoryError, ValidationError};
use common::models::{Department, DepartmentPatch, Employee, EmployeePatch, EmployeeStatus};
use common::repository::{RemoteRepository, Repository};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn departments(server: &MockServer) -> RemoteRepository<Department> {
    RemoteRepository::new(reqwest::Client::new(), &format!("{}/api", server.uri()), None)
}

#[tokio::test]
async fn test_list_unwraps_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"Id": 1, "name": "Engineering", "managerId": 4},
                {"Id": 2, "name": "Operations"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listed = departments(&server).list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].manager_id, Some(4));
    assert_eq!(listed[1].name.as_deref(), Some("Operations"));
}

#[tokio::test]
async fn test_create_posts_patch_and_sends_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/employees"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_partial_json(json!({"firstName": "Ann", "status": "active"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"Id": 7, "firstName": "Ann", "lastName": "Lee", "status": "active"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = RemoteRepository::<Employee>::new(
        reqwest::Client::new(),
        &format!("{}/api/", server.uri()),
        Some("secret-key".to_string()),
    );
    let created = repo
        .create(EmployeePatch {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            status: Some(EmployeeStatus::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 7);
    assert_eq!(created.full_name(), "Ann Lee");
}

#[tokio::test]
async fn test_missing_record_translates_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/departments/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "message": "Department not found: 9"
        })))
        .mount(&server)
        .await;

    let err = departments(&server).get_by_id(9).await.unwrap_err();
    assert_eq!(err, RepositoryError::not_found("Department", 9));
}

#[tokio::test]
async fn test_validation_details_are_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/departments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "validation_error",
            "message": "Validation failed",
            "details": {"fields": [{"field": "name", "message": "Name is required"}]}
        })))
        .mount(&server)
        .await;

    let err = departments(&server)
        .create(DepartmentPatch::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepositoryError::Validation(ValidationError::Fields(vec![FieldError::new(
            "name",
            "Name is required"
        )]))
    );
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/departments/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database exploded"))
        .mount(&server)
        .await;

    let err = departments(&server).delete(1).await.unwrap_err();
    match err {
        RepositoryError::Transport(message) => assert!(message.contains("database exploded")),
        other => panic!("expected transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_rejects_changed_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/departments/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"Id": 4, "name": "Legal"}
        })))
        .mount(&server)
        .await;

    let err = departments(&server)
        .update(3, DepartmentPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let repo = RemoteRepository::<Department>::new(reqwest::Client::new(), &uri, None);
    let err = repo.list().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Transport(_)));
}
