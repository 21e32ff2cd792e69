use super::*;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::json;

fn auth_for(server: &MockServer) -> FirebaseAuth {
    let client = ClientBuilder::new(Client::new()).build();
    FirebaseAuth::new_with_client(client, server.url("/v1/projects/test-project"))
}

#[tokio::test]
async fn test_delete_user_success() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:delete")
            .header("content-type", "application/json")
            .json_body(json!({
                "localId": "user-uid"
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({}));
    });

    auth.delete_user("user-uid").await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_delete_user_reports_api_message() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:delete");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 400,
                    "message": "USER_NOT_FOUND",
                    "status": "INVALID_ARGUMENT"
                }
            }));
    });

    let err = auth.delete_user("ghost").await.unwrap_err();
    match err {
        AuthError::ApiError(msg) => {
            assert!(msg.contains("USER_NOT_FOUND"));
            assert!(msg.contains("code: 400"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    mock.assert();
}

#[tokio::test]
async fn test_get_user_by_email() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let email = "a@x.com";

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:lookup")
            .header("content-type", "application/json")
            .json_body(json!({
                "email": [email]
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "users": [
                    {
                        "localId": "acc1",
                        "email": email,
                        "emailVerified": true
                    }
                ]
            }));
    });

    let user = auth.get_user_by_email(email).await.unwrap();
    assert_eq!(user.local_id, "acc1");
    assert_eq!(user.email.as_deref(), Some(email));
    assert!(!user.disabled);

    mock.assert();
}

#[tokio::test]
async fn test_get_user_by_email_not_found() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:lookup");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "kind": "identitytoolkit#GetAccountInfoResponse" }));
    });

    let err = auth.get_user_by_email("nobody@x.com").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));

    mock.assert();
}

#[tokio::test]
async fn test_get_user_by_uid() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/projects/test-project/accounts:lookup")
            .json_body(json!({
                "localId": ["acc1"]
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "users": [{ "localId": "acc1" }]
            }));
    });

    let user = auth.get_user("acc1").await.unwrap();
    assert_eq!(user.label(), "acc1");

    mock.assert();
}

#[tokio::test]
async fn test_list_users_first_page() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/projects/test-project/accounts:batchGet")
            .query_param("maxResults", "1000");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "users": [
                    { "localId": "user1", "email": "user1@example.com" },
                    { "localId": "user2" }
                ],
                "nextPageToken": "user2"
            }));
    });

    let result = auth.list_users(1000, None).await.unwrap();
    let users = result.users.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].label(), "user1@example.com");
    assert_eq!(users[1].label(), "user2");
    assert_eq!(result.next_page_token.as_deref(), Some("user2"));

    mock.assert();
}

#[tokio::test]
async fn test_list_users_passes_page_token() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/projects/test-project/accounts:batchGet")
            .query_param("maxResults", "1000")
            .query_param("nextPageToken", "user2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({}));
    });

    let result = auth.list_users(1000, Some("user2")).await.unwrap();
    assert!(result.users.is_none());
    assert!(result.next_page_token.is_none());

    mock.assert();
}

#[tokio::test]
async fn test_list_users_failure_without_error_body() {
    let server = MockServer::start();
    let auth = auth_for(&server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/projects/test-project/accounts:batchGet");
        then.status(403).body("forbidden");
    });

    let err = auth.list_users(1000, None).await.unwrap_err();
    match err {
        AuthError::ApiError(msg) => assert!(msg.starts_with("List users failed: 403")),
        other => panic!("unexpected error: {other:?}"),
    }

    mock.assert();
}
