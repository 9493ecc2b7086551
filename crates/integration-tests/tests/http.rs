//! Health checks, the playground page, and request IDs.

use axum::http::StatusCode;
use phonebook_integration_tests::TestApp;
use phonebook_server::middleware::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_health() {
    let response = TestApp::new().get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_readiness_with_memory_store() {
    let response = TestApp::new().get("/health/ready").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_playground_is_served_on_both_paths() {
    let app = TestApp::new();

    for path in ["/", "/graphql"] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert!(response.body.contains("graphiql"), "{path}");
    }
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let response = TestApp::new().get("/health").await;
    assert!(response.headers.contains_key(REQUEST_ID_HEADER));
}
