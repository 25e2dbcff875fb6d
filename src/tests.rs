// End-to-end tests for the Item API router
// Every request goes through the real router, extractors and error mapping
// over an in-memory store.

use super::*;
use crate::test_support::{other_token_config, test_state, test_token_service};
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_test_server() -> TestServer {
    TestServer::new(create_router(test_state())).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

/// Register a user and return its id
async fn register(server: &TestServer, email: &str, password: &str) -> i64 {
    let response = server
        .post("/api/users")
        .json(&json!({"email": email, "password": password}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/tokens")
        .json(&json!({"email": email, "password": password}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    response.json::<Value>()["token"].as_str().unwrap().to_string()
}

/// Register and log in, returning the bearer token
async fn signed_in(server: &TestServer, email: &str) -> String {
    register(server, email, "password123").await;
    login(server, email, "password123").await
}

async fn create_item(server: &TestServer, token: &str, name: &str, price: i64) -> Value {
    let response = server
        .post("/api/items")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({"name": name, "price": price}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    response.json::<Value>()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_index_are_empty_200() {
    let server = create_test_server();

    for path in ["/api", "/api/health"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "");
    }
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = create_test_server();

    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let doc = response.json::<Value>();
    for path in ["/api/auth/tokens", "/api/users", "/api/users/me", "/api/items", "/api/items/{id}"] {
        assert!(doc["paths"][path].is_object(), "missing {}", path);
    }
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

// ============================================================================
// Full scenario
// ============================================================================

#[tokio::test]
async fn test_register_login_me_and_items_flow() {
    let server = create_test_server();

    let alice_id = register(&server, "alice@example.com", "password123").await;
    let token = login(&server, "alice@example.com", "password123").await;
    assert_eq!(token.split('.').count(), 3);

    let me = server
        .get("/api/users/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(me.status_code(), StatusCode::OK);
    let me = me.json::<Value>();
    assert_eq!(me["id"], json!(alice_id));
    assert_eq!(me["email"], "alice@example.com");
    assert!(me["createdAt"].is_string());
    assert!(me["updatedAt"].is_string());

    let item = create_item(&server, &token, "Book", 10).await;
    assert_eq!(item["ownerId"], json!(alice_id));
    assert_eq!(item["name"], "Book");
    assert_eq!(item["price"], 10);

    let fetched = server
        .get(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>(), item);

    let bob_token = signed_in(&server, "bob@example.com").await;
    let foreign = server
        .get(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&bob_token))
        .await;
    assert_eq!(foreign.status_code(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_reports_all_field_errors() {
    let server = create_test_server();

    let response = server
        .post("/api/users")
        .json(&json!({"email": "not-an-email", "password": "short"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["email"].is_string());
    assert!(body["password"].is_string());
}

#[tokio::test]
async fn test_rejected_registration_creates_no_user() {
    let server = create_test_server();

    let rejected = server
        .post("/api/users")
        .json(&json!({"email": "alice@example.com", "password": "short"}))
        .await;
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);

    let login = server
        .post("/api/auth/tokens")
        .json(&json!({"email": "alice@example.com", "password": "short"}))
        .await;
    assert_eq!(login.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(login.json::<Value>(), json!({"email": "Incorrect email address"}));

    register(&server, "alice@example.com", "password123").await;
}

#[tokio::test]
async fn test_register_trims_and_lowercases_email() {
    let server = create_test_server();

    let response = server
        .post("/api/users")
        .json(&json!({"email": "  Alice@Example.COM ", "password": "password123"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    assert_eq!(response.json::<Value>()["email"], "alice@example.com");

    let token = login(&server, " alice@example.com ", "password123").await;
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn test_register_missing_fields() {
    let server = create_test_server();

    let response = server.post("/api/users").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({"email": "Email is required", "password": "Password is required"})
    );
}

#[tokio::test]
async fn test_register_duplicate_email_case_insensitive() {
    let server = create_test_server();
    register(&server, "alice@example.com", "password123").await;

    let response = server
        .post("/api/users")
        .json(&json!({"email": "ALICE@example.com", "password": "password456"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["email"].is_string());
}

#[tokio::test]
async fn test_concurrent_duplicate_registration_has_one_winner() {
    let server = create_test_server();
    let payload = json!({"email": "race@example.com", "password": "password123"});

    let (first, second) = tokio::join!(
        async { server.post("/api/users").json(&payload).await },
        async { server.post("/api/users").json(&payload).await }
    );

    let mut statuses = vec![first.status_code().as_u16(), second.status_code().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 400]);
}

#[tokio::test]
async fn test_response_never_contains_password_hash() {
    let server = create_test_server();

    let response = server
        .post("/api/users")
        .json(&json!({"email": "alice@example.com", "password": "password123"}))
        .await;

    let text = response.text();
    assert!(!text.contains("argon2"));
    assert!(!text.contains("password"));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_unknown_email() {
    let server = create_test_server();

    let response = server
        .post("/api/auth/tokens")
        .json(&json!({"email": "nobody@example.com", "password": "password123"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({"email": "Incorrect email address"}));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = create_test_server();
    register(&server, "alice@example.com", "password123").await;

    let response = server
        .post("/api/auth/tokens")
        .json(&json!({"email": "alice@example.com", "password": "password124"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>(), json!({"password": "Incorrect password"}));
}

#[tokio::test]
async fn test_login_malformed_body() {
    let server = create_test_server();

    let response = server
        .post("/api/auth/tokens")
        .json(&json!({"email": "alice@example.com"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["body"].is_string());
}

// ============================================================================
// Token checks
// ============================================================================

#[tokio::test]
async fn test_me_without_token() {
    let server = create_test_server();

    let response = server.get("/api/users/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_routes_reject_bad_tokens() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;
    let user_id = test_token_service().verify(&token, Utc::now()).unwrap();

    let expired = test_token_service()
        .issue(user_id, Utc::now() - ChronoDuration::days(31))
        .unwrap();
    let foreign_key = TokenService::new(&other_token_config())
        .unwrap()
        .issue(user_id, Utc::now())
        .unwrap();

    let mut tampered = token.clone().into_bytes();
    let last = tampered.len() - 2;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    for bad in [expired, foreign_key, tampered, "garbage".to_string()] {
        for path in ["/api/users/me", "/api/items"] {
            let response = server
                .get(path)
                .add_header(header::AUTHORIZATION, bearer(&bad))
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{}", path);
        }
    }
}

#[tokio::test]
async fn test_token_for_deleted_subject_is_rejected() {
    let server = create_test_server();
    let orphan = test_token_service().issue(4242, Utc::now()).unwrap();

    let response = server
        .get("/api/users/me")
        .add_header(header::AUTHORIZATION, bearer(&orphan))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_create_item_validation() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;

    let long_name = "x".repeat(251);
    let cases = [
        (json!({}), vec!["name", "price"]),
        (json!({"name": "", "price": 10}), vec!["name"]),
        (json!({"name": long_name, "price": 10}), vec!["name"]),
        (json!({"name": "Book", "price": -1}), vec!["price"]),
    ];

    for (payload, fields) in cases {
        let response = server
            .post("/api/items")
            .add_header(header::AUTHORIZATION, bearer(&token))
            .json(&payload)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", payload);

        let body = response.json::<Value>();
        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, fields, "{}", payload);
    }
}

#[tokio::test]
async fn test_create_item_boundaries_accepted() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;

    let item = create_item(&server, &token, &"x".repeat(250), 0).await;
    assert_eq!(item["price"], 0);
}

#[tokio::test]
async fn test_create_item_fractional_price_is_malformed() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;

    let response = server
        .post("/api/items")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "Book", "price": 10.5}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["body"].is_string());
}

#[tokio::test]
async fn test_list_items_envelope_scoped_to_owner() {
    let server = create_test_server();
    let alice = signed_in(&server, "alice@example.com").await;
    let bob = signed_in(&server, "bob@example.com").await;

    let empty = server
        .get("/api/items")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .await;
    assert_eq!(empty.status_code(), StatusCode::OK);
    assert_eq!(empty.json::<Value>(), json!({"data": []}));

    let book = create_item(&server, &alice, "Book", 10).await;
    create_item(&server, &bob, "Lamp", 30).await;
    let pen = create_item(&server, &alice, "Pen", 2).await;

    let response = server
        .get("/api/items")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({"data": [book, pen]}));
}

#[tokio::test]
async fn test_update_item() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;
    let item = create_item(&server, &token, "Book", 10).await;

    let response = server
        .patch(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "Notebook", "price": 12}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = response.json::<Value>();
    assert_eq!(updated["id"], item["id"]);
    assert_eq!(updated["ownerId"], item["ownerId"]);
    assert_eq!(updated["name"], "Notebook");
    assert_eq!(updated["price"], 12);
}

#[tokio::test]
async fn test_update_item_validation_runs_before_lookup() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;

    let response = server
        .patch("/api/items/999")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "", "price": -5}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["name"].is_string());
    assert!(body["price"].is_string());
}

#[tokio::test]
async fn test_rejected_update_leaves_item_unchanged() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;
    let item = create_item(&server, &token, "Book", 10).await;

    let response = server
        .patch(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "", "price": -5}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let fetched = server
        .get(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>(), item);
}

#[tokio::test]
async fn test_update_advances_updated_at_only() {
    let server = create_test_server();
    let token = signed_in(&server, "alice@example.com").await;
    let item = create_item(&server, &token, "Book", 10).await;

    let updated = server
        .patch(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "Notebook", "price": 12}))
        .await
        .json::<Value>();

    assert_eq!(updated["createdAt"], item["createdAt"]);
    let before: chrono::DateTime<Utc> = item["updatedAt"].as_str().unwrap().parse().unwrap();
    let after: chrono::DateTime<Utc> = updated["updatedAt"].as_str().unwrap().parse().unwrap();
    assert!(after >= before);
}

#[tokio::test]
async fn test_token_for_missing_user_cannot_create_items() {
    let server = create_test_server();
    let orphan = test_token_service().issue(4242, Utc::now()).unwrap();

    let response = server
        .post("/api/items")
        .add_header(header::AUTHORIZATION, bearer(&orphan))
        .json(&json!({"name": "Book", "price": 10}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_foreign_item_is_indistinguishable_from_missing() {
    let server = create_test_server();
    let alice = signed_in(&server, "alice@example.com").await;
    let bob = signed_in(&server, "bob@example.com").await;
    let item = create_item(&server, &alice, "Book", 10).await;

    let foreign_get = server
        .get(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .await;
    let missing_get = server
        .get("/api/items/999")
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .await;
    let foreign_patch = server
        .patch(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .json(&json!({"name": "Stolen", "price": 0}))
        .await;
    let missing_patch = server
        .patch("/api/items/999")
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .json(&json!({"name": "Stolen", "price": 0}))
        .await;

    for response in [&foreign_get, &missing_get, &foreign_patch, &missing_patch] {
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["error_code"], "NOT_FOUND");
        assert_eq!(body["message"], "Resource not found");
    }

    // Alice's item is untouched
    let own = server
        .get(&format!("/api/items/{}", item["id"]))
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .await;
    assert_eq!(own.json::<Value>(), item);
}
