//! Query and mutation functions, the query cache, and image orientation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

use parti_poodles_integration_tests::TestContext;

#[tokio::test]
async fn test_public_query_needs_no_session() {
    let ctx = TestContext::new();

    let response = ctx.query("puppies:listAvailable", json!({}), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"status": "success", "value": []}));
}

#[tokio::test]
async fn test_admin_functions_need_session() {
    let ctx = TestContext::new();

    let query = ctx.query("inquiries:list", json!({}), None).await;
    assert_eq!(query.status, StatusCode::UNAUTHORIZED);
    assert_eq!(query.json()["status"], "error");

    let mutation = ctx
        .mutation("puppies:create", json!({"name": "Bella"}), None)
        .await;
    assert_eq!(mutation.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_function() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let response = ctx.query("puppies:explode", json!({}), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["status"], "error");
}

#[tokio::test]
async fn test_mutation_invalidates_cached_query() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    // Prime the cache with an empty list
    let before = ctx.query("puppies:list", json!({}), None).await.json();
    assert_eq!(before["value"], json!([]));

    let created = ctx
        .mutation("puppies:create", json!({"name": "Bella"}), Some(&cookie))
        .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);

    let after = ctx.query("puppies:list", json!({}), None).await.json();
    assert_eq!(after["value"][0]["name"], "Bella");
}

#[tokio::test]
async fn test_update_and_remove() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let id = ctx
        .mutation("litters:create", json!({"name": "Spring 2025"}), Some(&cookie))
        .await
        .json()["value"]
        .as_str()
        .expect("id")
        .to_string();

    let updated = ctx
        .mutation(
            "litters:update",
            json!({"id": id, "is_active": false}),
            Some(&cookie),
        )
        .await
        .json();
    assert_eq!(updated["value"]["is_active"], false);
    assert_eq!(updated["value"]["name"], "Spring 2025");

    let active = ctx.query("litters:listActive", json!({}), None).await.json();
    assert_eq!(active["value"], json!([]));

    let removed = ctx
        .mutation("litters:remove", json!({"id": id}), Some(&cookie))
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let again = ctx
        .mutation("litters:remove", json!({"id": id}), Some(&cookie))
        .await;
    assert_eq!(again.status, StatusCode::OK);

    let gone = ctx.query("litters:get", json!({"id": id}), None).await.json();
    assert_eq!(gone["value"], json!(null));
}

#[tokio::test]
async fn test_public_inquiry_always_starts_new() {
    let ctx = TestContext::with_admin().await;

    let created = ctx
        .mutation(
            "inquiries:create",
            json!({
                "customer_name": "Sam Buyer",
                "email": "sam@example.com",
                "message": "Hello",
                "status": "closed"
            }),
            None,
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);

    let cookie = ctx.login().await;
    let count = ctx.query("inquiries:countNew", json!({}), Some(&cookie)).await.json();
    assert_eq!(count["value"], 1);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let ctx = TestContext::new();

    let response = ctx.query("puppies:get", json!({"id": "nope"}), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_admin_username_conflicts() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let response = ctx
        .mutation(
            "adminUsers:create",
            json!({"username": "owner", "password": "another-password"}),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_orientation_skips_inline_images() {
    let ctx = TestContext::new();

    for url in ["data%3Aimage%2Fjpeg%3Bbase64%2CAAAA", "blob%3Ahttp%3A%2F%2Flocalhost%2F1234"] {
        let response = ctx
            .get(&format!("/api/image-orientation?url={url}"), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"orientation": 1, "transform": ""}));
    }
}

#[tokio::test]
async fn test_orientation_never_fetches_off_site_hosts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        while let Ok((_socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let ctx = TestContext::new();
    let targets = [
        format!("http://127.0.0.1:{port}/internal/admin-secrets"),
        format!("http://localhost:{port}/photo.jpg"),
        "http://169.254.169.254/latest/meta-data".to_string(),
    ];
    for target in targets {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        let response = ctx
            .get(&format!("/api/image-orientation?url={encoded}"), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"orientation": 1, "transform": ""}));
    }

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
