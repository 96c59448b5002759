use super::*;
use crate::test_support::MockServer;

#[tokio::test]
async fn list_generate_and_delete() {
    let server = MockServer::builder()
        .respond(
            "GET",
            "/auth/token",
            200,
            r#"[{"token":"kk-1","name":"laptop"}]"#,
        )
        .respond(
            "POST",
            "/auth/token",
            200,
            r#"{"token":"kk-2","name":"phone"}"#,
        )
        .respond("DELETE", "/auth/token", 200, "")
        .spawn()
        .await;
    let mut keys = ApiKeyManager::new(server.client());

    keys.list().await.expect("listed");
    assert_eq!(keys.keys().len(), 1);

    let created = keys.generate().await.expect("created");
    assert_eq!(created.token, "kk-2");
    assert_eq!(keys.keys().len(), 2);

    keys.delete("kk-1").await.expect("deleted");
    assert_eq!(keys.keys().len(), 1);
    assert_eq!(keys.keys()[0].name, "phone");

    let requests = server.requests().await;
    assert_eq!(requests[2].query.as_deref(), Some("token=kk-1"));
}

#[tokio::test]
async fn empty_listing_keeps_known_keys() {
    let server = MockServer::builder()
        .respond(
            "POST",
            "/auth/token",
            200,
            r#"{"token":"kk-9","name":"desktop"}"#,
        )
        .respond("GET", "/auth/token", 200, "[]")
        .spawn()
        .await;
    let mut keys = ApiKeyManager::new(server.client());

    keys.generate().await.expect("created");
    keys.list().await.expect("listed");

    assert_eq!(keys.keys().len(), 1);
}

#[tokio::test]
async fn failed_delete_keeps_the_key() {
    let server = MockServer::builder()
        .respond(
            "GET",
            "/auth/token",
            200,
            r#"[{"token":"kk-1","name":"laptop"}]"#,
        )
        .respond("DELETE", "/auth/token", 403, "")
        .spawn()
        .await;
    let mut keys = ApiKeyManager::new(server.client());
    keys.list().await.expect("listed");

    let err = keys.delete("kk-1").await.expect_err("forbidden");

    assert_eq!(err.status(), Some(reqwest::StatusCode::FORBIDDEN));
    assert_eq!(keys.keys().len(), 1);
}
