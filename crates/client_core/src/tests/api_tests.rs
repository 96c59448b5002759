use super::*;
use crate::test_support::MockServer;

use reqwest::StatusCode;
use shared::domain::CorpusId;

#[tokio::test]
async fn search_encodes_query_and_client() {
    let server = MockServer::builder()
        .respond(
            "GET",
            "/api/search",
            200,
            r#"[{"type":"note","entry":"froth","score":0.9,"corpus-id":"abc","additional":{}}]"#,
        )
        .spawn()
        .await;
    let client = ApiClient::new(format!("{}/", server.url));

    let results = client.search("flat white & cappuccino").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].corpus_id, CorpusId("abc".into()));

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].query.as_deref(),
        Some("q=flat+white+%26+cappuccino&client=web")
    );
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn api_token_is_sent_as_bearer() {
    let server = MockServer::builder()
        .respond("GET", "/auth/token", 200, "[]")
        .spawn()
        .await;
    let client = ApiClient::new(server.url.clone()).with_api_token("kk-123");

    let tokens = client.list_tokens().await.expect("list tokens");
    assert!(tokens.is_empty());
    assert_eq!(
        server.requests().await[0].authorization.as_deref(),
        Some("Bearer kk-123")
    );
}

#[tokio::test]
async fn non_success_status_is_reported_with_endpoint() {
    let server = MockServer::builder()
        .respond("PATCH", "/api/user/name", 403, "")
        .spawn()
        .await;
    let client = ApiClient::new(server.url.clone());

    let err = client.update_name("Ada").await.expect_err("forbidden");
    assert!(matches!(err, RequestError::Status { .. }));
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.endpoint(), "PATCH /api/user/name");
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let server = MockServer::builder()
        .respond("GET", "/api/content/computer", 200, r#"{"files": "nope"}"#)
        .spawn()
        .await;
    let client = ApiClient::new(server.url.clone());

    let err = client.list_computer_files().await.expect_err("not an array");
    assert!(matches!(err, RequestError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let client = ApiClient::new(format!("http://{addr}"));

    let err = client.disconnect_phone().await.expect_err("nothing listening");
    assert!(matches!(err, RequestError::Transport { .. }));
}

#[tokio::test]
async fn bulk_delete_sends_file_list_body() {
    let server = MockServer::builder()
        .respond("DELETE", "/api/content/files", 200, "")
        .spawn()
        .await;
    let client = ApiClient::new(server.url.clone());

    client
        .delete_files(&["a.md".to_string(), "b.org".to_string()])
        .await
        .expect("delete files");

    let body: serde_json::Value =
        serde_json::from_str(&server.requests().await[0].body).expect("json body");
    assert_eq!(body, serde_json::json!({"files": ["a.md", "b.org"]}));
}

#[tokio::test]
async fn model_and_content_paths_carry_their_kind() {
    let server = MockServer::builder()
        .respond("POST", "/api/model/paint", 200, "")
        .respond("DELETE", "/api/content/github", 200, "")
        .respond("PATCH", "/api/content", 200, "")
        .spawn()
        .await;
    let client = ApiClient::new(server.url.clone());

    client.select_model(Modality::Paint, 4).await.expect("model");
    client
        .disconnect_content(ContentSource::Github)
        .await
        .expect("disconnect");
    client
        .sync_content(ContentSource::Notion)
        .await
        .expect("sync");

    let requests = server.requests().await;
    assert_eq!(requests[0].path, "/api/model/paint");
    assert_eq!(requests[0].query.as_deref(), Some("id=4"));
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/api/content/github");
    assert_eq!(requests[2].query.as_deref(), Some("t=notion"));
}

#[test]
fn from_settings_rejects_bad_server_url() {
    let settings = ClientSettings {
        server_url: "not a url".into(),
        ..ClientSettings::default()
    };
    assert!(ApiClient::from_settings(&settings).is_err());
}
