use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn file_values_override_defaults() {
    let mut settings = ClientSettings::default();
    apply_file_settings(
        &mut settings,
        r#"
server_url = "https://assistant.example.com"
search_debounce_ms = 300
"#,
        Path::new("client.toml"),
    );

    assert_eq!(settings.server_url, "https://assistant.example.com");
    assert_eq!(settings.search_debounce(), Duration::from_millis(300));
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(settings.api_token, None);
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = ClientSettings::default();
    apply_file_settings(&mut settings, "server_url = [", Path::new("client.toml"));
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("ASSISTANT_SERVER_URL", "http://plain:1"),
        ("APP__SERVER_URL", "http://prefixed:2"),
        ("ASSISTANT_API_TOKEN", "kk-secret"),
        ("APP__SEARCH_DEBOUNCE_MS", "not-a-number"),
        ("APP__REQUEST_TIMEOUT_SECS", "5"),
    ]);
    let mut settings = ClientSettings::default();
    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_url, "http://prefixed:2");
    assert_eq!(settings.api_token.as_deref(), Some("kk-secret"));
    assert_eq!(settings.search_debounce_ms, 750);
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
}

#[test]
fn loads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("assistant_client_settings_{suffix}.toml"));
    fs::write(&path, "request_timeout_secs = 12\n").expect("write settings");

    let settings = load_settings_from(&path);
    assert_eq!(settings.request_timeout_secs, 12);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn normalizes_trailing_slashes() {
    assert_eq!(
        normalize_server_url("  https://assistant.example.com/ ").expect("valid url"),
        "https://assistant.example.com"
    );
}

#[test]
fn rejects_non_http_schemes() {
    assert!(normalize_server_url("ftp://assistant.example.com").is_err());
    assert!(normalize_server_url("   ").is_err());
    assert!(normalize_server_url("assistant.example.com").is_err());
}
