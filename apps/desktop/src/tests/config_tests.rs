use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_point_at_local_chat_service() {
    let settings = Settings::default();
    assert_eq!(settings.server_url, "http://127.0.0.1:8080");
    assert_eq!(settings.chat_path, "/api/chat/ui");
    assert_eq!(settings.status_path, "/api/chat/engine-status");
    assert_eq!(settings.user_type, UserType::Customer);
    assert!(settings.username.is_none());
}

fn temp_config(tag: &str, contents: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("chat_desktop_config_{tag}_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("chat-client.toml");
    fs::write(&path, contents).expect("write config");
    (temp_root, path)
}

#[test]
fn file_values_override_defaults() {
    let (temp_root, path) = temp_config(
        "file",
        "server_url = \"http://chat.internal:9000\"\nusername = \"al\"\nuser_type = \"tradesperson\"\n",
    );

    let settings = load_settings_with(&path, env_from(&[]));

    assert_eq!(settings.server_url, "http://chat.internal:9000");
    assert_eq!(settings.username.as_deref(), Some("al"));
    assert_eq!(settings.user_type, UserType::Tradesperson);
    assert_eq!(settings.chat_path, "/api/chat/ui");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn env_overrides_file() {
    let (temp_root, path) = temp_config("env", "server_url = \"http://from-file:1\"\n");

    let settings = load_settings_with(&path, env_from(&[("CHAT_SERVER_URL", "http://from-env:2")]));

    assert_eq!(settings.server_url, "http://from-env:2");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn unreadable_file_is_ignored() {
    let (temp_root, path) = temp_config("bad", "server_url = [1, 2]\n");

    let settings = load_settings_with(&path, env_from(&[]));

    assert_eq!(settings, Settings::default());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let settings = load_settings_with(Path::new("/nonexistent/chat-client.toml"), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("CHAT_SERVER_URL", "http://plain:1"),
            ("APP__SERVER_URL", "http://prefixed:2"),
            ("APP__CHAT_PATH", "/v2/chat"),
            ("CHAT_USERNAME", "bob"),
        ]),
    );

    assert_eq!(settings.server_url, "http://prefixed:2");
    assert_eq!(settings.chat_path, "/v2/chat");
    assert_eq!(settings.username.as_deref(), Some("bob"));
}

#[test]
fn unknown_user_type_keeps_previous_value() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, env_from(&[("CHAT_USER_TYPE", "admin")]));
    assert_eq!(settings.user_type, UserType::Customer);
}

#[test]
fn parses_http_urls_only() {
    assert_eq!(
        parse_server_url(" http://localhost:8080 ")
            .expect("valid")
            .as_str(),
        "http://localhost:8080/"
    );
    assert!(parse_server_url("localhost:8080").is_err());
    assert!(parse_server_url("ftp://example.test").is_err());
}
