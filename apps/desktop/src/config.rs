use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use client_core::transport::{DEFAULT_CHAT_PATH, DEFAULT_STATUS_PATH};
use shared::domain::UserType;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "chat-client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub chat_path: String,
    pub status_path: String,
    pub username: Option<String>,
    pub user_type: UserType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            chat_path: DEFAULT_CHAT_PATH.into(),
            status_path: DEFAULT_STATUS_PATH.into(),
            username: None,
            user_type: UserType::default(),
        }
    }
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

fn load_settings_with(config_path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => apply_file_overrides(&mut settings, &file_cfg),
            Err(err) => warn!(
                path = %config_path.display(),
                error = %err,
                "ignoring unreadable config file"
            ),
        }
    }

    apply_env_overrides(&mut settings, lookup);
    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("chat_path") {
        settings.chat_path = v.clone();
    }
    if let Some(v) = file_cfg.get("status_path") {
        settings.status_path = v.clone();
    }
    if let Some(v) = file_cfg.get("username") {
        settings.username = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("user_type") {
        apply_user_type(settings, v);
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CHAT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__CHAT_PATH") {
        settings.chat_path = v;
    }
    if let Some(v) = lookup("APP__STATUS_PATH") {
        settings.status_path = v;
    }

    if let Some(v) = lookup("CHAT_USERNAME") {
        settings.username = Some(v);
    }
    if let Some(v) = lookup("CHAT_USER_TYPE") {
        apply_user_type(settings, &v);
    }
}

fn apply_user_type(settings: &mut Settings, raw: &str) {
    match raw.parse() {
        Ok(user_type) => settings.user_type = user_type,
        Err(err) => warn!(error = %err, "keeping user type {}", settings.user_type),
    }
}

pub fn parse_server_url(raw_server_url: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw_server_url.trim())
        .with_context(|| format!("invalid server url '{raw_server_url}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("server url '{raw_server_url}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
