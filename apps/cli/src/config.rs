use std::{fs, io, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use client_core::StoreConfig;
use serde::Deserialize;
use shared::domain::UserId;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "todos.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub user_id: Option<i64>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000".into(),
            user_id: None,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    user_id: Option<i64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file if present, then the process environment.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    apply_file(&mut settings, config_path)?;
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, path: &Path) -> anyhow::Result<()> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.user_id {
        settings.user_id = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("TODOS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("TODOS_USER_ID") {
        settings.user_id = Some(parse_env("TODOS_USER_ID", &v)?);
    }
    if let Some(v) = lookup("APP__USER_ID") {
        settings.user_id = Some(parse_env("APP__USER_ID", &v)?);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_env("APP__REQUEST_TIMEOUT_SECS", &v)?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value '{raw}' for {key}"))
}

impl Settings {
    pub fn store_config(&self) -> anyhow::Result<StoreConfig> {
        let base_url = normalize_api_url(&self.api_url)?;
        let user_id = self.user_id.ok_or_else(|| {
            anyhow!("no user id configured; set TODOS_USER_ID, user_id in {DEFAULT_CONFIG_FILE}, or pass --user-id")
        })?;
        if self.request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }

        let mut config = StoreConfig::new(base_url, UserId(user_id));
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(config)
    }
}

pub(crate) fn normalize_api_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    let raw = if raw.is_empty() {
        Settings::default().api_url
    } else if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api url '{raw}' must use http or https");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
