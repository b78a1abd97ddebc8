use std::{fs, path::Path, time::Duration};

use client_core::{IdAssignment, PhonebookOptions, DEFAULT_NOTIFICATION_DURATION};

pub const DEFAULT_CONFIG_FILE: &str = "phonebook.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub notification_secs: u64,
    pub id_assignment: IdAssignment,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".into(),
            notification_secs: DEFAULT_NOTIFICATION_DURATION.as_secs(),
            id_assignment: IdAssignment::Server,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn phonebook_options(&self) -> PhonebookOptions {
        PhonebookOptions {
            notification_duration: Duration::from_secs(self.notification_secs),
            id_assignment: self.id_assignment,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults, then the TOML file if present, then the environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub(crate) fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<toml::Table>(raw) else {
        tracing::warn!("ignoring unreadable phonebook config file");
        return;
    };

    if let Some(v) = file_cfg.get("base_url").and_then(|v| v.as_str()) {
        settings.base_url = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("notification_secs")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.notification_secs = v;
    }
    if let Some(v) = file_cfg
        .get("id_assignment")
        .and_then(|v| v.as_str())
        .and_then(parse_id_assignment)
    {
        settings.id_assignment = v;
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(|v| v.as_integer())
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_secs = Some(v);
    }
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PHONEBOOK_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = var("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = var("APP__NOTIFICATION_SECS").and_then(|v| v.parse().ok()) {
        settings.notification_secs = v;
    }

    if let Some(v) = var("APP__ID_ASSIGNMENT")
        .as_deref()
        .and_then(parse_id_assignment)
    {
        settings.id_assignment = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = Some(v);
    }
}

fn parse_id_assignment(raw: &str) -> Option<IdAssignment> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "server" => Some(IdAssignment::Server),
        "local" | "max_plus_one" => Some(IdAssignment::LocalMaxPlusOne),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
