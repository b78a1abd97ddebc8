use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::Contact;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub seed_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3001".into(),
            seed_path: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_overrides(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("APP__SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("seed_path") {
            settings.seed_path = Some(PathBuf::from(v));
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Persons(Vec<Contact>),
    Database { persons: Vec<Contact> },
}

/// Reads initial contacts from either a bare JSON array or a
/// `{"persons": [...]}` database file.
pub fn load_seed(path: &Path) -> anyhow::Result<Vec<Contact>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file '{}'", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("seed file '{}' is not a persons list", path.display()))?;
    Ok(match seed {
        SeedFile::Persons(persons) | SeedFile::Database { persons } => persons,
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
