use std::env;
use std::fs;
use std::path::Path;

use inmeet_core::config::{resolve_config_path, InmeetConfig};
use secrecy::ExposeSecret;
use serde::Serialize;
use toml::Value;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct EffectiveField {
    key: &'static str,
    value: String,
    source: String,
}

/// Prints the effective configuration with the source of every field.
/// Secrets are never echoed.
pub fn run(config: &InmeetConfig, explicit_path: Option<&Path>) -> CommandResult {
    let config_file_path = resolve_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let crm = &config.crm;
    let fields = vec![
        EffectiveField {
            key: "crm.api_base",
            value: crm.api_base.clone(),
            source: source("crm.api_base", &["INMEET_CRM_API_BASE"]),
        },
        EffectiveField {
            key: "crm.token_url",
            value: crm.token_url.clone(),
            source: source("crm.token_url", &["INMEET_CRM_TOKEN_URL"]),
        },
        EffectiveField {
            key: "crm.client_id",
            value: crm.client_id.clone().unwrap_or_else(|| "<unset>".to_string()),
            source: source("crm.client_id", &["INMEET_CRM_CLIENT_ID"]),
        },
        EffectiveField {
            key: "crm.client_secret",
            value: redact(crm.client_secret.as_ref().map(|secret| secret.expose_secret())),
            source: source("crm.client_secret", &["INMEET_CRM_CLIENT_SECRET"]),
        },
        EffectiveField {
            key: "crm.refresh_token",
            value: redact(crm.refresh_token.as_ref().map(|secret| secret.expose_secret())),
            source: source("crm.refresh_token", &["INMEET_CRM_REFRESH_TOKEN"]),
        },
        EffectiveField {
            key: "crm.token_file",
            value: crm.token_file.display().to_string(),
            source: source("crm.token_file", &["INMEET_CRM_TOKEN_FILE"]),
        },
        EffectiveField {
            key: "crm.timeout_secs",
            value: crm.timeout_secs.to_string(),
            source: source("crm.timeout_secs", &["INMEET_CRM_TIMEOUT_SECS"]),
        },
        EffectiveField {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["INMEET_LOGGING_LEVEL", "INMEET_LOG_LEVEL"]),
        },
        EffectiveField {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            source: source("logging.format", &["INMEET_LOGGING_FORMAT", "INMEET_LOG_FORMAT"]),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.iter().map(render_line));

    CommandResult::success_with_data("config", lines.join("\n"), Some(fields))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(field: &EffectiveField) -> String {
    format!("- {} = {} (source: {})", field.key, field.value, field.source)
}

fn redact(secret: Option<&str>) -> String {
    match secret.map(str::trim) {
        None => "<unset>".to_string(),
        Some("") => "<empty>".to_string(),
        Some(_) => "<redacted>".to_string(),
    }
}
