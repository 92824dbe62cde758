use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct InmeetConfig {
    pub crm: CrmConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CrmConfig {
    pub api_base: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    /// First-run fallback when no token file exists yet.
    pub refresh_token: Option<SecretString>,
    pub token_file: PathBuf,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub crm_api_base: Option<String>,
    pub crm_token_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_API_BASE: &str = "https://api.focus.teamleader.eu";
pub const DEFAULT_TOKEN_URL: &str = "https://focus.teamleader.eu/oauth2/access_token";

impl Default for InmeetConfig {
    fn default() -> Self {
        Self {
            crm: CrmConfig {
                api_base: DEFAULT_API_BASE.to_string(),
                token_url: DEFAULT_TOKEN_URL.to_string(),
                client_id: None,
                client_secret: None,
                refresh_token: None,
                token_file: PathBuf::from("refresh_token.txt"),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl InmeetConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("inmeet.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(crm) = patch.crm {
            if let Some(api_base) = crm.api_base {
                self.crm.api_base = api_base;
            }
            if let Some(token_url) = crm.token_url {
                self.crm.token_url = token_url;
            }
            if let Some(client_id) = crm.client_id {
                self.crm.client_id = Some(client_id);
            }
            if let Some(client_secret) = crm.client_secret {
                self.crm.client_secret = Some(secret_value(client_secret));
            }
            if let Some(refresh_token) = crm.refresh_token {
                self.crm.refresh_token = Some(secret_value(refresh_token));
            }
            if let Some(token_file) = crm.token_file {
                self.crm.token_file = token_file;
            }
            if let Some(timeout_secs) = crm.timeout_secs {
                self.crm.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("INMEET_CRM_API_BASE") {
            self.crm.api_base = value;
        }
        if let Some(value) = read_env("INMEET_CRM_TOKEN_URL") {
            self.crm.token_url = value;
        }
        if let Some(value) = read_env("INMEET_CRM_CLIENT_ID") {
            self.crm.client_id = Some(value);
        }
        if let Some(value) = read_env("INMEET_CRM_CLIENT_SECRET") {
            self.crm.client_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("INMEET_CRM_REFRESH_TOKEN") {
            self.crm.refresh_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("INMEET_CRM_TOKEN_FILE") {
            self.crm.token_file = PathBuf::from(value);
        }
        if let Some(value) = read_env("INMEET_CRM_TIMEOUT_SECS") {
            self.crm.timeout_secs = parse_u64("INMEET_CRM_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("INMEET_LOGGING_LEVEL").or_else(|| read_env("INMEET_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("INMEET_LOGGING_FORMAT").or_else(|| read_env("INMEET_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(api_base) = overrides.crm_api_base {
            self.crm.api_base = api_base;
        }
        if let Some(token_file) = overrides.crm_token_file {
            self.crm.token_file = token_file;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_crm(&self.crm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

impl CrmConfig {
    /// Credentials are only needed to submit, so pricing and previews run
    /// without them. Call this before talking to the CRM.
    pub fn require_credentials(&self) -> Result<(String, SecretString), ConfigError> {
        let client_id = self
            .client_id
            .as_ref()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(
                    "crm.client_id is required to submit (set INMEET_CRM_CLIENT_ID)".to_string(),
                )
            })?;

        let client_secret = self
            .client_secret
            .as_ref()
            .filter(|value| !value.expose_secret().trim().is_empty())
            .cloned()
            .ok_or_else(|| {
                ConfigError::Validation(
                    "crm.client_secret is required to submit (set INMEET_CRM_CLIENT_SECRET)"
                        .to_string(),
                )
            })?;

        Ok((client_id, client_secret))
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("inmeet.toml"), PathBuf::from("config/inmeet.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_crm(crm: &CrmConfig) -> Result<(), ConfigError> {
    for (key, url) in [("crm.api_base", &crm.api_base), ("crm.token_url", &crm.token_url)] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if crm.timeout_secs == 0 || crm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "crm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if crm.token_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("crm.token_file must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    crm: Option<CrmPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CrmPatch {
    api_base: Option<String>,
    token_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    refresh_token: Option<String>,
    token_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{ConfigError, ConfigOverrides, InmeetConfig, LoadOptions};

    /// Runs `check` with `vars` set, holding the process-wide env lock.
    fn with_vars<T>(
        vars: &[(&str, &str)],
        check: impl FnOnce() -> Result<T, String>,
    ) -> Result<T, String> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        let _guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .map_err(|_| "env lock is poisoned".to_string())?;

        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = check();
        for (key, _) in vars {
            env::remove_var(key);
        }
        result
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<PathBuf, String> {
        let path = dir.path().join("inmeet.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    fn load_from(path: &Path) -> Result<InmeetConfig, ConfigError> {
        InmeetConfig::load(LoadOptions {
            config_path: Some(path.to_path_buf()),
            ..LoadOptions::default()
        })
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_point_at_teamleader_and_need_no_credentials() -> Result<(), String> {
        with_vars(&[], || {
            let config = InmeetConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.crm.api_base == "https://api.focus.teamleader.eu",
                "default api base should be teamleader focus",
            )?;
            ensure(
                config.crm.token_file == PathBuf::from("refresh_token.txt"),
                "token file should default to refresh_token.txt",
            )?;
            ensure(config.crm.timeout_secs == 30, "default timeout should be 30 seconds")?;
            ensure(
                matches!(
                    config.crm.require_credentials(),
                    Err(ConfigError::Validation(ref message)) if message.contains("client_id")
                ),
                "submitting without a client id should name the missing field",
            )
        })
    }

    #[test]
    fn crm_secret_is_interpolated_from_the_environment() -> Result<(), String> {
        with_vars(&[("TEST_INMEET_CLIENT_SECRET", "secret-from-env")], || {
            let dir = TempDir::new().map_err(|err| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[crm]
client_id = "client-from-file"
client_secret = "${TEST_INMEET_CLIENT_SECRET}"
token_file = "state/refresh_token.txt"
"#,
            )?;
            let config = load_from(&path).map_err(|err| format!("config load failed: {err}"))?;

            let (client_id, client_secret) =
                config.crm.require_credentials().map_err(|err| err.to_string())?;
            ensure(client_id == "client-from-file", "client id should come from the file")?;
            ensure(
                client_secret.expose_secret() == "secret-from-env",
                "client secret should be interpolated from the environment",
            )?;
            ensure(
                config.crm.token_file == PathBuf::from("state/refresh_token.txt"),
                "token file should come from the file",
            )
        })
    }

    #[test]
    fn crm_fields_follow_file_env_override_precedence() -> Result<(), String> {
        let vars = [
            ("INMEET_CRM_API_BASE", "https://env.example.test"),
            ("INMEET_CRM_TIMEOUT_SECS", "45"),
        ];
        with_vars(&vars, || {
            let dir = TempDir::new().map_err(|err| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[crm]
api_base = "https://file.example.test"
token_url = "https://file.example.test/oauth2/access_token"
timeout_secs = 10
"#,
            )?;
            let config = InmeetConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    crm_token_file: Some(PathBuf::from("/var/lib/inmeet/token")),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.crm.api_base == "https://env.example.test", "env should beat the file")?;
            ensure(
                config.crm.token_url == "https://file.example.test/oauth2/access_token",
                "file token url should win over defaults",
            )?;
            ensure(config.crm.timeout_secs == 45, "env timeout should win over the file")?;
            ensure(
                config.crm.token_file == PathBuf::from("/var/lib/inmeet/token"),
                "programmatic token file should win",
            )
        })
    }

    #[test]
    fn crm_urls_and_timeout_are_validated() -> Result<(), String> {
        with_vars(&[("INMEET_CRM_API_BASE", "api.focus.teamleader.eu")], || {
            let result = InmeetConfig::load(LoadOptions::default());
            ensure(
                matches!(result, Err(ConfigError::Validation(ref message))
                    if message.contains("crm.api_base")),
                "a scheme-less api base should be rejected by name",
            )
        })?;

        with_vars(&[("INMEET_CRM_TIMEOUT_SECS", "0")], || {
            let result = InmeetConfig::load(LoadOptions::default());
            ensure(
                matches!(result, Err(ConfigError::Validation(ref message))
                    if message.contains("timeout_secs")),
                "a zero timeout should be rejected",
            )
        })?;

        with_vars(&[("INMEET_CRM_TIMEOUT_SECS", "soon")], || {
            let result = InmeetConfig::load(LoadOptions::default());
            ensure(
                matches!(result, Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "INMEET_CRM_TIMEOUT_SECS"),
                "a non-numeric timeout should name the variable",
            )
        })
    }

    #[test]
    fn crm_secrets_are_not_leaked_by_debug() -> Result<(), String> {
        let vars = [
            ("INMEET_CRM_CLIENT_SECRET", "client-secret-value"),
            ("INMEET_CRM_REFRESH_TOKEN", "refresh-token-value"),
        ];
        with_vars(&vars, || {
            let config = InmeetConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("client-secret-value"), "debug leaks the client secret")?;
            ensure(!debug.contains("refresh-token-value"), "debug leaks the refresh token")
        })
    }
}
