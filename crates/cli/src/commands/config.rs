use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use kiosk_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

/// One reported setting: dotted key, rendered value and the environment
/// variables that can override it, in precedence order.
struct Setting {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Setting {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for setting in settings(&config) {
        let source = field_source(
            setting.key,
            setting.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(setting.key, &setting.value, source));
    }

    lines.join("\n")
}

fn settings(config: &AppConfig) -> Vec<Setting> {
    let server = &config.server;
    vec![
        Setting::new("database.url", &config.database.url, &["KIOSK_DATABASE_URL"]),
        Setting::new(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["KIOSK_DATABASE_MAX_CONNECTIONS"],
        ),
        Setting::new(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["KIOSK_DATABASE_TIMEOUT_SECS"],
        ),
        Setting::new(
            "oracle.provider",
            format!("{:?}", config.oracle.provider).to_lowercase(),
            &["KIOSK_ORACLE_PROVIDER"],
        ),
        Setting::new(
            "oracle.api_key",
            redact_secret(config.oracle.api_key.as_ref()),
            &["KIOSK_ORACLE_API_KEY"],
        ),
        Setting::new("oracle.base_url", &config.oracle.base_url, &["KIOSK_ORACLE_BASE_URL"]),
        Setting::new("oracle.model", &config.oracle.model, &["KIOSK_ORACLE_MODEL"]),
        Setting::new(
            "oracle.timeout_secs",
            config.oracle.timeout_secs.to_string(),
            &["KIOSK_ORACLE_TIMEOUT_SECS"],
        ),
        Setting::new("server.bind_address", &server.bind_address, &["KIOSK_SERVER_BIND_ADDRESS"]),
        Setting::new("server.port", server.port.to_string(), &["KIOSK_SERVER_PORT", "PORT"]),
        Setting::new(
            "server.graceful_shutdown_secs",
            server.graceful_shutdown_secs.to_string(),
            &["KIOSK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        Setting::new(
            "server.cors_origin",
            server.cors_origin.as_deref().unwrap_or("<unset>"),
            &["KIOSK_SERVER_CORS_ORIGIN"],
        ),
        Setting::new(
            "server.static_dir",
            server
                .static_dir
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
            &["KIOSK_SERVER_STATIC_DIR"],
        ),
        Setting::new(
            "recommendations.trending_limit",
            config.recommendations.trending_limit.to_string(),
            &["KIOSK_RECOMMENDATIONS_TRENDING_LIMIT"],
        ),
        Setting::new(
            "recommendations.ai_limit",
            config.recommendations.ai_limit.to_string(),
            &["KIOSK_RECOMMENDATIONS_AI_LIMIT"],
        ),
        Setting::new(
            "logging.level",
            &config.logging.level,
            &["KIOSK_LOGGING_LEVEL", "KIOSK_LOG_LEVEL"],
        ),
        Setting::new(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["KIOSK_LOGGING_FORMAT", "KIOSK_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["kiosk.toml", "config/kiosk.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret.map(|secret| secret.expose_secret().trim().len()) {
        None => "<unset>".to_string(),
        Some(0) => "<empty>".to_string(),
        Some(length) => format!("<redacted, {length} chars>"),
    }
}

#[cfg(test)]
mod tests {
    use kiosk_core::config::AppConfig;
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, field_source, redact_secret, settings};

    #[test]
    fn api_key_is_never_rendered() {
        let key = SecretString::from("AIza-super-secret".to_string());

        let rendered = redact_secret(Some(&key));

        assert_eq!(rendered, "<redacted, 17 chars>");
        assert_eq!(redact_secret(None), "<unset>");
    }

    #[test]
    fn settings_cover_every_section_without_leaking_the_key() {
        let mut config = AppConfig::default();
        config.oracle.api_key = Some(SecretString::from("AIza-super-secret".to_string()));

        let settings = settings(&config);

        for section in ["database.", "oracle.", "server.", "recommendations.", "logging."] {
            assert!(settings.iter().any(|setting| setting.key.starts_with(section)), "{section}");
        }
        assert!(settings.iter().all(|setting| !setting.value.contains("super-secret")));
    }

    #[test]
    fn file_source_requires_the_full_key_path() {
        let doc: Value = "[oracle]\nmodel = \"gemini-1.5-flash\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "oracle.model"));
        assert!(!contains_path(&doc, "oracle.api_key"));
        assert_eq!(
            field_source("oracle.model", &["KIOSK_TEST_UNSET_VARIABLE"], Some(&doc), None),
            "file (config file)"
        );
        assert_eq!(field_source("oracle.base_url", &[], Some(&doc), None), "default");
    }
}
