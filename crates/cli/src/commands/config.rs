use std::env;
use std::fs;
use std::path::Path;

use fieldquote_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "quote.currency",
        &config.quote.currency,
        source("quote.currency", &["FIELDQUOTE_QUOTE_CURRENCY"]),
    ));
    lines.push(render_line(
        "quote.tax_rate_pct",
        &config.quote.tax_rate_pct.normalize().to_string(),
        source("quote.tax_rate_pct", &["FIELDQUOTE_QUOTE_TAX_RATE_PCT"]),
    ));
    lines.push(render_line(
        "quote.validity_days",
        &config.quote.validity_days.to_string(),
        source("quote.validity_days", &["FIELDQUOTE_QUOTE_VALIDITY_DAYS"]),
    ));

    lines.push(render_line(
        "company.name",
        &config.company.name,
        source("company.name", &["FIELDQUOTE_COMPANY_NAME"]),
    ));
    lines.push(render_line(
        "company.phone",
        config.company.phone.as_deref().unwrap_or("<unset>"),
        source("company.phone", &["FIELDQUOTE_COMPANY_PHONE"]),
    ));
    lines.push(render_line(
        "company.email",
        config.company.email.as_deref().unwrap_or("<unset>"),
        source("company.email", &["FIELDQUOTE_COMPANY_EMAIL"]),
    ));
    lines.push(render_line(
        "company.license_number",
        config.company.license_number.as_deref().unwrap_or("<unset>"),
        source("company.license_number", &["FIELDQUOTE_COMPANY_LICENSE_NUMBER"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["FIELDQUOTE_LOGGING_LEVEL", "FIELDQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["FIELDQUOTE_LOGGING_FORMAT", "FIELDQUOTE_LOG_FORMAT"]),
    ));

    lines.join("\n")
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
