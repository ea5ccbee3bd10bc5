use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["fieldquote.toml", "config/fieldquote.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub quote: QuoteDefaults,
    pub company: CompanyConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteDefaults {
    /// ISO 4217 code. Amounts are assumed to have two minor digits.
    pub currency: String,
    pub tax_rate_pct: Decimal,
    pub validity_days: u32,
}

/// Letterhead printed on rendered quotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanyConfig {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license_number: Option<String>,
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
    pub currency: Option<String>,
    pub tax_rate_pct: Option<Decimal>,
    pub validity_days: Option<u32>,
    pub company_name: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quote: QuoteDefaults {
                currency: "USD".to_string(),
                tax_rate_pct: Decimal::ZERO,
                validity_days: 30,
            },
            company: CompanyConfig {
                name: "Fieldquote Pest Control".to_string(),
                phone: None,
                email: None,
                license_number: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(quote) = patch.quote {
            if let Some(currency) = quote.currency {
                self.quote.currency = currency;
            }
            if let Some(tax_rate_pct) = quote.tax_rate_pct {
                self.quote.tax_rate_pct = tax_rate_pct;
            }
            if let Some(validity_days) = quote.validity_days {
                self.quote.validity_days = validity_days;
            }
        }

        if let Some(company) = patch.company {
            if let Some(name) = company.name {
                self.company.name = name;
            }
            if let Some(phone) = company.phone {
                self.company.phone = Some(phone);
            }
            if let Some(email) = company.email {
                self.company.email = Some(email);
            }
            if let Some(license_number) = company.license_number {
                self.company.license_number = Some(license_number);
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
        if let Some(value) = read_env("FIELDQUOTE_QUOTE_CURRENCY") {
            self.quote.currency = value;
        }
        if let Some(value) = read_env("FIELDQUOTE_QUOTE_TAX_RATE_PCT") {
            self.quote.tax_rate_pct = parse_decimal("FIELDQUOTE_QUOTE_TAX_RATE_PCT", &value)?;
        }
        if let Some(value) = read_env("FIELDQUOTE_QUOTE_VALIDITY_DAYS") {
            self.quote.validity_days = parse_u32("FIELDQUOTE_QUOTE_VALIDITY_DAYS", &value)?;
        }

        if let Some(value) = read_env("FIELDQUOTE_COMPANY_NAME") {
            self.company.name = value;
        }
        if let Some(value) = read_env("FIELDQUOTE_COMPANY_PHONE") {
            self.company.phone = Some(value);
        }
        if let Some(value) = read_env("FIELDQUOTE_COMPANY_EMAIL") {
            self.company.email = Some(value);
        }
        if let Some(value) = read_env("FIELDQUOTE_COMPANY_LICENSE_NUMBER") {
            self.company.license_number = Some(value);
        }

        let log_level =
            read_env("FIELDQUOTE_LOGGING_LEVEL").or_else(|| read_env("FIELDQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("FIELDQUOTE_LOGGING_FORMAT").or_else(|| read_env("FIELDQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(currency) = overrides.currency {
            self.quote.currency = currency;
        }
        if let Some(tax_rate_pct) = overrides.tax_rate_pct {
            self.quote.tax_rate_pct = tax_rate_pct;
        }
        if let Some(validity_days) = overrides.validity_days {
            self.quote.validity_days = validity_days;
        }
        if let Some(company_name) = overrides.company_name {
            self.company.name = company_name;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_quote_defaults(&self.quote)?;
        validate_company(&self.company)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing config file, either the explicit path or a default
/// candidate relative to the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
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

fn validate_quote_defaults(quote: &QuoteDefaults) -> Result<(), ConfigError> {
    let currency = quote.currency.as_str();
    if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(ConfigError::Validation(format!(
            "quote.currency must be a three-letter uppercase ISO code (got `{currency}`)"
        )));
    }

    if quote.tax_rate_pct < Decimal::ZERO || quote.tax_rate_pct > Decimal::ONE_HUNDRED {
        return Err(ConfigError::Validation(
            "quote.tax_rate_pct must be in range 0..=100".to_string(),
        ));
    }

    if quote.validity_days == 0 || quote.validity_days > 365 {
        return Err(ConfigError::Validation(
            "quote.validity_days must be in range 1..=365".to_string(),
        ));
    }

    Ok(())
}

fn validate_company(company: &CompanyConfig) -> Result<(), ConfigError> {
    if company.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "company.name is required; it is printed on every quote".to_string(),
        ));
    }

    if let Some(email) = &company.email {
        if !email.contains('@') {
            return Err(ConfigError::Validation(format!(
                "company.email `{email}` is not an email address"
            )));
        }
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

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    quote: Option<QuotePatch>,
    company: Option<CompanyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct QuotePatch {
    currency: Option<String>,
    tax_rate_pct: Option<Decimal>,
    validity_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyPatch {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    license_number: Option<String>,
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
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_without_a_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.quote.currency == "USD", "default currency should be USD")?;
        ensure(config.quote.tax_rate_pct == Decimal::ZERO, "default tax should be zero")?;
        ensure(config.quote.validity_days == 30, "default validity should be 30 days")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_FIELDQUOTE_COMPANY", "Valley Pest Pros");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("fieldquote.toml");
            fs::write(
                &path,
                r#"
[company]
name = "${TEST_FIELDQUOTE_COMPANY}"
license_number = "PCO-11873"

[quote]
tax_rate_pct = 8.25
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.company.name == "Valley Pest Pros",
                "company name should be interpolated from environment",
            )?;
            ensure(
                config.company.license_number.as_deref() == Some("PCO-11873"),
                "license number should come from the file",
            )?;
            ensure(
                config.quote.tax_rate_pct == Decimal::new(825, 2),
                "tax rate should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_FIELDQUOTE_COMPANY"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("fieldquote.toml");
        fs::write(&path, "[company]\nname = \"${FIELDQUOTE_TEST_UNSET_VAR}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "FIELDQUOTE_TEST_UNSET_VAR"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_LOG_LEVEL", "warn");
        env::set_var("FIELDQUOTE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["FIELDQUOTE_LOG_LEVEL", "FIELDQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_QUOTE_TAX_RATE_PCT", "7.5");
        env::set_var("FIELDQUOTE_COMPANY_NAME", "Env Pest Co");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("fieldquote.toml");
            fs::write(
                &path,
                r#"
[quote]
currency = "CAD"
tax_rate_pct = 5
validity_days = 14

[company]
name = "File Pest Co"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    validity_days: Some(45),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.quote.currency == "CAD", "file currency should beat default")?;
            ensure(
                config.quote.tax_rate_pct == Decimal::new(75, 1),
                "env tax rate should win over file",
            )?;
            ensure(config.company.name == "Env Pest Co", "env company should win over file")?;
            ensure(config.quote.validity_days == 45, "override validity should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            Ok(())
        })();

        clear_vars(&["FIELDQUOTE_QUOTE_TAX_RATE_PCT", "FIELDQUOTE_COMPANY_NAME"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_QUOTE_CURRENCY", "usd");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("quote.currency")
            );
            ensure(has_message, "validation failure should mention quote.currency")
        })();

        clear_vars(&["FIELDQUOTE_QUOTE_CURRENCY"]);
        result
    }

    #[test]
    fn malformed_env_numbers_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FIELDQUOTE_QUOTE_VALIDITY_DAYS", "thirty");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid override".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "FIELDQUOTE_QUOTE_VALIDITY_DAYS"),
                "error should name the env key",
            ),
        };

        clear_vars(&["FIELDQUOTE_QUOTE_VALIDITY_DAYS"]);
        result
    }

    #[test]
    fn out_of_range_overrides_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                tax_rate_pct: Some(Decimal::from(101)),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected tax validation failure".to_string()),
            Err(error) => error,
        };

        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("quote.tax_rate_pct")),
            "validation failure should mention quote.tax_rate_pct",
        )
    }

    #[test]
    fn require_file_reports_missing_path() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let error = match AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing file error".to_string()),
            Err(error) => error,
        };

        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref path) if path == &missing),
            "missing file error should carry the requested path",
        )
    }
}
