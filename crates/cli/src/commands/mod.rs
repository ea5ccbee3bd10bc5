pub mod catalog;
pub mod config;
pub mod doctor;
pub mod price;
pub mod render;

use std::path::Path;

use fieldquote_core::config::{AppConfig, LoadOptions};
use fieldquote_core::{ApplicationError, Catalog, Quote, QuoteRequest};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;
pub const EXIT_RENDER: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            hint: None,
            correlation_id: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
            correlation_id: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure payload carrying the user-safe hint and correlation id of the
    /// mapped interface error next to the detailed message.
    pub fn from_application_error(
        command: &str,
        error: ApplicationError,
        correlation_id: &str,
    ) -> Self {
        let exit_code = exit_code_for(&error);
        let error_class = error.error_class().to_string();
        let message = error.to_string();
        let interface = error.into_interface(correlation_id);

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class),
            message,
            hint: Some(interface.user_message().to_string()),
            correlation_id: Some(interface.correlation_id().to_string()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

pub fn exit_code_for(error: &ApplicationError) -> u8 {
    match error {
        ApplicationError::Configuration(_) => EXIT_CONFIG,
        ApplicationError::Domain(_) | ApplicationError::Input(_) => EXIT_INPUT,
        ApplicationError::Render(_) => EXIT_RENDER,
    }
}

/// Effective config plus the quote described by `file`, priced against the
/// standard catalog.
pub(crate) fn load_quote(file: &Path) -> Result<(AppConfig, Quote), ApplicationError> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;

    let request =
        QuoteRequest::load(file).map_err(|error| ApplicationError::Input(error.to_string()))?;
    let quote = request
        .into_quote(&Catalog::pest_control_defaults(), &config.quote)
        .map_err(|error| ApplicationError::Input(error.to_string()))?;

    Ok((config, quote))
}

pub(crate) fn serialize_pretty<T: Serialize>(command: &str, payload: &T) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"{command}\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use fieldquote_core::{ApplicationError, DomainError, LineItemId};
    use serde_json::Value;

    use super::{exit_code_for, CommandResult};

    #[test]
    fn application_errors_map_to_distinct_exit_codes() {
        assert_eq!(exit_code_for(&ApplicationError::Configuration("bad".into())), 2);
        assert_eq!(exit_code_for(&ApplicationError::Input("bad".into())), 3);
        assert_eq!(
            exit_code_for(&ApplicationError::Domain(DomainError::UnknownLineItem(LineItemId(
                "x".into()
            )))),
            3
        );
        assert_eq!(exit_code_for(&ApplicationError::Render("bad".into())), 4);
    }

    #[test]
    fn failure_payload_carries_hint_and_correlation_id() {
        let result = CommandResult::from_application_error(
            "price",
            ApplicationError::Input("line-1 has zero quantity".into()),
            "req-7",
        );
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 3);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "input_validation");
        assert_eq!(payload["correlation_id"], "req-7");
        assert!(payload["message"].as_str().unwrap_or_default().contains("zero quantity"));
        assert!(payload["hint"].as_str().is_some());
    }

    #[test]
    fn success_payload_omits_optional_fields() {
        let result = CommandResult::success("render", "wrote quote.html");
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(payload["status"], "ok");
        assert!(payload.get("hint").is_none());
        assert!(payload["error_class"].is_null());
    }
}
