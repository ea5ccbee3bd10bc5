use thiserror::Error;

use crate::domain::quote::{LineItemId, QuoteStatus};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quote transition from {from:?} to {to:?}")]
    InvalidQuoteTransition { from: QuoteStatus, to: QuoteStatus },
    #[error("quote in status {status:?} cannot be edited")]
    QuoteLocked { status: QuoteStatus },
    #[error("unknown line item `{0}`")]
    UnknownLineItem(LineItemId),
    #[error("line item `{0}` already exists")]
    DuplicateLineItem(LineItemId),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid quote input: {0}")]
    Input(String),
    #[error("document rendering failed: {0}")]
    Render(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unprocessable quote: {message}")]
    Unprocessable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The quote could not be processed. Check inputs and try again."
            }
            Self::Unprocessable { .. } => {
                "The quote has invalid line items, discount, or tax rate. Fix them and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unprocessable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unprocessable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }

    /// Stable, machine-readable class for command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain",
            Self::Input(_) => "input_validation",
            Self::Render(_) => "render",
            Self::Configuration(_) => "config_validation",
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest {
                    message: error.to_string(),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Input(message) => {
                Self::Unprocessable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Render(message) | ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::quote::{LineItemId, QuoteStatus};
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::UnknownLineItem(LineItemId(
            "line-9".to_owned(),
        )))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ref message,
            } if correlation_id == "req-1" && message.contains("line-9")
        ));
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = ApplicationError::from(DomainError::QuoteLocked {
            status: QuoteStatus::Accepted,
        })
        .into_interface("req-2");

        assert_eq!(
            interface.user_message(),
            "The quote could not be processed. Check inputs and try again."
        );
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn every_domain_error_names_its_cause() {
        let messages: Vec<String> = [
            DomainError::InvalidQuoteTransition {
                from: QuoteStatus::Draft,
                to: QuoteStatus::Accepted,
            },
            DomainError::QuoteLocked { status: QuoteStatus::Sent },
            DomainError::UnknownLineItem(LineItemId("line-3".to_owned())),
            DomainError::DuplicateLineItem(LineItemId("line-4".to_owned())),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            messages,
            vec![
                "invalid quote transition from Draft to Accepted",
                "quote in status Sent cannot be edited",
                "unknown line item `line-3`",
                "line item `line-4` already exists",
            ]
        );
    }

    #[test]
    fn input_error_maps_to_unprocessable() {
        let error = ApplicationError::Input("ZERO_QUANTITY".to_owned());
        assert_eq!(error.error_class(), "input_validation");

        let interface = error.into_interface("req-3");
        assert!(matches!(interface, InterfaceError::Unprocessable { .. }));
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let error = ApplicationError::Configuration("bad currency".to_owned());
        assert_eq!(error.error_class(), "config_validation");

        let interface = error.into_interface("req-4");
        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
