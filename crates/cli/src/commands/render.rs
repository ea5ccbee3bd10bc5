use std::fs;
use std::path::Path;

use anyhow::Context;
use fieldquote_core::{build_document, ApplicationError};
use tracing::{info, warn};
use uuid::Uuid;

use super::price::evaluate;
use super::{load_quote, CommandResult};
use crate::render::{QuoteRenderer, TemplateKind};

/// Prints the rendered HTML, or writes it to `out` and prints a JSON outcome.
pub fn run(file: &Path, template: TemplateKind, out: Option<&Path>) -> CommandResult {
    let correlation_id = Uuid::new_v4().to_string();

    let result = render_quote(file, template, &correlation_id).and_then(|(quote_id, html)| {
        match out {
            Some(path) => {
                write_document(path, &html)
                    .map_err(|error| ApplicationError::Render(format!("{error:#}")))?;
                info!(
                    event_name = "quote.render.written",
                    correlation_id = %correlation_id,
                    quote_id = %quote_id,
                    path = %path.display(),
                    "quote document written"
                );
                Ok(CommandResult::success(
                    "render",
                    format!("wrote quote {quote_id} to {}", path.display()),
                ))
            }
            None => Ok(CommandResult { exit_code: 0, output: html }),
        }
    });

    result.unwrap_or_else(|error| {
        warn!(
            event_name = "quote.render.failed",
            correlation_id = %correlation_id,
            error_class = error.error_class(),
            "quote could not be rendered: {error}"
        );
        CommandResult::from_application_error("render", error, &correlation_id)
    })
}

fn render_quote(
    file: &Path,
    template: TemplateKind,
    correlation_id: &str,
) -> Result<(String, String), ApplicationError> {
    let (config, quote) = load_quote(file)?;
    let evaluation = evaluate(&quote, correlation_id)?;

    let document = build_document(&quote, &evaluation.pricing.totals, &config);
    let renderer =
        QuoteRenderer::embedded().map_err(|error| ApplicationError::Render(error.to_string()))?;
    let html = renderer
        .render(&document, template)
        .map_err(|error| ApplicationError::Render(error.to_string()))?;

    Ok((quote.id.0, html))
}

fn write_document(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory `{}`", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("failed to write `{}`", path.display()))
}
