//! HTML quote documents rendered from [`QuoteDocument`] with embedded tera
//! templates. Conversion to PDF is left to the browser's print dialog.

use std::collections::HashMap;

use clap::ValueEnum;
use fieldquote_core::document::QuoteDocument;
use tera::{Context, Tera};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TemplateKind {
    /// Letterhead, customer block, every line, and the annual summary.
    Detailed,
    /// Single table suitable for email bodies.
    Compact,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Detailed, TemplateKind::Compact];

    pub fn template_name(self) -> &'static str {
        match self {
            TemplateKind::Detailed => "quotes/detailed.html",
            TemplateKind::Compact => "quotes/compact.html",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
}

pub struct QuoteRenderer {
    tera: Tera,
}

impl QuoteRenderer {
    pub fn embedded() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);

        tera.add_raw_template(
            TemplateKind::Detailed.template_name(),
            include_str!("../../../templates/quotes/detailed.html.tera"),
        )
        .map_err(|error| RenderError::Template(format!("{error:?}")))?;
        tera.add_raw_template(
            TemplateKind::Compact.template_name(),
            include_str!("../../../templates/quotes/compact.html.tera"),
        )
        .map_err(|error| RenderError::Template(format!("{error:?}")))?;

        Ok(Self { tera })
    }

    pub fn render(
        &self,
        document: &QuoteDocument,
        kind: TemplateKind,
    ) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("quote", document);
        self.tera
            .render(kind.template_name(), &context)
            .map_err(|error| RenderError::Template(format!("{error:?}")))
    }
}

/// Register custom tera filters used by quote templates.
///
/// - `currency`: prefixes a preformatted amount with the currency symbol, e.g.
///   `quote.totals.grand_total | currency(code=quote.currency)`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("currency", tera_currency_filter);
}

fn tera_currency_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("currency filter expects a formatted amount string"))?;
    let code = args.get("code").and_then(tera::Value::as_str).unwrap_or("USD");

    Ok(tera::Value::String(format_currency(amount, code)))
}

/// `"-7.50"` + `USD` becomes `-$7.50`; codes without a known symbol are
/// suffixed instead (`7.50 MXN`).
pub fn format_currency(amount: &str, code: &str) -> String {
    let (sign, digits) = match amount.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", amount),
    };

    match currency_symbol(code) {
        Some(symbol) => format!("{sign}{symbol}{digits}"),
        None => format!("{sign}{digits} {code}"),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" | "CAD" | "AUD" | "NZD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}
