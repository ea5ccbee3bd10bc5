pub mod commands;
pub mod logging;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fieldquote_core::config::{AppConfig, LoadOptions};

use crate::render::TemplateKind;

#[derive(Debug, Parser)]
#[command(
    name = "fieldquote",
    about = "Fieldquote quote pricing CLI",
    long_about = "Price and render pest-control service quotes, browse the service catalog, and inspect configuration.",
    after_help = "Examples:\n  fieldquote price quotes/whitfield.toml\n  fieldquote render quotes/whitfield.toml --out whitfield.html\n  fieldquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate a quote file and print its totals")]
    Price {
        #[arg(help = "Quote request file (.toml or .json)")]
        file: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Render a quote file as a printable HTML document")]
    Render {
        #[arg(help = "Quote request file (.toml or .json)")]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = TemplateKind::Detailed)]
        template: TemplateKind,
        #[arg(long, help = "Write the document to this path instead of stdout")]
        out: Option<PathBuf>,
    },
    #[command(about = "List the standard service catalog")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, catalog, pricing, and document templates")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    if let Err(error) = logging::init_logging(&logging_config) {
        eprintln!("logging disabled: {error:#}");
    }

    let result = match cli.command {
        Command::Price { file, json } => commands::price::run(&file, json),
        Command::Render { file, template, out } => {
            commands::render::run(&file, template, out.as_deref())
        }
        Command::Catalog { json } => {
            commands::CommandResult { exit_code: 0, output: commands::catalog::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
