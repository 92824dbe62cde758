pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use inmeet_core::config::{ConfigOverrides, InmeetConfig, LoadOptions, LogFormat};
use inmeet_core::domain::quotation::QuotationMode;
use tracing::{debug, Level};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "inmeet",
    about = "Kitchen renovation quotation CLI",
    long_about = "Price an extracted measurement workbook, preview the CRM quotation body, \
                  and submit it to a deal.",
    after_help = "Examples:\n  inmeet price --input keuken.json --mode dealer\n  \
                  inmeet preview --input keuken.json --mode consumer --deal-id 42\n  \
                  inmeet submit --input keuken.json --mode dealer --deal-id 42"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (defaults to inmeet.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override logging.format (compact|pretty|json)")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a workbook and print the totals, optionally with composed sections")]
    Price {
        #[arg(long, help = "Extracted workbook JSON")]
        input: PathBuf,
        #[arg(long, help = "Compose sections for this mode (consumer|dealer)")]
        mode: Option<QuotationMode>,
    },
    #[command(about = "Print the quotations.create body without sending it")]
    Preview {
        #[arg(long, help = "Extracted workbook JSON")]
        input: PathBuf,
        #[arg(long, help = "consumer|dealer")]
        mode: QuotationMode,
        #[arg(long, default_value = "", help = "Deal id to place in the body")]
        deal_id: String,
    },
    #[command(about = "Compose the quotation and create it on the given CRM deal")]
    Submit {
        #[arg(long, help = "Extracted workbook JSON")]
        input: PathBuf,
        #[arg(long, help = "consumer|dealer")]
        mode: QuotationMode,
        #[arg(long, help = "CRM deal id")]
        deal_id: String,
    },
    #[command(about = "List front models and the style/material selections that resolve to them")]
    Catalog,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Price { .. } => "price",
            Self::Preview { .. } => "preview",
            Self::Submit { .. } => "submit",
            Self::Catalog => "catalog",
            Self::Config => "config",
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let correlation_id = Uuid::new_v4().to_string();
    let command_name = cli.command.name();

    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides {
            log_level: cli.log_level.clone(),
            log_format: cli.log_format,
            ..ConfigOverrides::default()
        },
    };

    let result = match InmeetConfig::load(options) {
        Ok(config) => {
            if let Err(error) = init_logging(&config) {
                eprintln!("{error:#}");
            }
            debug!(
                event_name = "cli.command.started",
                correlation_id = %correlation_id,
                command = command_name,
                "running command"
            );
            dispatch(&cli, &config, &correlation_id)
        }
        Err(error) => commands::workbook::config_failure(command_name, &error, &correlation_id),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn dispatch(cli: &Cli, config: &InmeetConfig, correlation_id: &str) -> commands::CommandResult {
    match &cli.command {
        Command::Price { input, mode } => commands::price::run(input, *mode, correlation_id),
        Command::Preview { input, mode, deal_id } => {
            commands::preview::run(input, *mode, deal_id, correlation_id)
        }
        Command::Submit { input, mode, deal_id } => {
            commands::submit::run(config, input, *mode, deal_id, correlation_id)
        }
        Command::Catalog => commands::catalog::run(),
        Command::Config => commands::config::run(config, cli.config.as_deref()),
    }
}

/// Logs go to stderr so stdout stays a single JSON outcome.
fn init_logging(config: &InmeetConfig) -> anyhow::Result<()> {
    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
