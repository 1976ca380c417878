pub mod completions;
pub mod dashboard;
pub mod init;
pub mod report;
pub mod status;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::catalog::CatalogClient;
use crate::controller::DashboardController;
use crate::error::Result;
use crate::settings::Settings;

/// Build the runtime the catalog fetch runs on.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Load the catalog into a fresh controller, blocking until both requests finish.
pub(crate) fn load_controller(settings: &Settings) -> Result<DashboardController> {
    let client = CatalogClient::from_settings(settings)?;
    let mut controller = DashboardController::new();
    runtime()?.block_on(controller.load_catalog(&client))?;
    Ok(controller)
}

#[derive(Parser)]
#[command(
    name = "shelf",
    version,
    about = "Browse a remote product catalog as pie and column charts."
)]
pub struct Cli {
    /// Catalog API base URL for this run (default: value in settings.json)
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard (the default).
    Dashboard,
    /// List catalog categories with their product counts.
    Categories,
    /// Product count per category (the default pie chart).
    Summary {
        /// Also list each category's products and prices
        #[arg(long)]
        drilldown: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Product prices for one category (the column chart report).
    Report {
        /// Category name, matched case-insensitively
        #[arg(long)]
        category: String,
        /// Restrict to this exact product title (repeatable)
        #[arg(long = "product")]
        products: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show settings and where they are stored.
    Status,
    /// Write settings.json (uses --api-url if given).
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions.
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// The dashboard owns the terminal and logs to a file instead.
    pub fn logs_to_stderr(&self) -> bool {
        !matches!(self, Commands::Dashboard)
    }
}

#[derive(Args, Clone, Debug)]
pub struct OutputArgs {
    /// Output format: a text table, or Highcharts options JSON
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_args_parse() {
        let cli = Cli::parse_from([
            "shelf",
            "report",
            "--category",
            "smartphones",
            "--product",
            "iPhone 9",
            "--product",
            "Galaxy",
            "--format",
            "json",
        ]);
        let Some(Commands::Report {
            category,
            products,
            output,
        }) = cli.command
        else {
            panic!("expected report command");
        };
        assert_eq!(category, "smartphones");
        assert_eq!(products, vec!["iPhone 9", "Galaxy"]);
        assert_eq!(output.format, OutputFormat::Json);
        assert!(output.output.is_none());
    }

    #[test]
    fn test_global_api_url_after_subcommand() {
        let cli = Cli::parse_from(["shelf", "summary", "--api-url", "http://localhost:3000"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000"));
        assert!(matches!(cli.command, Some(Commands::Summary { .. })));
    }

    #[test]
    fn test_only_one_shot_commands_log_to_stderr() {
        assert!(!Commands::Dashboard.logs_to_stderr());
        assert!(Commands::Status.logs_to_stderr());
        let cli = Cli::parse_from(["shelf", "categories"]);
        assert!(cli.command.is_some_and(|c| c.logs_to_stderr()));
    }

    #[test]
    fn test_no_subcommand_means_dashboard() {
        let cli = Cli::parse_from(["shelf"]);
        assert!(cli.command.is_none());
    }
}
