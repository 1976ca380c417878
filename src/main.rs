mod catalog;
mod charts;
mod cli;
mod controller;
mod error;
mod fmt;
mod logging;
mod models;
mod settings;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let settings = settings::load_settings().with_api_url(cli.api_url);

    let command = cli.command.unwrap_or(Commands::Dashboard);

    if command.logs_to_stderr() {
        logging::init_stderr();
    }

    let result = match command {
        Commands::Dashboard => cli::dashboard::run(&settings),
        Commands::Categories => cli::report::categories(&settings),
        Commands::Summary { drilldown, output } => cli::report::summary(&settings, drilldown, output),
        Commands::Report {
            category,
            products,
            output,
        } => cli::report::report(&settings, &category, products, output),
        Commands::Status => cli::status::run(&settings),
        Commands::Init { force } => cli::init::run(&settings, force),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
