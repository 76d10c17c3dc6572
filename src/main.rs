//! adminctl - admin API companion for end-to-end test setup

use clap::Parser;

mod admin;
mod auth;
mod cli;
mod client;
mod config;
mod error;
mod output;
mod session;

use cli::{Cli, Commands, GlobalOptions, SessionCommands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Token => cli::api::token(&opts).await,
        Commands::Login => cli::api::login(&opts).await,
        Commands::Search {
            endpoint,
            field,
            value,
        } => cli::api::search(&opts, &endpoint, &field, &value).await,
        Commands::Request { method, url, data } => {
            cli::api::request(&opts, method, &url, data).await
        }
        Commands::Update { endpoint, id, data } => {
            cli::api::update(&opts, &endpoint, &id, data).await
        }
        Commands::Delete { endpoint, name } => cli::api::delete(&opts, &endpoint, &name).await,
        Commands::ClearCache { method, url } => cli::api::clear_cache(&opts, method, &url).await,
        Commands::Session(cmd) => match cmd {
            SessionCommands::Status => cli::session::status(&opts),
            SessionCommands::Clear => cli::session::clear(&opts),
            SessionCommands::Path => cli::session::path(&opts),
        },
        Commands::Version => {
            println!("adminctl version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
