//! Command-line entry point for the duty board.
//!
//! # Responsibility
//! - Load configuration, start logging and open the shared database.
//! - Execute one GraphQL document and print the JSON response.
//! - Close the shared database before the process exits.
//! - `schema` prints SDL without touching configuration or storage.

use clap::{Parser, Subcommand};
use dutyboard_api::{schema_sdl, DutyApi, Request, Variables};
use dutyboard_core::{
    core_version, init_logging, init_shared_db, shutdown_shared_db, AppConfig, SqliteDutyGateway,
};
use log::{error, info};
use serde_json::Value;
use std::io::Read;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "dutyboard", version, about = "Duty board GraphQL runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a GraphQL document (`-` reads it from stdin).
    Exec {
        query: String,
        /// Variables as a JSON object.
        #[arg(long, default_value = "{}")]
        variables: String,
    },
    /// Print the GraphQL schema in SDL form.
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (query, variables) = match cli.command {
        Command::Schema => {
            println!("{}", schema_sdl());
            return ExitCode::SUCCESS;
        }
        Command::Exec { query, variables } => (query, variables),
    };

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("dutyboard: {err}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("dutyboard: {err}");
        return ExitCode::from(2);
    }
    info!(
        "event=cli_start module=cli status=ok version={} mode={:?}",
        core_version(),
        config.mode
    );

    let db = match init_shared_db(&config.db_location) {
        Ok(db) => db,
        Err(err) => {
            error!("event=cli_start module=cli status=error error={err}");
            eprintln!("dutyboard: {err}");
            return ExitCode::FAILURE;
        }
    };
    let api = DutyApi::from_gateway(SqliteDutyGateway::new(db), config.mode);

    let code = run_exec(&api, query, &variables).await;

    if let Err(err) = shutdown_shared_db() {
        error!("event=db_shutdown module=cli status=error error={err}");
    }
    code
}

async fn run_exec(api: &DutyApi, query: String, variables: &str) -> ExitCode {
    let query = if query == "-" {
        let mut buffer = String::new();
        if let Err(err) = std::io::stdin().read_to_string(&mut buffer) {
            eprintln!("dutyboard: failed to read query from stdin: {err}");
            return ExitCode::from(2);
        }
        buffer
    } else {
        query
    };

    let variables = match serde_json::from_str::<Value>(variables) {
        Ok(value @ Value::Object(_)) => Variables::from_json(value),
        Ok(_) => {
            eprintln!("dutyboard: --variables must be a JSON object");
            return ExitCode::from(2);
        }
        Err(err) => {
            eprintln!("dutyboard: invalid --variables JSON: {err}");
            return ExitCode::from(2);
        }
    };

    let response = api
        .execute(Request::new(query).variables(variables))
        .await;
    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("dutyboard: {err}");
            return ExitCode::FAILURE;
        }
    }

    if response.get("errors").is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
