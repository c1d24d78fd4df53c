use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "langstore")]
#[command(about = "Look up, store and render localized strings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        global = true,
        env = "LANGSTORE_PATH",
        default_value = ".langstore/strings.json",
        help = "Strings file (.json, .yml or .yaml)"
    )]
    store: PathBuf,

    #[arg(long, global = true, help = "Enable verbose debug output")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print the string stored under a key")]
    Get {
        key: String,

        #[arg(long, help = "Store and print this text if the key has no value")]
        default: Option<String>,
    },

    #[command(about = "Insert or update a string")]
    Set { key: String, value: String },

    #[command(about = "List every stored string")]
    List {
        #[arg(long, help = "Print the strings as a JSON object")]
        json: bool,

        #[arg(long, help = "Show the placeholders each string expects")]
        placeholders: bool,
    },

    #[command(about = "Render a string with {name} placeholders replaced")]
    Assign {
        key: String,

        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = cli::parse_var, help = "Placeholder value, may be repeated")]
        vars: Vec<(String, String)>,

        #[arg(long, help = "Store and render this text if the key has no value")]
        default: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    cli::logging::configure_tracing(cli.verbose);

    let config = cli::Config {
        verbose: cli.verbose,
        store_path: cli.store,
    };

    let found = match cli.command {
        Commands::Get { key, default } => cli::get(key, default, &config).await?,
        Commands::Set { key, value } => {
            cli::set(key, value, &config).await?;
            true
        }
        Commands::List { json, placeholders } => {
            cli::list(json, placeholders, &config).await?;
            true
        }
        Commands::Assign { key, vars, default } => {
            cli::assign(key, vars, default, &config).await?
        }
    };

    Ok(exit_code(found))
}

/// Exit status 1 tells scripts the key had no value
fn exit_code(found: bool) -> ExitCode {
    if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
