//! Dialcast CLI: drive the campaign workflow against a running API.
//!
//! Set DIALCAST_API_URL (default http://localhost:3000) and, after `login`,
//! DIALCAST_TOKEN.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialcast_cli::{init_tracing, ApiClient};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dialcast", about = "Dialcast robocall campaign CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(long, env = "DIALCAST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Exchange credentials for an access token
    Login {
        username: String,
        #[arg(long, env = "DIALCAST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Save the SIP provider used for calls
    Provider {
        /// Gateway host or IP
        gateway: String,
        username: String,
        #[arg(long, env = "DIALCAST_SIP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Upload the MP3 announcement
    Audio {
        /// Display name
        #[arg(long)]
        name: String,
        file: PathBuf,
    },
    /// Upload a CSV subscriber list with a phone_number column
    Subscribers {
        file: PathBuf,
        /// Replace the current list instead of appending
        #[arg(long)]
        clear: bool,
    },
    /// Dial every subscriber and play the announcement
    Call,
    /// Print the address used as the SIP contact host
    LocalIp,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let client = || ApiClient::from_env().context("Failed to create API client");

    match cli.command {
        Commands::LocalIp => {
            println!("{}", dialcast_sip::detect_local_ip());
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let user = client()?.register(&username, &email, &password).await?;
            print_json(&user)?;
        }
        Commands::Login { username, password } => {
            let login = client()?.login(&username, &password).await?;
            print_json(&login)?;
            eprintln!("export DIALCAST_TOKEN={}", login.access_token);
        }
        Commands::Provider {
            gateway,
            username,
            password,
        } => {
            let response = client()?.save_provider(&gateway, &username, &password).await?;
            print_json(&response)?;
        }
        Commands::Audio { name, file } => {
            let response = client()?.save_audio_file(&name, &file).await?;
            print_json(&response)?;
        }
        Commands::Subscribers { file, clear } => {
            let response = client()?.save_subscriber_list(&file, clear).await?;
            print_json(&response)?;
        }
        Commands::Call => {
            let response = client()?.make_calls().await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
