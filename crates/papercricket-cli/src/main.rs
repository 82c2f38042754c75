//! Terminal client for Paper Cricket.
//!
//! Set up an account and a match, then play it:
//!   papercricket register alice hunter2
//!   papercricket login alice hunter2          # prints an access token
//!   export PAPERCRICKET_TOKEN=...
//!   papercricket create --overs 2 --wickets 1
//!   papercricket play K3J9QZ --username alice
//!
//! While playing, type a letter A-G to bat or bowl. `log` prints the
//! ball-by-ball record, `overs` the over grouping, `ok` dismisses a server
//! error and `quit` leaves.

mod play;
mod render;

use clap::{Parser, Subcommand};
use papercricket_client::{ApiClient, ClientConfig, Credential};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "papercricket", about = "Play Paper Cricket from the terminal")]
struct Cli {
    /// TOML config file.
    #[arg(long, env = "PAPERCRICKET_CONFIG")]
    config: Option<PathBuf>,
    /// WebSocket base address, overriding the config.
    #[arg(long)]
    server: Option<String>,
    /// REST API base address, overriding the config.
    #[arg(long)]
    api: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account.
    Register { username: String, password: String },
    /// Log in and print the access token.
    Login { username: String, password: String },
    /// Show who the token belongs to.
    Whoami {
        #[arg(long, env = "PAPERCRICKET_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Create a match and print its code.
    Create {
        #[arg(long, default_value_t = 1)]
        overs: u32,
        #[arg(long, default_value_t = 1)]
        wickets: u32,
        #[arg(long, env = "PAPERCRICKET_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Join a waiting match.
    Join {
        match_code: String,
        #[arg(long, env = "PAPERCRICKET_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Connect to a match and play it.
    Play {
        match_id: String,
        #[arg(long, env = "PAPERCRICKET_USER")]
        username: String,
        #[arg(long, env = "PAPERCRICKET_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("papercricket=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(api) = cli.api {
        config.api_url = api;
    }

    let api = ApiClient::new(config.api_url.clone());

    match cli.command {
        Command::Register { username, password } => {
            api.register(&username, &password).await?;
            println!("Registered {}. Log in to get a token.", username);
        }
        Command::Login { username, password } => {
            let tokens = api.login(&username, &password).await?;
            println!("{}", tokens.access);
        }
        Command::Whoami { token } => {
            let user = api.current_user(&token).await?;
            println!("{} (id {})", user.username, user.id);
        }
        Command::Create {
            overs,
            wickets,
            token,
        } => {
            let summary = api.create_match(&token, overs, wickets).await?;
            println!(
                "Match {} created: {} overs, {} wickets. Share the code with your opponent.",
                summary.match_code, summary.overs, summary.wickets
            );
        }
        Command::Join { match_code, token } => {
            let summary = api.join_match(&token, &match_code).await?;
            println!(
                "Joined match {} ({})",
                summary.match_code,
                summary.status.as_str()
            );
        }
        Command::Play {
            match_id,
            username,
            token,
        } => {
            let credential = Credential::new(username, token)?;
            play::run(&config, &match_id, credential).await?;
        }
    }

    Ok(())
}
