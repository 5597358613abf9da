// SPDX-License-Identifier: AGPL-3.0
// Civet CLI - Terminal frontend

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// civet - split bills from the terminal
#[derive(Parser, Debug)]
#[command(name = "civet")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the cached access token
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// List or create outings
    Outings {
        #[command(subcommand)]
        command: OutingCommands,
    },

    /// List receipts for an outing
    Receipts {
        /// Outing id
        outing_id: String,
    },

    /// Show a receipt with its items, fees and current split totals
    Receipt {
        /// Receipt id
        receipt_id: String,
    },

    /// List or add friends on a receipt
    Friends {
        #[command(subcommand)]
        command: FriendCommands,
    },

    /// Toggle item-to-friend assignments and sync them
    Split {
        /// Receipt id
        receipt_id: String,

        /// Assignment to flip, as item_id:friend_id (repeatable)
        #[arg(long = "pair", required = true)]
        pairs: Vec<String>,
    },

    /// Server-computed per-friend totals for a whole outing
    Totals {
        /// Outing id
        outing_id: String,
    },

    /// Upload a receipt photo to an outing
    Upload {
        /// Outing id
        outing_id: String,

        /// Path to the image file
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommands {
    /// Store an access token obtained elsewhere
    SetToken { token: String },
    /// Forget the stored token
    Clear,
    /// Show whether a token is cached
    Show,
}

#[derive(Subcommand, Debug)]
enum OutingCommands {
    /// List all outings
    List,
    /// Create a new outing
    Create { name: String },
}

#[derive(Subcommand, Debug)]
enum FriendCommands {
    /// List friends on a receipt
    List { receipt_id: String },
    /// Add a friend to a receipt
    Add { receipt_id: String, name: String },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("civet_cli=info".parse().unwrap())
                .add_directive("civet_client=info".parse().unwrap())
                .add_directive("civet_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Failures are never fatal app states: report and let the user retry.
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::SetToken { token } => commands::auth_set_token(token),
            AuthCommands::Clear => commands::auth_clear(),
            AuthCommands::Show => commands::auth_show(),
        },
        Commands::Outings { command } => match command {
            OutingCommands::List => commands::outings_list().await,
            OutingCommands::Create { name } => commands::outings_create(&name).await,
        },
        Commands::Receipts { outing_id } => commands::receipts_list(&outing_id).await,
        Commands::Receipt { receipt_id } => commands::receipt_show(&receipt_id).await,
        Commands::Friends { command } => match command {
            FriendCommands::List { receipt_id } => commands::friends_list(&receipt_id).await,
            FriendCommands::Add { receipt_id, name } => {
                commands::friends_add(&receipt_id, &name).await
            }
        },
        Commands::Split { receipt_id, pairs } => commands::split_toggle(&receipt_id, &pairs).await,
        Commands::Totals { outing_id } => commands::outing_totals(&outing_id).await,
        Commands::Upload { outing_id, path } => commands::upload(&outing_id, &path).await,
    }
}
