//! Resona command line client.
//!
//! Drives the session core from a terminal: wallet login, registration,
//! demo access, and profile lookups against a Resona API server.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resona_client::{ClientConfig, FileSessionStore, Notifier, SessionStore, User};

#[derive(Parser)]
#[command(name = "resona")]
#[command(version, about = "Resona platform command line client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides RESONA_API_URL)
    #[arg(long)]
    server_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register {
        /// Account username
        username: String,

        /// Wallet address to bind
        wallet: String,
    },
    /// Log in with a wallet address
    Login {
        /// Wallet address
        wallet: String,
    },
    /// Log in with a throwaway demo identity
    Demo,
    /// Log out and clear the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Fetch a public profile
    Profile {
        /// Profile username
        username: String,
    },
}

/// Notifier that prints straight to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn print_user(user: &User) {
    println!("{} ({})", user.username, user.wallet);
    println!("  id:        {}", user.id);
    println!("  followers: {}", user.followers);
    if let Some(bio) = &user.bio {
        println!("  bio:       {bio}");
    }
    println!("  since:     {}", user.created_at.format("%Y-%m-%d"));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.server_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api_url = %config.api_url, "Client configured");

    let persistence = Arc::new(FileSessionStore::default_location()?);
    let store = SessionStore::new(config, persistence, Arc::new(ConsoleNotifier));

    match cli.command {
        Commands::Register { username, wallet } => {
            // Failures were already surfaced through the notifier.
            match store.register_new_user(&username, &wallet).await {
                Ok(user) => println!("Registered as {} ({})", user.username, user.wallet),
                Err(_) => std::process::exit(1),
            }
        }
        Commands::Login { wallet } => match store.api().login(&wallet).await {
            Ok(user) => {
                println!("Logged in as {} ({})", user.username, user.wallet);
                store.set_user(Some(user));
            }
            Err(e) if e.is_not_found() => {
                eprintln!("No account for this wallet. Run `resona register` first.");
                std::process::exit(1);
            }
            Err(_) => std::process::exit(1),
        },
        Commands::Demo => {
            store.login_demo();
            if let Some(user) = store.snapshot().user {
                println!("Logged in as {} ({})", user.username, user.wallet);
            }
        }
        Commands::Logout => {
            store.logout();
        }
        Commands::Whoami => match store.snapshot().user {
            Some(user) => print_user(&user),
            None => println!("Not logged in"),
        },
        Commands::Profile { username } => match store.api().fetch_profile(&username).await {
            Ok(profile) => {
                println!("{}", profile.username);
                println!("  followers: {}", profile.followers);
                if let Some(bio) = &profile.bio {
                    println!("  bio:       {bio}");
                }
                println!("  tracks:    {}", profile.tracks.len());
            }
            Err(_) => std::process::exit(1),
        },
    }

    Ok(())
}
