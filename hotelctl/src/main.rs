use crate::cfg::Config;
use crate::store::FileTokenStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use hotelauth::backend::HttpBackend;
use hotelauth::{AuthSession, ClaimResolver, Credentials, Role, SignUpRequest};
use tracing::{debug, Level};

//--------------------------------------------------------------------------------------------------

mod cfg;
mod commands;
mod store;

//--------------------------------------------------------------------------------------------------
// Command line
//--------------------------------------------------------------------------------------------------

#[derive(Parser)]
#[command(version, about = "Sign in to the hotel management backend and inspect the session")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the issued token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HOTELCTL_PASSWORD", hide_env_values = true)]
        password: String,
        /// owner, admin or worker
        #[arg(long, default_value = "owner")]
        role: Role,
    },
    /// Register a new owner, admin or worker account
    SignUp {
        #[arg(long)]
        role: Role,
        /// National id (DNI) of the person
        #[arg(long)]
        id: u64,
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, env = "HOTELCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show who is signed in
    Status,
    /// Print the claims of the stored token
    Claims,
}

//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let cfg = Config::load()?;

    // Initialize tracing
    let mut fmt_sub = tracing_subscriber::fmt().with_writer(std::io::stderr);
    if cfg.debug {
        fmt_sub = fmt_sub.with_max_level(Level::DEBUG);
    } else {
        fmt_sub = fmt_sub.with_max_level(Level::INFO);
    }
    fmt_sub.init();

    // Create the session
    let local_development = cfg.is_local_development();
    debug!(
        "Using {} (local development: {})",
        cfg.api_base_url, local_development
    );
    let session = AuthSession::new(
        FileTokenStore::new(cfg.token_path()),
        HttpBackend::new(cfg.api_base_url.clone())?,
        ClaimResolver::new(local_development),
    );

    match cli.command {
        Command::Login {
            email,
            password,
            role,
        } => commands::login(&session, Credentials::new(email, password, role)).await?,
        Command::SignUp {
            role,
            id,
            username,
            name,
            surname,
            email,
            phone,
            password,
        } => {
            let request = SignUpRequest {
                id,
                username,
                name,
                surname,
                email,
                phone,
                password,
            };
            commands::sign_up(&session, role, request).await?
        }
        Command::Logout => commands::logout(&session),
        Command::Status => commands::status(&session),
        Command::Claims => commands::claims(&session)?,
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
