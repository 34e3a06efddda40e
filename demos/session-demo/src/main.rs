use std::path::PathBuf;

use clap::{Parser, Subcommand};
use latchkey::prelude::*;
use serde_json::Map;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "session-demo", about = "Sign in and out of a persisted Latchkey session")]
struct Cli {
    #[arg(long, env = "LATCHKEY_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    /// Where the encrypted session store lives between runs.
    #[arg(long, env = "LATCHKEY_DATA_DIR", default_value = ".latchkey")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show who is signed in (read from the store, no network).
    Status,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LATCHKEY_PASSWORD")]
        password: String,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LATCHKEY_PASSWORD")]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },
    Logout,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), LatchkeyError> {
    latchkey::telemetry::init_tracing();
    let cli = Cli::parse();

    let app = Latchkey::builder()
        .platform(Platform::Native)
        .store_config(StoreConfig::new(&cli.data_dir))
        .base_url(cli.base_url)
        .build()
        .await?;
    let session = app.context();
    let state = session.wait_until_loaded().await;

    match cli.command {
        Command::Status => print_status(&state),
        Command::Login { email, password } => {
            let result = session.sign_in(&email, &password).await;
            report(&session, result)?;
        }
        Command::Signup {
            name,
            email,
            password,
            phone,
        } => {
            let fields = SignUpFields {
                name,
                email,
                password,
                phone,
                extra: Map::new(),
            };
            let result = session.sign_up(&fields).await;
            report(&session, result)?;
        }
        Command::Logout => {
            session.sign_out().await;
            println!("signed out");
        }
    }

    Ok(())
}

fn print_status(state: &SessionState) {
    match (state.phase(), &state.user) {
        (Phase::Authenticated, Some(user)) => {
            println!("signed in as {} (id {})", display_name(user), user.id);
        }
        _ => println!("not signed in"),
    }
}

fn report(
    session: &AppSession,
    result: Result<UserProfile, SessionError>,
) -> Result<(), LatchkeyError> {
    match result {
        Ok(user) => {
            println!("signed in as {}", display_name(&user));
            Ok(())
        }
        Err(e) => {
            if let Some(message) = session.error() {
                eprintln!("{message}");
            }
            Err(e.into())
        }
    }
}

fn display_name(user: &UserProfile) -> &str {
    if user.name.is_empty() {
        user.email.as_deref().unwrap_or(&user.id)
    } else {
        &user.name
    }
}
