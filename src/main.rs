use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flink_session::App;
use flink_session::app::AppError;
use flink_session::config::{ConfigError, SessionConfig};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("missing password; pass --password or set FLINK_PASSWORD")]
    MissingPassword,
}

#[derive(Parser, Debug)]
#[command(name = "flink-session", about = "Sign in and out of a Flink server")]
struct Cli {
    /// Overrides `FLINK_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `FLINK_SESSION_FILE`.
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        username: String,
        #[arg(long, env = "FLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and clear the stored session.
    Logout,
    /// Print the signed-in username.
    Whoami,
}

#[tokio::main]
async fn main() -> Result<ExitCode, CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = SessionConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }

    let app = App::bootstrap(config)?;

    match cli.command {
        Command::Login { username, password } => {
            let password = password.ok_or(CliError::MissingPassword)?;
            run_login(&app, &username, &password).await
        }
        Command::Logout => {
            app.session().sign_out();
            println!("signed out");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            match app.session().current_user().filter(|u| !u.is_empty()) {
                Some(user) => println!("{user}"),
                None => println!("not signed in"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_login(app: &App, username: &str, password: &str) -> Result<ExitCode, CliError> {
    let user = app.session().attempt_sign_in(username, password).await;
    for toast in app.toasts().history() {
        eprintln!("{}", toast.text);
    }
    if user.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    println!("{user}");
    Ok(ExitCode::SUCCESS)
}
