//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use counsel_core::validation::is_valid_phone;
use counsel_core::{ClientConfig, FileStore, RegisterRequest, Role, Session, User};
use counsel_http::{ApiClientBuilder, ApiRequest, AuthManager};
use counsel_router::{History, Router, href};
use reqwest::Method;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the backend to text a verification code
    SendCode {
        /// Mainland mobile number
        phone: String,
    },

    /// Sign in with a verification code
    Login {
        phone: String,
        code: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        code: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        email: Option<String>,

        /// admin, professional or user
        #[arg(long)]
        role: Option<Role>,
    },

    /// Show the signed-in user, restoring the stored session first
    Whoami,

    /// End the session
    Logout,

    /// Resolve a path through the navigation guard
    Navigate {
        /// Path such as /case/42 or /case-pool
        path: String,
    },

    /// Send an authenticated API request and print the response
    Request {
        /// HTTP method
        #[arg(value_parser = parse_method)]
        method: Method,

        /// Path relative to the API base URL
        path: String,

        /// JSON request body
        #[arg(long)]
        data: Option<String>,

        /// Query parameter as key=value, repeatable
        #[arg(long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },

    /// Print the effective configuration
    Config,
}

/// Everything a command needs, wired to one shared session
struct App {
    auth: AuthManager,
    router: Router,
}

impl App {
    async fn open(config: &ClientConfig, data_dir: PathBuf) -> Result<Self> {
        let store = Arc::new(FileStore::new(data_dir));
        let session = Session::restore(store, config.cookies.clone())
            .await
            .context("Failed to read stored session")?;
        let history = Arc::new(History::new());

        let client = ApiClientBuilder::from_config(config)
            .session(session)
            .navigator(history.clone())
            .build()?;
        let auth = AuthManager::new(client);
        let router = Router::new(auth.clone(), history).with_app_title(config.app_title.clone());

        Ok(Self { auth, router })
    }
}

impl Commands {
    pub async fn execute(self, config: ClientConfig, data_dir: PathBuf) -> Result<()> {
        let app = App::open(&config, data_dir).await?;

        match self {
            Commands::SendCode { phone } => {
                check_phone(&phone)?;
                app.auth.send_verification_code(&phone).await?;
                println!("Verification code sent to {phone}");
            }
            Commands::Login { phone, code } => {
                check_phone(&phone)?;
                let user = app.auth.login(&phone, &code).await?;
                print_user(&user);
            }
            Commands::Register {
                phone,
                code,
                username,
                email,
                role,
            } => {
                check_phone(&phone)?;
                let user = app
                    .auth
                    .register(RegisterRequest {
                        phone_number: phone,
                        verification_code: code,
                        username,
                        email,
                        role,
                    })
                    .await?;
                print_user(&user);
            }
            Commands::Whoami => {
                app.auth.init().await;
                match app.auth.session().user().await {
                    Some(user) => print_user(&user),
                    None => bail!("Not signed in"),
                }
            }
            Commands::Logout => {
                app.auth.logout().await;
                println!("Signed out");
            }
            Commands::Navigate { path } => {
                let location = app.router.push(&path).await?;
                let resolved = href(&location)?;
                info!(requested = %path, resolved = %resolved, "Navigation finished");
                println!("{resolved}\t{}", app.router.history().title());
            }
            Commands::Request {
                method,
                path,
                data,
                query,
            } => {
                let mut request = query
                    .into_iter()
                    .fold(ApiRequest::new(method, path), |request, (key, value)| {
                        request.query(key, value)
                    });
                if let Some(data) = data {
                    let body: Value =
                        serde_json::from_str(&data).context("--data is not valid JSON")?;
                    request = request.body(body);
                }
                let response = app.auth.client().dispatch(request).await?;
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Commands::Config => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }

        Ok(())
    }
}

fn check_phone(phone: &str) -> Result<()> {
    if !is_valid_phone(phone) {
        bail!("Invalid phone number: {phone}");
    }
    Ok(())
}

fn print_user(user: &User) {
    let email = user.email.as_deref().unwrap_or("-");
    let verified = if user.is_verified { "verified" } else { "unverified" };
    println!(
        "{} ({}) role={} email={} {}",
        user.username, user.id, user.role, email, verified
    );
}

fn parse_method(value: &str) -> Result<Method, String> {
    Method::from_bytes(value.to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("invalid HTTP method: {value}"))
}

fn parse_pair(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {value}"))
}
