//! Account commands backed by the GoTrue endpoints.

use anyhow::{bail, Result};
use clap::Subcommand;
use tracing::warn;

use plantdoc_supabase::SignUpOutcome;

use crate::app::App;
use crate::terminal;

#[derive(Debug, Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Display name stored with the account
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in with email and password
    Login {
        /// Defaults to the remembered email from a previous `--remember`
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        password: String,

        /// Remember the email for next time
        #[arg(long)]
        remember: bool,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
}

pub async fn run(app: &App, cmd: AuthCommands) -> Result<()> {
    match cmd {
        AuthCommands::Signup {
            email,
            password,
            name,
        } => {
            let client = app.supabase()?;
            match client.sign_up(&email, &password, name.as_deref()).await? {
                SignUpOutcome::SignedIn(session) => {
                    app.store.save_session(&session).await?;
                    terminal::note_success(&format!(
                        "Account created. Signed in as {}.",
                        session.user.email
                    ));
                }
                SignUpOutcome::ConfirmationRequired => {
                    terminal::note_info(
                        "Account created! Please check your email to confirm your account.",
                    );
                }
            }
        }
        AuthCommands::Login {
            email,
            password,
            remember,
        } => {
            let email = match email {
                Some(email) => email,
                None => match app.store.remembered_email().await? {
                    Some(email) => email,
                    None => bail!("no email given and none remembered; pass --email"),
                },
            };
            let client = app.supabase()?;
            let session = client.sign_in(&email, &password).await?;
            app.store.save_session(&session).await?;
            app.store.remember_email(&email, remember).await?;
            terminal::note_success(&format!("Signed in as {}.", session.user.email));
        }
        AuthCommands::Logout => match app.store.load_session().await? {
            Some(session) => {
                let client = app.supabase()?.with_access_token(session.access_token);
                if let Err(err) = client.sign_out().await {
                    warn!("Remote sign-out failed: {err}");
                }
                app.store.clear_session().await?;
                terminal::note_success("Signed out.");
            }
            None => terminal::note_info("Not signed in."),
        },
        AuthCommands::Whoami => match app.session().await? {
            Some(session) => {
                println!("Email:   {}", session.user.email);
                if let Some(name) = &session.user.full_name {
                    println!("Name:    {name}");
                }
                println!("User ID: {}", session.user.id);
                println!("Session expires: {}", session.expires_at.format("%Y-%m-%d %H:%M UTC"));
            }
            None => terminal::note_info("Not signed in."),
        },
        AuthCommands::ResetPassword { email } => {
            app.supabase()?.request_password_reset(&email).await?;
            terminal::note_info("Password reset link sent to your email!");
        }
    }
    Ok(())
}
