//! Profile display and updates (auth metadata plus the `profiles` row).

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Subcommand;

use plantdoc_supabase::{MetadataUpdate, ProfileRow, UserUpdate};

use crate::app::App;
use crate::terminal;

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show,
    /// Change the display name or password
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },
}

pub async fn run(app: &App, cmd: ProfileCommands) -> Result<()> {
    let (client, session) = app.signed_client().await?;
    match cmd {
        ProfileCommands::Show => {
            let profile = client.get_profile(session.user.id).await?;
            let name = profile
                .as_ref()
                .and_then(|p| p.full_name.clone())
                .or_else(|| session.user.full_name.clone());

            println!("Email:   {}", session.user.email);
            if let Some(name) = name {
                println!("Name:    {name}");
            }
            println!("User ID: {}", session.user.id);
            if let Some(created) = session.user.created_at {
                println!("Member since: {}", created.format("%B %Y"));
            }
        }
        ProfileCommands::Update { name, password } => {
            if name.is_none() && password.is_none() {
                bail!("nothing to update; pass --name or --password");
            }

            let update = UserUpdate {
                password,
                data: name.clone().map(|full_name| MetadataUpdate {
                    full_name: Some(full_name),
                }),
            };
            let user = client.update_user(&update).await?;

            if let Some(full_name) = name {
                client
                    .upsert_profile(&ProfileRow {
                        id: session.user.id,
                        full_name: Some(full_name),
                        avatar_url: None,
                        updated_at: Some(Utc::now()),
                    })
                    .await?;
            }

            // Keep the stored session's user in step with the server.
            let mut session = session;
            session.user = user;
            app.store.save_session(&session).await?;
            terminal::note_success("Profile updated.");
        }
    }
    Ok(())
}
