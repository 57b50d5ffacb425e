//! Whoami command implementation

use crate::cli::context::{report_error, CommandContext};
use crate::cli::exit_codes;
use crate::domain::Identity;
use clap::Args;

/// Arguments for the whoami command
#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Sign in with the configured credentials if there is no session
    #[arg(long)]
    pub login: bool,

    /// End the session
    #[arg(long, conflicts_with = "login")]
    pub logout: bool,
}

impl WhoamiArgs {
    /// Execute the whoami command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let ctx = match CommandContext::load(config_path) {
            Ok(ctx) => ctx,
            Err(code) => return Ok(code),
        };

        if self.logout {
            return match ctx.session.logout().await {
                Ok(()) => {
                    println!("👋 Signed out");
                    Ok(exit_codes::OK)
                }
                Err(e) => Ok(report_error(&e)),
            };
        }

        if let Some(hint) = ctx.session.cached_hint() {
            tracing::debug!(email = ?hint.email, "Last known user");
        }

        let identity = if self.login {
            match ctx.sign_in().await {
                Ok(identity) => Some(identity),
                Err(e) => return Ok(report_error(&e)),
            }
        } else {
            ctx.session.refresh().await
        };

        match identity {
            Some(identity) => print_identity(&identity),
            None => {
                println!("Not signed in");
                if let Some(hint) = ctx.session.cached_hint() {
                    println!("   Last signed in as {}", hint.display_name());
                }
                if ctx.config.credentials.is_complete() {
                    println!("   Run 'godwit whoami --login' to sign in");
                }
            }
        }
        Ok(exit_codes::OK)
    }
}

fn print_identity(identity: &Identity) {
    println!("👤 {}", identity.display_name());
    if let Some(email) = &identity.email {
        println!("   Email: {email}");
    }
    if !identity.roles.is_empty() {
        let roles: Vec<String> = identity.roles.iter().map(|r| r.to_string()).collect();
        println!("   Roles: {}", roles.join(", "));
    }
}
