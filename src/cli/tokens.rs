//! Token management commands

use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::auth::{TokenConfig, TokenService};
use crate::infrastructure::storage::{InMemoryTokenStore, InMemoryUserStore};

#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Owning user id recorded with the token
    #[arg(long, default_value = "admin")]
    pub owner: String,

    /// Token lifetime in hours; omit for a non-expiring token
    #[arg(long)]
    pub expires_in_hours: Option<i64>,
}

/// Issue a token with the configured signing secret and print it together
/// with the hash an external token store needs to persist.
pub async fn issue_token(args: IssueTokenArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();

    let service = TokenService::new(
        TokenConfig::new(&config.auth.secret_key),
        Arc::new(InMemoryTokenStore::new()),
        Arc::new(InMemoryUserStore::new()),
    );

    let expires_at = args.expires_in_hours.map(|h| Utc::now() + Duration::hours(h));
    let issued = service.issue(&args.owner, expires_at).await?;

    println!("token:        {}", issued.token);
    println!("subject id:   {}", issued.subject_id);
    println!("content hash: {}", issued.content_hash);
    println!("expires at:   {}", issued.expires_at.to_rfc3339());

    println!("\nTo accept this token on a standalone gateway, add the hash to");
    println!("APP__AUTH__SEED_TOKEN_HASHES before starting it.");

    Ok(())
}
