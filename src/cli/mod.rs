//! CLI for the AI vendor gateway
//!
//! Subcommands:
//! - `serve`: run the gateway server
//! - `issue-token`: mint an API token and print its storage hash
//! - `encrypt-credential`: encrypt a vendor API key for storage
//! - `generate-secret`: print fresh random secrets for a new deployment

pub mod secrets;
pub mod serve;
pub mod tokens;

use clap::{Parser, Subcommand};

/// AI vendor gateway - one authenticated surface over multiple AI vendors
#[derive(Parser)]
#[command(name = "ai-vendor-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway server
    Serve,

    /// Issue a new API token
    IssueToken(tokens::IssueTokenArgs),

    /// Encrypt a vendor API key for storage
    EncryptCredential(secrets::EncryptCredentialArgs),

    /// Generate fresh random secrets
    GenerateSecret,
}
