use ai_vendor_gateway::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::IssueToken(args) => cli::tokens::issue_token(args).await,
        Command::EncryptCredential(args) => cli::secrets::encrypt_credential(args),
        Command::GenerateSecret => cli::secrets::generate_secret(),
    }
}
