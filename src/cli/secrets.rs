//! Secret management commands

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::Args;
use rand::RngCore;

use crate::config::AppConfig;
use crate::infrastructure::encryption::CredentialEncryption;

#[derive(Debug, Args)]
pub struct EncryptCredentialArgs {
    /// Vendor API key to encrypt
    pub plaintext: String,
}

/// Encrypt a vendor API key with the configured master secret and print
/// the storage blob.
pub fn encrypt_credential(args: EncryptCredentialArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();

    let encryption = CredentialEncryption::new(&config.auth.encryption_key);
    let blob = encryption.encrypt(&args.plaintext)?;

    println!("{}", blob);
    Ok(())
}

/// Generate and display fresh random secrets for a new deployment
pub fn generate_secret() -> anyhow::Result<()> {
    println!("Add these to your .env file:\n");
    println!("APP__AUTH__SECRET_KEY={}", random_secret(32));
    println!("APP__AUTH__ENCRYPTION_KEY={}", random_secret(32));

    println!("\nImportant:");
    println!("- Keep these secrets consistent across deployments");
    println!("- Changing the encryption key makes existing encrypted credentials unusable");

    Ok(())
}

fn random_secret(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
