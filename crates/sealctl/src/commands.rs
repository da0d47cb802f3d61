//! Subcommand execution: stdin bytes in, stdout bytes out.

use anyhow::{Context, Result};
use clap::Subcommand;
use seal_core::{AeadManager, CancellationToken, KeySource};
use tracing::info;

/// Operations on a single value read from stdin.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Encrypt stdin with the current system secret
    Encrypt {
        /// Keep a trailing newline instead of stripping it
        #[arg(long)]
        raw: bool,
    },

    /// Decrypt a ciphertext from stdin, trying every configured secret
    Decrypt,

    /// Re-encrypt a ciphertext under the current secret if an older one was needed
    Rewrap,
}

/// Run `command` against `input` and return what should be written to stdout.
///
/// # Errors
///
/// Returns an error if the input is unusable or the manager call fails.
pub async fn execute<S: KeySource>(
    command: Command,
    manager: &AeadManager<S>,
    ctx: &CancellationToken,
    input: &[u8],
) -> Result<Vec<u8>> {
    match command {
        Command::Encrypt { raw } => {
            let plaintext = if raw { input } else { strip_newline(input) };
            let text = manager
                .encrypt(ctx, plaintext)
                .await
                .context("encryption failed")?;
            Ok(line(text))
        }
        Command::Decrypt => {
            let text = ciphertext(input)?;
            manager.decrypt(ctx, text).await.context("decryption failed")
        }
        Command::Rewrap => {
            let text = ciphertext(input)?;
            match manager.rewrap(ctx, text).await.context("rewrap failed")? {
                Some(rewrapped) => {
                    info!("ciphertext rewrapped under current secret");
                    Ok(line(rewrapped))
                }
                None => {
                    info!("ciphertext already sealed under current secret");
                    Ok(line(text.to_owned()))
                }
            }
        }
    }
}

fn strip_newline(input: &[u8]) -> &[u8] {
    let input = input.strip_suffix(b"\n").unwrap_or(input);
    input.strip_suffix(b"\r").unwrap_or(input)
}

fn ciphertext(input: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(input).context("ciphertext must be valid UTF-8")?;
    Ok(text.trim())
}

fn line(mut text: String) -> Vec<u8> {
    text.push('\n');
    text.into_bytes()
}
