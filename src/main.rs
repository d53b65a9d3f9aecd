use aesduo::{AesCipher, Algorithm, EncryptResult};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;
mod key;

/// Raw bytes given on the command line as hex.
#[derive(Debug, Clone)]
struct HexBytes(Vec<u8>);

impl FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s.trim()).map(HexBytes)
    }
}

/// JSON document printed by `encrypt` and consumed by `decrypt`.
#[derive(Debug, Serialize, Deserialize)]
struct SealedMessage {
    alg: Algorithm,
    #[serde(flatten)]
    sealed: EncryptResult,
    #[serde(with = "hex::serde", default)]
    aad: Vec<u8>,
}

#[derive(Debug, clap::Args)]
struct KeyArgs {
    /// Content encryption key as hex
    #[arg(long, env = "AESDUO_KEY", hide_env_values = true, value_name = "HEX")]
    key: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "aesduo")]
#[command(
    version,
    about = "AES content encryption with CBC-HMAC and GCM under JOSE identifiers."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lists supported content encryption algorithms
    Algorithms,

    /// Prints a fresh random key for an algorithm
    #[command(arg_required_else_help = true)]
    Keygen { alg: Algorithm },

    /// Encrypts a file or stdin and prints the sealed message as JSON
    #[command(arg_required_else_help = true)]
    Encrypt {
        alg: Algorithm,

        #[command(flatten)]
        key: KeyArgs,

        /// Additional authenticated data as hex
        #[arg(long, value_name = "HEX")]
        aad: Option<HexBytes>,

        /// Explicit IV as hex (random when omitted)
        #[arg(long, value_name = "HEX")]
        iv: Option<HexBytes>,

        /// Plaintext file (stdin when omitted)
        #[arg(long, short, value_name = "PATH")]
        input: Option<PathBuf>,
    },

    /// Decrypts a sealed JSON message from a file or stdin
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Sealed message file (stdin when omitted)
        #[arg(long, short, value_name = "PATH")]
        input: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("AESDUO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

const READ_CHUNK: usize = 8192;

/// Reads `reader` to the end without leaving stale copies behind: the buffer
/// only grows by moving into a larger `Zeroizing` allocation.
fn read_zeroizing(mut reader: impl Read, size_hint: usize) -> io::Result<Zeroizing<Vec<u8>>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(size_hint.max(READ_CHUNK)));
    let mut chunk = Zeroizing::new([0u8; READ_CHUNK]);
    loop {
        let n = match reader.read(&mut chunk[..]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if buf.len() + n > buf.capacity() {
            let mut grown = Zeroizing::new(Vec::with_capacity((buf.len() + n) * 2));
            grown.extend_from_slice(&buf);
            buf = grown;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf)
}

fn read_input(path: Option<&PathBuf>) -> Result<Zeroizing<Vec<u8>>> {
    match path {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("failed to open {}", p.display()))?;
            let size_hint = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
            read_zeroizing(file, size_hint)
                .with_context(|| format!("failed to read {}", p.display()))
        }
        None => read_zeroizing(io::stdin().lock(), 0).context("failed to read stdin"),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Cli::parse();
    let cipher: AesCipher = AesCipher::default();

    match args.command {
        Commands::Algorithms => {
            println!("{:<14}  {:>4}  {:>3}  {:>4}", "Algorithm", "Key", "IV", "Tag");
            println!("{:-<14}  {:->4}  {:->3}  {:->4}", "", "", "", "");
            for alg in Algorithm::ALL {
                let params = alg.params();
                println!(
                    "{:<14}  {:>4}  {:>3}  {:>4}",
                    alg.name(),
                    params.key_len,
                    params.iv_len,
                    params.tag_len
                );
            }
        }
        Commands::Keygen { alg } => {
            let cek = cipher.generate_key(alg)?;
            println!("{}", hex::encode(cek.as_slice()));
        }
        Commands::Encrypt {
            alg,
            key: key_args,
            aad,
            iv,
            input,
        } => {
            let cek = key::read_key(key_args.key)?;
            let plaintext = read_input(input.as_ref())?;
            let aad = aad.map(|a| a.0).unwrap_or_default();

            let sealed = cipher
                .encrypt(alg, &cek, &plaintext, &aad, iv.as_ref().map(|v| v.0.as_slice()))
                .context("encryption failed")?;

            let message = SealedMessage { alg, sealed, aad };
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
        Commands::Decrypt {
            key: key_args,
            input,
        } => {
            let cek = key::read_key(key_args.key)?;
            let raw = read_input(input.as_ref())?;
            let message: SealedMessage =
                serde_json::from_slice(&raw).context("input is not a sealed message")?;

            let plaintext = cipher
                .decrypt(
                    message.alg,
                    &cek,
                    &message.sealed.ciphertext,
                    &message.sealed.tag,
                    &message.sealed.iv,
                    &message.aad,
                )
                .context("decryption failed")?;

            let mut stdout = io::stdout().lock();
            stdout.write_all(&plaintext)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
