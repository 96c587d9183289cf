//! Build script for the Spotify relay.
//!
//! Copies the `.env.example` configuration template into the user's local
//! data directory, next to where `config::load_env` looks for `.env`.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` to `<data_local_dir>/spotrelay/.env.example`.
///
/// # Destination Location
///
/// - Linux: `~/.local/share/spotrelay/.env.example`
/// - macOS: `~/Library/Application Support/spotrelay/.env.example`
/// - Windows: `%LOCALAPPDATA%/spotrelay/.env.example`
///
/// A missing template only emits a cargo warning. A data directory that
/// cannot be written is also downgraded to a warning so sandboxed builds
/// (CI, containers with a read-only home) still succeed.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return Ok(());
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotrelay");

    let copied = fs::create_dir_all(&out_dir).and_then(|_| {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)
    });
    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
