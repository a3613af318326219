//! `dicprov checksum <path>` – print SHA-256 in manifest-ready form.

use anyhow::Result;
use dicprov_core::checksum;
use std::path::Path;

pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
