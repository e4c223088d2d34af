//! File-backed persistence of vehicle API tokens.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const TOKEN_FILE: &str = "vehicle.json";

/// Tokens for the owner API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp; `None` when the issuer did not say.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl VehicleTokens {
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// True within 5 minutes of expiry.
    pub fn needs_refresh(&self) -> bool {
        self.expires_at
            .map(|exp| chrono::Utc::now().timestamp() >= exp - 300)
            .unwrap_or(false)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| chrono::Utc::now().timestamp() >= exp)
            .unwrap_or(false)
    }
}

/// Stores `VehicleTokens` as JSON in a directory.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/homedash/tokens`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("homedash")
            .join("tokens");
        Ok(Self::new(dir))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    pub fn save(&self, tokens: &VehicleTokens) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create tokens directory")?;
        let json = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;
        write_private(&self.path(), &json)?;
        tracing::info!("Stored vehicle token at {:?}", self.path());
        Ok(())
    }

    /// `Ok(None)` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<VehicleTokens>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).context("Failed to read token file")?;
        let tokens = serde_json::from_str(&json).context("Failed to deserialize tokens")?;
        Ok(Some(tokens))
    }

    pub fn delete(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path).context("Failed to delete token file")?;
            tracing::info!("Deleted vehicle token");
        }
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .context("Failed to open token file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write token file")?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).context("Failed to write token file")
}
