//! Service-account credential provisioning.
//!
//! A local key file is used as-is when it exists. Otherwise a base64-encoded
//! copy of the key from the deployment configuration is decoded and written
//! to that path first, so hosted deployments never need the file committed.

use std::{fmt, fs, path::Path};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use nippo_core::Error;
use serde::Deserialize;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String { DEFAULT_TOKEN_URI.to_owned() }

/// The fields of a Google service-account JSON key that token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
  pub client_email:   String,
  /// PKCS#8 PEM.
  pub private_key:    String,
  #[serde(default)]
  pub private_key_id: Option<String>,
  #[serde(default = "default_token_uri")]
  pub token_uri:      String,
}

impl fmt::Debug for ServiceAccountKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceAccountKey")
      .field("client_email", &self.client_email)
      .field("private_key_id", &self.private_key_id)
      .field("token_uri", &self.token_uri)
      .finish_non_exhaustive()
  }
}

impl ServiceAccountKey {
  pub fn from_json(bytes: &[u8]) -> nippo_core::Result<Self> {
    serde_json::from_slice(bytes)
      .map_err(|e| Error::Credential(format!("invalid service account key: {e}")))
  }
}

/// Produce the key, materialising `path` from `encoded` when it is missing.
pub fn provision(path: &Path, encoded: Option<&str>) -> nippo_core::Result<ServiceAccountKey> {
  if !path.exists() {
    let Some(encoded) = encoded.filter(|e| !e.trim().is_empty()) else {
      return Err(Error::Credential(format!(
        "{} does not exist and no encoded credential is configured",
        path.display()
      )));
    };
    materialize(path, encoded)?;
    tracing::info!(path = %path.display(), "wrote service credential from encoded secret");
  }
  load(path)
}

/// Read and parse an existing key file.
pub fn load(path: &Path) -> nippo_core::Result<ServiceAccountKey> {
  let bytes = fs::read(path)
    .map_err(|e| Error::Credential(format!("reading {}: {e}", path.display())))?;
  ServiceAccountKey::from_json(&bytes)
}

fn materialize(path: &Path, encoded: &str) -> nippo_core::Result<()> {
  // Secrets pasted into dashboards often pick up line breaks.
  let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
  let decoded = B64
    .decode(compact)
    .map_err(|e| Error::Credential(format!("encoded credential is not base64: {e}")))?;

  // Refuse to leave an unusable file behind; it would win on the next start.
  ServiceAccountKey::from_json(&decoded)?;

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .map_err(|e| Error::Credential(format!("creating {}: {e}", parent.display())))?;
  }
  fs::write(path, &decoded)
    .map_err(|e| Error::Credential(format!("writing {}: {e}", path.display())))
}
