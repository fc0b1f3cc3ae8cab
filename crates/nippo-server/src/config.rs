//! Runtime configuration, layered from `config.toml` and `NIPPO_*`
//! environment variables.

use std::path::{Path, PathBuf};

use nippo_sheets::SheetsConfig;
use serde::Deserialize;

/// Which [`nippo_core::store::ReportStore`] the server talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// The `daily_report_db` Google spreadsheet.
  #[default]
  Sheets,
  /// A local SQLite file laid out like the spreadsheet.
  Sqlite,
}

/// Runtime server configuration. Holds the encoded credential, so it is not
/// `Debug`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default)]
  pub backend:          Backend,

  #[serde(default = "default_store_name")]
  pub store_name:       String,
  /// Bypasses the lookup of `store_name` when set.
  #[serde(default)]
  pub spreadsheet_id:   Option<String>,
  #[serde(default = "default_credentials_path")]
  pub credentials_path: PathBuf,
  /// Base64 of the service-account JSON key; written to `credentials_path`
  /// when that file is missing.
  #[serde(default)]
  pub gcp_encoded:      Option<String>,
  #[serde(default = "default_sheets_api_base")]
  pub sheets_api_base:  String,
  #[serde(default = "default_drive_api_base")]
  pub drive_api_base:   String,

  #[serde(default = "default_sqlite_path")]
  pub sqlite_path:      PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8501 }
fn default_store_name() -> String { nippo_sheets::DEFAULT_STORE_NAME.to_owned() }
fn default_credentials_path() -> PathBuf { PathBuf::from("secrets.json") }
fn default_sheets_api_base() -> String { nippo_sheets::DEFAULT_SHEETS_API_BASE.to_owned() }
fn default_drive_api_base() -> String { nippo_sheets::DEFAULT_DRIVE_API_BASE.to_owned() }
fn default_sqlite_path() -> PathBuf { PathBuf::from("~/.local/share/nippo/reports.db") }

impl ServerConfig {
  pub fn sheets(&self) -> SheetsConfig {
    SheetsConfig {
      store_name:      self.store_name.clone(),
      spreadsheet_id:  self.spreadsheet_id.clone().filter(|id| !id.is_empty()),
      sheets_api_base: self.sheets_api_base.clone(),
      drive_api_base:  self.drive_api_base.clone(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Read `path` (optional) and overlay `NIPPO_*` environment variables.
pub fn load(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("NIPPO").try_parsing(true))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
