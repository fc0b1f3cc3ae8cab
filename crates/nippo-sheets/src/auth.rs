//! OAuth2 JWT-bearer token exchange for service accounts.
//!
//! A signed RS256 assertion is posted to the key's `token_uri`; the returned
//! bearer token is cached until shortly before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result, credentials::ServiceAccountKey};

/// Scopes requested for every token: read/write sheets, find files by name.
pub const SCOPES: &[&str] = &[
  "https://www.googleapis.com/auth/spreadsheets",
  "https://www.googleapis.com/auth/drive",
];

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
  iss:   &'a str,
  scope: String,
  aud:   &'a str,
  iat:   i64,
  exp:   i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
  #[serde(default = "default_expires_in")]
  expires_in:   i64,
}

fn default_expires_in() -> i64 { ASSERTION_LIFETIME_SECS }

struct CachedToken {
  token:      String,
  expires_at: DateTime<Utc>,
}

/// Hands out bearer tokens for one service account.
pub struct TokenProvider {
  key:   ServiceAccountKey,
  http:  Client,
  cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
  pub fn new(key: ServiceAccountKey, http: Client) -> Self {
    Self { key, http, cache: Mutex::new(None) }
  }

  pub fn client_email(&self) -> &str { &self.key.client_email }

  /// A valid bearer token, fetching a new one if the cached token is stale.
  pub async fn access_token(&self) -> Result<String> {
    let mut cache = self.cache.lock().await;
    let now = Utc::now();
    if let Some(cached) = cache.as_ref()
      && cached.expires_at > now
    {
      return Ok(cached.token.clone());
    }

    let fresh = self.exchange(now).await?;
    let token = fresh.token.clone();
    *cache = Some(fresh);
    Ok(token)
  }

  /// Build the signed assertion for `now`.
  pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
    let iat = now.timestamp();
    let claims = Claims {
      iss:   &self.key.client_email,
      scope: SCOPES.join(" "),
      aud:   &self.key.token_uri,
      iat,
      exp:   iat + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = self.key.private_key_id.clone();
    let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&header, &claims, &signing_key)?)
  }

  async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken> {
    let assertion = self.assertion(now)?;
    let resp = self
      .http
      .post(&self.key.token_uri)
      .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Api { status, body });
    }
    let token: TokenResponse = resp.json().await?;
    tracing::debug!(account = %self.key.client_email, expires_in = token.expires_in, "obtained access token");

    Ok(CachedToken {
      token:      token.access_token,
      expires_at: now + Duration::seconds(token.expires_in - EXPIRY_SLACK_SECS),
    })
  }
}
