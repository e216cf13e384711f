use crate::core::{REFERER, USER_AGENT};
use crate::domain::model::Credential;
use crate::domain::ports::CredentialProvider;
use crate::utils::error::{IcpError, Result};
use async_trait::async_trait;
use md5::{Digest, Md5};
use reqwest::{header, Client};
use serde::Deserialize;

const AUTH_URL: &str = "https://hlwicpfwc.miit.gov.cn/icpproject_query/api/auth";

/// Fixed shared secret the upstream hashes into the auth key.
const AUTH_SECRET: &str = "testtest";

/// Expiry applied when the auth response omits `params.expire`, in ms.
const DEFAULT_EXPIRE_MS: i64 = 60_000;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    params: Option<AuthParams>,
}

#[derive(Debug, Deserialize)]
struct AuthParams {
    #[serde(rename = "bussiness")]
    token: String,
    sign: String,
    #[serde(default)]
    expire: Option<i64>,
}

/// Obtains and caches the token + signature pair the query API requires.
///
/// Holds the single process-wide credential. Callers go through
/// [`CredentialProvider::ensure`], which refreshes over the network only
/// when the cached credential is missing or inside the expiry margin.
pub struct TokenManager {
    client: Client,
    auth_url: String,
    cached: Option<Credential>,
}

impl TokenManager {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, AUTH_URL)
    }

    /// Endpoint override used by tests to point at a mock server.
    pub fn with_endpoint(client: Client, auth_url: impl Into<String>) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            cached: None,
        }
    }

    async fn fetch(&self) -> Result<Credential> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis().to_string();
        let auth_key = hex::encode(Md5::digest(format!("{}{}", AUTH_SECRET, timestamp_ms)));
        let form = [
            ("authKey", auth_key.as_str()),
            ("timeStamp", timestamp_ms.as_str()),
        ];

        tracing::debug!("requesting fresh credential from {}", self.auth_url);
        let response = self
            .client
            .post(&self.auth_url)
            .header(header::REFERER, REFERER)
            .header(header::USER_AGENT, USER_AGENT)
            .form(&form)
            .send()
            .await?;
        let body = response.text().await?;

        // Markup instead of JSON means the anti-bot layer served a block
        // page; the caller should rotate its transport.
        if body.as_bytes().first() == Some(&b'<') {
            return Err(IcpError::AntiBotBlocked {
                preview: preview(&body),
            });
        }

        let auth: AuthResponse =
            serde_json::from_str(&body).map_err(|e| IcpError::MalformedResponse {
                detail: e.to_string(),
                body: body.clone(),
            })?;
        if auth.code != 200 {
            return Err(IcpError::AuthRejected(auth.msg));
        }
        let params = auth.params.ok_or_else(|| IcpError::MalformedResponse {
            detail: "missing params in auth response".to_string(),
            body: body.clone(),
        })?;

        let expire_ms = match params.expire {
            Some(ms) if ms > 0 => ms,
            _ => DEFAULT_EXPIRE_MS,
        };
        Ok(Credential {
            token: params.token,
            sign: params.sign,
            expires_at: chrono::Utc::now().timestamp() + expire_ms / 1000,
        })
    }
}

#[async_trait]
impl CredentialProvider for TokenManager {
    async fn ensure(&mut self) -> Result<Credential> {
        let now = chrono::Utc::now().timestamp();
        if let Some(cred) = &self.cached {
            if cred.is_fresh(now) {
                return Ok(cred.clone());
            }
        }

        let cred = self.fetch().await?;
        tracing::debug!("credential refreshed, expires at {}", cred.expires_at);
        self.cached = Some(cred.clone());
        Ok(cred)
    }

    fn invalidate(&mut self) {
        self.cached = None;
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > PREVIEW_CHARS {
        let head: String = body.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
