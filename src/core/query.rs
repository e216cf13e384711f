use crate::core::{REFERER, USER_AGENT};
use crate::domain::model::Category;
use crate::domain::ports::{CredentialProvider, RegistryLookup};
use crate::utils::error::{IcpError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

const QUERY_URL: &str =
    "https://hlwicpfwc.miit.gov.cn/icpproject_query/api/icpAbbreviateInfo/queryByCondition/";

/// Inner recovery bound: one retry after a stale-token response, nothing
/// more. The outer resilience retry lives in [`crate::core::retry`].
const TOKEN_ATTEMPTS: u32 = 2;

const AUTH_FAILURE_CODE: i64 = 401;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    unit_name: &'a str,
    page_num: u32,
    page_size: u32,
    service_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    params: QueryParams,
}

#[derive(Debug, Default, Deserialize)]
struct QueryParams {
    #[serde(default)]
    list: Vec<QueryHit>,
}

#[derive(Debug, Deserialize)]
struct QueryHit {
    #[serde(default)]
    domain: String,
    #[serde(default, rename = "serviceName")]
    service_name: String,
}

/// Issues one authenticated lookup per call, recovering in place from a
/// stale credential by invalidating the cache and retrying once.
pub struct QueryEngine<C: CredentialProvider> {
    credentials: C,
    client: Client,
    query_url: String,
}

impl<C: CredentialProvider> QueryEngine<C> {
    pub fn new(credentials: C, client: Client) -> Self {
        Self::with_endpoint(credentials, client, QUERY_URL)
    }

    /// Endpoint override used by tests to point at a mock server.
    pub fn with_endpoint(credentials: C, client: Client, query_url: impl Into<String>) -> Self {
        Self {
            credentials,
            client,
            query_url: query_url.into(),
        }
    }

    /// Best-effort stale-token detection: the explicit 401 code, or a
    /// non-success status whose message mentions the token. The substring
    /// check tracks upstream wording and may lag behind it.
    fn is_token_failure(code: i64, msg: &str) -> bool {
        code == AUTH_FAILURE_CODE || (code != 200 && msg.contains("token"))
    }
}

#[async_trait]
impl<C: CredentialProvider> RegistryLookup for QueryEngine<C> {
    async fn lookup(&mut self, target: &str, category: Category) -> Result<Vec<String>> {
        for _ in 0..TOKEN_ATTEMPTS {
            let cred = self.credentials.ensure().await?;
            let request = QueryRequest {
                unit_name: target,
                page_num: 1,
                page_size: 10,
                service_type: category.service_type(),
            };

            let response = self
                .client
                .post(&self.query_url)
                .header("Token", &cred.token)
                .header("Sign", &cred.sign)
                .header(header::REFERER, REFERER)
                .header(header::USER_AGENT, USER_AGENT)
                .json(&request)
                .send()
                .await?;
            let body = response.text().await?;
            let parsed: QueryResponse =
                serde_json::from_str(&body).map_err(|e| IcpError::MalformedResponse {
                    detail: e.to_string(),
                    body,
                })?;

            if Self::is_token_failure(parsed.code, &parsed.msg) {
                tracing::debug!(
                    "stale credential reported by upstream (code {}), refreshing",
                    parsed.code
                );
                self.credentials.invalidate();
                continue;
            }
            if parsed.code != 200 {
                return Err(IcpError::QueryRejected(parsed.msg));
            }

            let matches = parsed
                .params
                .list
                .into_iter()
                .map(|hit| match category {
                    Category::Website => hit.domain,
                    _ => hit.service_name,
                })
                .collect();
            return Ok(matches);
        }

        Err(IcpError::TokenRetriesExhausted)
    }
}
