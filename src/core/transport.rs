use crate::utils::error::{IcpError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Builds the HTTP client used for every upstream request.
///
/// `None` yields a direct client; `http://`, `https://` and `socks5://`
/// URLs yield a proxied client. Any other scheme is a configuration error.
pub fn build_client(proxy: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

    if let Some(proxy_url) = proxy {
        let parsed = Url::parse(proxy_url).map_err(|e| IcpError::Config {
            message: format!("invalid proxy URL '{}': {}", proxy_url, e),
        })?;
        match parsed.scheme() {
            "http" | "https" | "socks5" => {
                let proxy = reqwest::Proxy::all(proxy_url)?;
                builder = builder.proxy(proxy);
            }
            scheme => {
                return Err(IcpError::Config {
                    message: format!("unsupported proxy scheme: {}", scheme),
                });
            }
        }
        tracing::debug!("using proxy: {}", proxy_url);
    }

    Ok(builder.build()?)
}
