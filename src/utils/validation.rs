use crate::utils::error::{IcpError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IcpError::Config {
            message: format!("{}: value cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

pub fn validate_proxy_url(field_name: &str, proxy: &str) -> Result<()> {
    match url::Url::parse(proxy) {
        Ok(u) => match u.scheme() {
            "http" | "https" | "socks5" => Ok(()),
            scheme => Err(IcpError::Config {
                message: format!("{}: unsupported proxy scheme: {}", field_name, scheme),
            }),
        },
        Err(e) => Err(IcpError::Config {
            message: format!("{}: invalid proxy URL '{}': {}", field_name, proxy, e),
        }),
    }
}
