pub mod batch;
pub mod export;
pub mod query;
pub mod retry;
pub mod targets;
pub mod token;
pub mod transport;

/// Browser-identity headers the upstream service expects to see.
pub(crate) const REFERER: &str = "https://beian.miit.gov.cn/";
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
