use thiserror::Error;

#[derive(Error, Debug)]
pub enum IcpError {
    #[error("upstream returned an HTML page instead of JSON, the current IP is likely blocked: {preview}")]
    AntiBotBlocked { preview: String },

    #[error("unexpected response shape: {detail}; body: {body}")]
    MalformedResponse { detail: String, body: String },

    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("query rejected: {0}")]
    QueryRejected(String),

    #[error("token refresh attempts exhausted")]
    TokenRetriesExhausted,

    #[error("query failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<IcpError>,
    },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IcpError>;
