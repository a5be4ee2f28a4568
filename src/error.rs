use thiserror::Error;

/// Failures talking to the card catalog.
///
/// These never reach callers of the resolver: the fetcher logs them and
/// treats the affected batch as having no candidates.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The query would carry no usable clause, so nothing is sent.
    #[error("query has no usable clauses")]
    AmbiguousInput,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        source: url::ParseError,
    },

    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}
