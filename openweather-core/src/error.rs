use thiserror::Error;

/// Failure raised by a [`Transport`](crate::transport::Transport) while fetching a URL.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors returned by the client and the response normalizers.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The provider rejected the request (bad key, unknown city, ...).
    #[error("OpenWeather rejected the request with code {code}: {body}")]
    Api { code: i64, body: String },

    #[error("response body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON that lacks a field the normalizer needs.
    #[error("unexpected response shape: {0}")]
    Schema(String),

    #[error("invalid value: {0}")]
    Value(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`WeatherError`], for callers deciding whether
/// to retry, prompt the user or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Api,
    Parse,
    Value,
    Config,
}

impl WeatherError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WeatherError::Transport(_) => FailureKind::Transport,
            WeatherError::Api { .. } => FailureKind::Api,
            WeatherError::Parse(_) | WeatherError::Schema(_) => FailureKind::Parse,
            WeatherError::Value(_) => FailureKind::Value,
            WeatherError::Config(_) => FailureKind::Config,
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        WeatherError::Schema(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        WeatherError::Config(message.into())
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
