use std::path::PathBuf;

use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key was configured when a request was about to be sent.
    #[error(
        "Missing configuration: key (set TESTINY_APIKEY, pass a key or put `key:` in .testinyrc)"
    )]
    MissingCredential,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Project '{0}' was not found")]
    ProjectNotFound(String),

    #[error("Test run '{0}' was not found")]
    TestRunNotFound(String),

    /// The service answered with HTTP >= 400. Only the service message is displayed.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("the API key was not accepted by the Testiny service (not logged in)")]
    NotLoggedIn,

    #[error("failed to read configuration file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not connect: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct TestinyErrorResponse {
    #[serde(default)]
    pub(crate) message: Option<Value>,
}

impl TestinyErrorResponse {
    pub(crate) fn into_error(self, status: u16) -> Error {
        // Some error bodies carry a structured message; keep its JSON text.
        let message = match self.message {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Error::Api { status, message }
    }
}

/// Maps an error response body to an [`Error`].
///
/// A body that is not JSON at all yields [`Error::InvalidResponse`].
pub(crate) fn error_from_body(status: u16, body: &str) -> Error {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(v) => v,
        Err(e) => return Error::InvalidResponse(e),
    };
    // Bodies that are valid JSON but not an object carry no message.
    let parsed = match value {
        Value::Object(_) => serde_json::from_value::<TestinyErrorResponse>(value).ok(),
        _ => None,
    };
    parsed
        .unwrap_or(TestinyErrorResponse { message: None })
        .into_error(status)
}
