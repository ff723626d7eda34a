use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown style '{0}'")]
pub struct UnknownStyle(pub String);

/// Sign-in failures. The controller logs these and leaves session state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("sign-in cancelled by user")]
    Cancelled,
    #[error("identity provider is unavailable")]
    Unavailable,
    #[error("identity provider rejected sign-in ({status}): {message}")]
    Provider { status: u16, message: String },
    #[error("identity provider unreachable: {0}")]
    Transport(String),
    #[error("malformed identity provider response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("style transfer network failure: {0}")]
    Network(String),
    #[error("style transfer service returned HTTP {status}")]
    Status { status: u16 },
    #[error("malformed style transfer response: {0}")]
    Malformed(String),
    #[error("style transfer timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },
    #[error("missing required configuration value: {0}")]
    MissingField(&'static str),
    #[error("invalid configuration value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageSourceError {
    #[error("cannot resolve current directory for '{0}'")]
    CurrentDir(String),
    #[error("path '{0}' cannot be represented as a file URL")]
    Unrepresentable(String),
}
