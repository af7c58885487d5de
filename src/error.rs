use thiserror::Error;

/// Failures talking to the loan service.
///
/// An application-level rejection (`success: false`) is not a `GatewayError`;
/// it comes back as a regular [`PaymentUpdate`](crate::PaymentUpdate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(String),
    /// The GraphQL layer reported errors.
    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    /// `data` or one of its fields was null or absent.
    #[error("response is missing `{0}`")]
    MissingData(&'static str),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Form input that could not be turned into a [`PaymentSubmission`](crate::PaymentSubmission).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("loan id must be a whole number, got {0:?}")]
    LoanId(String),
    #[error("payment amount must be a number, got {0:?}")]
    Amount(String),
    #[error("payment date must look like YYYY-MM-DD, got {0:?}")]
    PaymentDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid number of seconds: {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("endpoint must not be empty")]
    EmptyEndpoint,
}
