use super::auth::AuthenticationError;

/// Errors returned by the [`ClientBuilder`](super::ClientBuilder) before any request is sent.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ClientBuildError {
    /// Host, port and base route do not form a valid URL.
    #[display("Invalid base URL '{url}': {error}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The URL assembled from the builder configuration.
        url: String,
        /// The parse failure.
        error: url::ParseError,
    },

    /// A default header has an invalid name.
    #[display("Invalid header name '{name}': {error}")]
    #[from(skip)]
    InvalidHeaderName {
        /// The rejected header name.
        name: String,
        /// The underlying error.
        error: http::header::InvalidHeaderName,
    },

    /// A default header has an invalid value.
    #[display("Invalid value for header '{name}': {error}")]
    #[from(skip)]
    InvalidHeaderValue {
        /// The header name.
        name: String,
        /// The underlying error.
        error: http::header::InvalidHeaderValue,
    },

    /// The credentials cannot be turned into a header.
    #[display("{_0}")]
    Authentication(AuthenticationError),

    /// An authorization or header factory returned nothing.
    #[display("The {factory} factory did not produce a value")]
    #[from(skip)]
    MissingFactoryValue {
        /// Which factory failed.
        factory: &'static str,
    },

    /// The `reqwest` client could not be built.
    #[display("Failed to build the HTTP client: {_0}")]
    Reqwest(reqwest::Error),
}
