use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Header used by [`Authentication::ApiKey`] when no header name is given.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Credentials that cannot be sent as an HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// The bearer token is not a valid header value.
    #[display("invalid bearer token: {reason}")]
    InvalidBearerToken {
        /// Why the token was rejected.
        reason: String,
    },

    /// The Basic username contains a `:` or a forbidden character.
    #[display("invalid username '{username}': {reason}")]
    InvalidUsername {
        /// The rejected username.
        username: String,
        /// Why the username was rejected.
        reason: String,
    },

    /// The encoded Basic credentials are not a valid header value.
    #[display("invalid password: {reason}")]
    InvalidPassword {
        /// Why the password was rejected.
        reason: String,
    },

    /// The API key header name is not a valid header name.
    #[display("invalid API key header '{header_name}': {reason}")]
    InvalidHeaderName {
        /// The rejected header name.
        header_name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// The API key is not a valid header value.
    #[display("invalid API key: {reason}")]
    InvalidApiKey {
        /// Why the key was rejected.
        reason: String,
    },
}

/// A secret cleared from memory on drop.
///
/// `Debug` never shows it; `Display` shows at most its first and last four characters.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret in clear.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chars = self.0.chars().count();
        if chars <= 8 {
            return f.write_str("***");
        }
        let head = self.0.chars().take(4).collect::<String>();
        let tail = self.0.chars().skip(chars - 4).collect::<String>();
        write!(f, "{head}...{tail}")
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Authentication attached to every request of an [`HttpClient`](crate::HttpClient).
///
/// ```rust
/// use courier_core::Authentication;
///
/// let auth = Authentication::Basic {
///     username: "user".to_string(),
///     password: "pass".into(),
/// };
/// let (name, value) = auth.to_header()?;
/// assert_eq!(name, "authorization");
/// assert_eq!(value, "Basic dXNlcjpwYXNz");
/// # Ok::<(), courier_core::AuthenticationError>(())
/// ```
#[derive(Clone)]
pub enum Authentication {
    /// `Authorization: Bearer <token>`.
    Bearer(SecureString),

    /// `Authorization: Basic <base64(username:password)>`.
    Basic {
        /// The username, which must not contain `:`.
        username: String,
        /// The password.
        password: SecureString,
    },

    /// `<header_name>: <key>`.
    ApiKey {
        /// The header carrying the key.
        header_name: String,
        /// The key.
        key: SecureString,
    },
}

impl Authentication {
    /// An API key sent in the [`DEFAULT_API_KEY_HEADER`].
    pub fn api_key(key: impl Into<SecureString>) -> Self {
        Self::ApiKey {
            header_name: DEFAULT_API_KEY_HEADER.to_owned(),
            key: key.into(),
        }
    }

    /// The header to add to every request.
    ///
    /// # Errors
    ///
    /// Fails when a credential cannot be encoded as a header name or value.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        match self {
            Self::Bearer(token) => {
                let value = sensitive_value(&format!("Bearer {}", token.as_str()))
                    .map_err(|reason| AuthenticationError::InvalidBearerToken { reason })?;
                Ok((AUTHORIZATION, value))
            }
            Self::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::InvalidUsername {
                        username: username.clone(),
                        reason: "':' separates username and password".to_owned(),
                    });
                }
                let mut credentials = format!("{username}:{}", password.as_str());
                let encoded = STANDARD.encode(&credentials);
                credentials.zeroize();
                let value = sensitive_value(&format!("Basic {encoded}"))
                    .map_err(|reason| AuthenticationError::InvalidPassword { reason })?;
                Ok((AUTHORIZATION, value))
            }
            Self::ApiKey { header_name, key } => {
                let name = HeaderName::try_from(header_name.as_str()).map_err(|error| {
                    AuthenticationError::InvalidHeaderName {
                        header_name: header_name.clone(),
                        reason: error.to_string(),
                    }
                })?;
                let value = sensitive_value(key.as_str())
                    .map_err(|reason| AuthenticationError::InvalidApiKey { reason })?;
                Ok((name, value))
            }
        }
    }
}

fn sensitive_value(raw: &str) -> Result<HeaderValue, String> {
    let mut value = HeaderValue::from_str(raw).map_err(|error| error.to_string())?;
    value.set_sensitive(true);
    Ok(value)
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
            Self::Basic { username, password } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", password)
                .finish(),
            Self::ApiKey { header_name, key } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", key)
                .finish(),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "Bearer {token}"),
            Self::Basic { username, .. } => write!(f, "Basic {username}:***"),
            Self::ApiKey { header_name, key } => write!(f, "{header_name}: {key}"),
        }
    }
}
