use std::marker::PhantomData;
use std::sync::Arc;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use url::Url;

use super::{Authentication, ClientBuildError, HttpClient, HttpScheme, SecureString};
use crate::client::transport::{ReqwestTransport, Transport};

/// Staged builder for [`HttpClient`].
///
/// Every stage wraps the same configuration. The stage type parameter only restricts
/// which methods can be called next, so the order is enforced at compile time:
///
/// 1. host ([`HostStage`]);
/// 2. base route ([`RouteStage`]);
/// 3. authorization ([`AuthorizationStage`]), optional;
/// 4. transport ([`OptionsStage`]), optional;
/// 5. default headers ([`HeaderStage`]), optional;
/// 6. `build`, `build_with` or `build_from`.
///
/// # Example
///
/// ```rust
/// use courier_core::{HttpClient, HttpScheme};
///
/// # fn example() -> Result<(), courier_core::ClientBuildError> {
/// let client = HttpClient::builder()
///     .with_host("api.example.com", HttpScheme::Https, Some(8443))
///     .with_base_route("v1")
///     .with_bearer_token("my-token")
///     .with_header("x-tenant", "acme")
///     .build()?;
///
/// assert_eq!(client.base_url().as_str(), "https://api.example.com:8443/v1/");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder<S = HostStage> {
    config: BuilderConfiguration,
    stage: PhantomData<S>,
}

#[derive(Debug, Default)]
struct BuilderConfiguration {
    scheme: HttpScheme,
    host: String,
    port: Option<u16>,
    base_route: String,
    authentication: Option<Authentication>,
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
}

/// First stage: the host is not configured yet.
#[derive(Debug)]
pub struct HostStage;

/// The host is configured; the base route comes next.
#[derive(Debug)]
pub struct RouteStage;

/// The base route is configured; authorization comes next.
#[derive(Debug)]
pub struct AuthorizationStage;

/// Authorization is configured; a custom transport may come next.
#[derive(Debug)]
pub struct OptionsStage;

/// Default headers are being added.
#[derive(Debug)]
pub struct HeaderStage;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::RouteStage {}
    impl Sealed for super::AuthorizationStage {}
    impl Sealed for super::OptionsStage {}
    impl Sealed for super::HeaderStage {}
}

/// Stages where authorization can be configured.
pub trait CanAuthorize: sealed::Sealed {}
impl CanAuthorize for RouteStage {}
impl CanAuthorize for AuthorizationStage {}

/// Stages where the transport can be replaced.
pub trait CanSelectTransport: sealed::Sealed {}
impl CanSelectTransport for RouteStage {}
impl CanSelectTransport for AuthorizationStage {}
impl CanSelectTransport for OptionsStage {}

/// Stages where default headers can be added.
pub trait CanAddHeaders: sealed::Sealed {}
impl CanAddHeaders for RouteStage {}
impl CanAddHeaders for AuthorizationStage {}
impl CanAddHeaders for OptionsStage {}
impl CanAddHeaders for HeaderStage {}

/// Stages where the client can be built.
pub trait CanBuild: sealed::Sealed {}
impl CanBuild for RouteStage {}
impl CanBuild for AuthorizationStage {}
impl CanBuild for OptionsStage {}
impl CanBuild for HeaderStage {}

impl ClientBuilder<HostStage> {
    /// Starts a new builder.
    pub fn create() -> Self {
        Self {
            config: BuilderConfiguration::default(),
            stage: PhantomData,
        }
    }

    /// Sets the host, the scheme and, optionally, the port.
    ///
    /// Without a port, the scheme default is used (80 or 443).
    pub fn with_host(
        mut self,
        host: impl Into<String>,
        scheme: HttpScheme,
        port: Option<u16>,
    ) -> ClientBuilder<RouteStage> {
        self.config.host = host.into();
        self.config.scheme = scheme;
        self.config.port = port;
        self.into_stage()
    }
}

impl ClientBuilder<RouteStage> {
    /// Sets the route every request path is relative to.
    ///
    /// The route is normalized with a leading and a trailing `/`.
    pub fn with_base_route(mut self, route: impl AsRef<str>) -> ClientBuilder<AuthorizationStage> {
        self.config.base_route = normalize_base_route(route.as_ref());
        self.into_stage()
    }
}

impl<S> ClientBuilder<S>
where
    S: CanAuthorize,
{
    /// Uses HTTP Basic authentication.
    pub fn with_basic_authorization(
        self,
        username: impl Into<String>,
        password: impl Into<SecureString>,
    ) -> ClientBuilder<OptionsStage> {
        self.with_authentication(Authentication::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    /// Uses a bearer token.
    pub fn with_bearer_token(self, token: impl Into<SecureString>) -> ClientBuilder<OptionsStage> {
        self.with_authentication(Authentication::Bearer(token.into()))
    }

    /// Sends an API key in the `x-api-key` header.
    pub fn with_api_key_header(self, key: impl Into<SecureString>) -> ClientBuilder<OptionsStage> {
        self.with_authentication(Authentication::api_key(key))
    }

    /// Sends an API key in a custom header.
    pub fn with_api_key_header_named(
        self,
        header_name: impl Into<String>,
        key: impl Into<SecureString>,
    ) -> ClientBuilder<OptionsStage> {
        self.with_authentication(Authentication::ApiKey {
            header_name: header_name.into(),
            key: key.into(),
        })
    }

    /// Uses the given authentication.
    pub fn with_authentication(
        mut self,
        authentication: Authentication,
    ) -> ClientBuilder<OptionsStage> {
        self.config.authentication = Some(authentication);
        self.into_stage()
    }

    /// Uses the authentication produced by `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::MissingFactoryValue`] if the factory returns `None`.
    pub fn with_authorization_factory<F>(
        self,
        factory: F,
    ) -> Result<ClientBuilder<OptionsStage>, ClientBuildError>
    where
        F: FnOnce() -> Option<Authentication>,
    {
        let authentication = factory().ok_or(ClientBuildError::MissingFactoryValue {
            factory: "authorization",
        })?;
        Ok(self.with_authentication(authentication))
    }
}

impl<S> ClientBuilder<S>
where
    S: CanSelectTransport,
{
    /// Sends requests through a custom transport.
    pub fn with_transport(mut self, transport: impl Transport) -> ClientBuilder<HeaderStage> {
        self.config.transport = Some(Arc::new(transport));
        self.into_stage()
    }

    /// Sends requests through the `reqwest` client produced by `factory`.
    pub fn with_reqwest_client<F>(self, factory: F) -> ClientBuilder<HeaderStage>
    where
        F: FnOnce() -> reqwest::Client,
    {
        self.with_transport(ReqwestTransport::new(factory()))
    }
}

impl<S> ClientBuilder<S>
where
    S: CanAddHeaders,
{
    /// Adds a header sent with every request.
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> ClientBuilder<HeaderStage> {
        self.config.headers.push((name.into(), value.into()));
        self.into_stage()
    }

    /// Adds the header produced by `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::MissingFactoryValue`] if the factory returns `None`.
    pub fn with_header_factory<F>(
        self,
        factory: F,
    ) -> Result<ClientBuilder<HeaderStage>, ClientBuildError>
    where
        F: FnOnce() -> Option<(String, String)>,
    {
        let (name, value) =
            factory().ok_or(ClientBuildError::MissingFactoryValue { factory: "header" })?;
        Ok(self.with_header(name, value))
    }
}

impl<S> ClientBuilder<S>
where
    S: CanBuild,
{
    /// Builds the client.
    ///
    /// Without a custom transport, a default `reqwest` client is used.
    ///
    /// # Errors
    ///
    /// Fails if the base URL, a default header or the credentials are invalid, or if the
    /// `reqwest` client cannot be built.
    pub fn build(mut self) -> Result<HttpClient, ClientBuildError> {
        let transport = match self.config.transport.take() {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(reqwest::Client::builder().build()?)),
        };
        self.config.finish(transport)
    }

    /// Builds the client on a `reqwest` client configured by `configure`.
    ///
    /// A transport set with [`with_transport`](ClientBuilder::with_transport) is replaced.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with<F>(self, configure: F) -> Result<HttpClient, ClientBuildError>
    where
        F: FnOnce(reqwest::ClientBuilder) -> reqwest::ClientBuilder,
    {
        let client = configure(reqwest::Client::builder()).build()?;
        self.config
            .finish(Arc::new(ReqwestTransport::new(client)))
    }

    /// Builds the client on the `reqwest` client produced by `factory`.
    ///
    /// # Errors
    ///
    /// Fails if the base URL, a default header or the credentials are invalid.
    pub fn build_from<F>(self, factory: F) -> Result<HttpClient, ClientBuildError>
    where
        F: FnOnce() -> reqwest::Client,
    {
        self.config
            .finish(Arc::new(ReqwestTransport::new(factory())))
    }
}

impl<S> ClientBuilder<S> {
    fn into_stage<N>(self) -> ClientBuilder<N> {
        ClientBuilder {
            config: self.config,
            stage: PhantomData,
        }
    }
}

impl BuilderConfiguration {
    fn finish(self, transport: Arc<dyn Transport>) -> Result<HttpClient, ClientBuildError> {
        let Self {
            scheme,
            host,
            port,
            base_route,
            authentication,
            headers,
            transport: _,
        } = self;

        let port = port.unwrap_or(scheme.default_port());
        let base_route = if base_route.is_empty() {
            "/"
        } else {
            base_route.as_str()
        };
        let url = format!("{scheme}://{host}:{port}{base_route}");
        let base_url =
            Url::parse(&url).map_err(|error| ClientBuildError::InvalidBaseUrl { url, error })?;

        let mut default_headers = HeaderMap::with_capacity(headers.len() + 1);
        for (name, value) in headers {
            let header_value = HeaderValue::from_str(&value).map_err(|error| {
                ClientBuildError::InvalidHeaderValue {
                    name: name.clone(),
                    error,
                }
            })?;
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|error| ClientBuildError::InvalidHeaderName { name, error })?;
            default_headers.append(header_name, header_value);
        }
        if let Some(authentication) = &authentication {
            let (name, value) = authentication.to_header()?;
            default_headers.insert(name, value);
        }

        Ok(HttpClient {
            transport,
            base_url,
            authentication,
            default_headers,
        })
    }
}

fn normalize_base_route(route: &str) -> String {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
