//! Proxy descriptor
//!
//! One outbound proxy: endpoint, optional credentials and the local-bypass
//! flag. `Display` renders the redacted form used in every log line.

use crate::{Error, Result};
use reqwest::{NoProxy, Url};
use std::fmt;

/// Destinations that skip the proxy when `bypass_local` is set.
const LOCAL_DESTINATIONS: &str = "localhost,127.0.0.1,::1";

/// Immutable proxy descriptor
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyDescriptor {
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
    bypass_local: bool,
}

impl ProxyDescriptor {
    /// Parse a proxy endpoint such as `http://proxy.example.com:8080`
    ///
    /// The URI must carry a host and either an explicit port or a scheme
    /// with a well-known default port.
    pub fn parse(uri: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidProxyUri {
            uri: uri.to_string(),
            reason,
        };

        let mut endpoint = Url::parse(uri.trim()).map_err(|e| invalid(e.to_string()))?;
        if endpoint.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if endpoint.port_or_known_default().is_none() {
            return Err(invalid(format!(
                "no port given and scheme {} has no default",
                endpoint.scheme()
            )));
        }

        // Credentials embedded in the URI move into the descriptor fields.
        let username = Some(endpoint.username().to_string()).filter(|u| !u.is_empty());
        let password = endpoint.password().map(str::to_string).filter(|p| !p.is_empty());
        if endpoint.set_username("").is_err() || endpoint.set_password(None).is_err() {
            return Err(invalid("cannot strip credentials".to_string()));
        }

        Ok(Self {
            endpoint,
            username,
            password,
            bypass_local: true,
        })
    }

    /// With username (ignored when empty)
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        if !username.is_empty() {
            self.username = Some(username);
        }
        self
    }

    /// With password (ignored when empty)
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        if !password.is_empty() {
            self.password = Some(password);
        }
        self
    }

    /// Proxy endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint scheme
    pub fn scheme(&self) -> &str {
        self.endpoint.scheme()
    }

    /// Endpoint host
    pub fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or_default()
    }

    /// Endpoint port (explicit or scheme default)
    pub fn port(&self) -> u16 {
        self.endpoint.port_or_known_default().unwrap_or_default()
    }

    /// Username, if configured
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Password, if configured
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Whether any credential is attached
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    /// Whether loopback destinations skip the proxy
    pub fn bypass_local(&self) -> bool {
        self.bypass_local
    }

    /// `scheme://[username@]host:port`, never including the password
    pub fn redacted(&self) -> String {
        self.to_string()
    }

    /// Convert into a proxy for the underlying HTTP client
    ///
    /// Credentials are sent together as basic auth; a missing half is sent
    /// as an empty string.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy> {
        let mut proxy = reqwest::Proxy::all(self.endpoint.clone())
            .map_err(|e| Error::Http(format!("Failed to create proxy {}: {}", self, e)))?;

        if self.has_credentials() {
            proxy = proxy.basic_auth(
                self.username().unwrap_or_default(),
                self.password().unwrap_or_default(),
            );
        }

        if self.bypass_local {
            proxy = proxy.no_proxy(NoProxy::from_string(LOCAL_DESTINATIONS));
        }

        Ok(proxy)
    }
}

impl fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme())?;
        if let Some(username) = &self.username {
            write!(f, "{}@", username)?;
        }
        write!(f, "{}:{}", self.host(), self.port())
    }
}

impl fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDescriptor")
            .field("endpoint", &self.to_string())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("bypass_local", &self.bypass_local)
            .finish()
    }
}
