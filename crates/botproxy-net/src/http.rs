//! HTTP client factory
//!
//! Builds the reqwest client an HTTP wrapper uses, honouring the (possibly
//! overridden) proxy parameter.

use crate::identity::Identity;
use crate::{Error, ProxyDescriptor, ProxyProvider, Result};
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const EXTENDED_TIMEOUT: Duration = Duration::from_secs(120);

/// Factory for per-identity HTTP clients
pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Request timeout for the given mode
    pub fn timeout(extended_timeout: bool) -> Duration {
        if extended_timeout {
            EXTENDED_TIMEOUT
        } else {
            DEFAULT_TIMEOUT
        }
    }

    /// Build a client that goes through `proxy`, or direct when `None`
    pub fn build(proxy: Option<&ProxyDescriptor>, extended_timeout: bool) -> Result<reqwest::Client> {
        let mut client_builder = reqwest::Client::builder().timeout(Self::timeout(extended_timeout));

        match proxy {
            Some(proxy) => {
                debug!("Creating HTTP client with proxy: {}", proxy);
                client_builder = client_builder.proxy(proxy.to_reqwest_proxy()?);
            }
            None => {
                debug!("Creating HTTP client without proxy");
                client_builder = client_builder.no_proxy();
            }
        }

        client_builder
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))
    }

    /// Build a client for an explicitly named identity
    pub fn for_identity(
        provider: &dyn ProxyProvider,
        identity: &Identity,
        extended_timeout: bool,
    ) -> Result<reqwest::Client> {
        let proxy = provider.proxy_for(identity.as_str());
        Self::build(proxy.as_ref(), extended_timeout)
    }
}
