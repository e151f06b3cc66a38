//! Configuration documents
//!
//! Per-identity documents live at `<config_dir>/<identity>.json`; the
//! process-wide document is `<config_dir>/global.json`. Both use the host's
//! field names for proxy settings.

use crate::{Error, ProxyDescriptor, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Process-wide configuration document
pub const GLOBAL_CONFIG_FILE: &str = "global.json";

/// Extension of every configuration document
pub const CONFIG_EXTENSION: &str = "json";

const PROXY_FIELD: &str = "WebProxy";
const USERNAME_FIELD: &str = "WebProxyUsername";
const PASSWORD_FIELD: &str = "WebProxyPassword";

/// Read a configuration document, rejecting non UTF-8 contents
pub(crate) fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|_| Error::InvalidConfig(format!("{} is not valid UTF-8", path.display())))
}

/// Non-string values read as absent, as in per-identity documents
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// Proxy fields read from one configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy URI
    pub uri: Option<String>,
    /// Proxy username
    pub username: Option<String>,
    /// Proxy password
    pub password: Option<String>,
}

impl ProxySettings {
    /// Extract proxy fields from a per-identity document
    ///
    /// The document must be a JSON object. Missing fields, `null` and
    /// non-string values all read as absent.
    pub fn from_document(path: &Path, text: &str) -> Result<Self> {
        let document: Value =
            serde_json::from_str(text).map_err(|source| Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let object = document.as_object().ok_or_else(|| {
            Error::InvalidConfig(format!("{} is not a JSON object", path.display()))
        })?;

        let field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            uri: field(PROXY_FIELD),
            username: field(USERNAME_FIELD),
            password: field(PASSWORD_FIELD),
        })
    }

    /// Build a descriptor
    ///
    /// `Ok(None)` when no URI is configured; an error when the URI is
    /// malformed. Empty credentials are not attached.
    pub fn to_descriptor(&self) -> Result<Option<ProxyDescriptor>> {
        let uri = match self.uri.as_deref() {
            Some(uri) if !uri.is_empty() => uri,
            _ => return Ok(None),
        };

        let mut proxy = ProxyDescriptor::parse(uri)?;
        if let Some(username) = &self.username {
            proxy = proxy.with_username(username.as_str());
        }
        if let Some(password) = &self.password {
            proxy = proxy.with_password(password.as_str());
        }

        Ok(Some(proxy))
    }
}

/// Transport protocols the host may use (bit flags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportProtocols(pub u8);

impl TransportProtocols {
    /// Plain TCP
    pub const TCP: Self = Self(1);
    /// UDP
    pub const UDP: Self = Self(2);
    /// WebSocket
    pub const WEB_SOCKET: Self = Self(4);
    /// Every protocol (host default)
    pub const ALL: Self = Self(1 | 2 | 4);

    /// Whether the host is restricted to WebSocket connections
    pub fn is_web_socket_only(&self) -> bool {
        *self == Self::WEB_SOCKET
    }
}

impl Default for TransportProtocols {
    fn default() -> Self {
        Self::ALL
    }
}

/// Process-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalConfig {
    /// Protocols the host connects with
    #[serde(default)]
    pub transport_protocols: TransportProtocols,
    /// Default proxy URI
    #[serde(default, deserialize_with = "lenient_string")]
    pub web_proxy: Option<String>,
    /// Default proxy username
    #[serde(default, deserialize_with = "lenient_string")]
    pub web_proxy_username: Option<String>,
    /// Default proxy password
    #[serde(default, deserialize_with = "lenient_string")]
    pub web_proxy_password: Option<String>,
}

impl GlobalConfig {
    /// Load `global.json` from the config directory
    ///
    /// A missing file yields the defaults.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(GLOBAL_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = read_document(&path)?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse { path, source })
    }

    /// Fallback proxy for identities without an override
    ///
    /// A malformed URI is logged and treated as no fallback.
    pub fn fallback_proxy(&self) -> Option<ProxyDescriptor> {
        let settings = ProxySettings {
            uri: self.web_proxy.clone(),
            username: self.web_proxy_username.clone(),
            password: self.web_proxy_password.clone(),
        };

        match settings.to_descriptor() {
            Ok(proxy) => proxy,
            Err(e) => {
                warn!("Ignoring global proxy: {}", e);
                None
            }
        }
    }
}
