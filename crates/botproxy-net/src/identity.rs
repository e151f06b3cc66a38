//! Identity resolution
//!
//! Recovers the identity name from host objects at connection time. This is
//! the only code that depends on the host's object layout.

use crate::host::{HostConnection, HostLogger};
use crate::{Error, Result};
use std::borrow::Borrow;
use std::fmt;

/// Name of one client instance; the registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Create from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identity of the client owning a duplex connection
pub fn resolve_from_connection(connection: &dyn HostConnection) -> Result<Identity> {
    let client = connection
        .owning_client()
        .ok_or_else(|| Error::Identity("connection has no owning client".to_string()))?;

    non_empty(client.id(), "client has no ID")
}

/// Identity behind the logger handed to an HTTP client wrapper
pub fn resolve_from_logger(logger: &dyn HostLogger) -> Result<Identity> {
    let inner = logger
        .inner()
        .ok_or_else(|| Error::Identity("logger has no inner logger".to_string()))?;

    non_empty(inner.name(), "logger has no name")
}

fn non_empty(name: Option<&str>, missing: &str) -> Result<Identity> {
    match name {
        Some(name) if !name.is_empty() => Ok(Identity::new(name)),
        _ => Err(Error::Identity(missing.to_string())),
    }
}
