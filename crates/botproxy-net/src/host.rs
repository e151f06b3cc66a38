//! Host extension points
//!
//! The host owns its connection objects; these traits expose just enough of
//! their layout for identity resolution, plus the two construction-time hooks.

use crate::ProxyDescriptor;
use std::sync::Arc;

/// Client instance that owns a duplex connection
pub trait HostClient {
    /// Client ID (the identity name)
    fn id(&self) -> Option<&str>;
}

/// Duplex connection being wrapped by a connection context
pub trait HostConnection {
    /// Client that owns this connection
    fn owning_client(&self) -> Option<&dyn HostClient>;
}

/// Underlying named logger
pub trait NamedLogger {
    /// Logger name (the identity name)
    fn name(&self) -> Option<&str>;
}

/// Logger handed to the HTTP client wrapper
pub trait HostLogger {
    /// Wrapped named logger
    fn inner(&self) -> Option<&dyn NamedLogger>;
}

/// Options of the duplex connection's underlying socket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketOptions {
    proxy: Option<ProxyDescriptor>,
}

impl SocketOptions {
    /// Options with a preset proxy
    pub fn with_proxy(proxy: Option<ProxyDescriptor>) -> Self {
        Self { proxy }
    }

    /// Proxy the socket will connect through
    pub fn proxy(&self) -> Option<&ProxyDescriptor> {
        self.proxy.as_ref()
    }

    /// Override the proxy
    pub fn set_proxy(&mut self, proxy: ProxyDescriptor) {
        self.proxy = Some(proxy);
    }
}

/// Construction-time injection points
pub trait ConnectionHooks: Send + Sync {
    /// Fired after the duplex connection context is constructed
    fn after_duplex_context(&self, connection: &dyn HostConnection, socket: &mut SocketOptions);

    /// Fired before the HTTP client wrapper is constructed
    ///
    /// `proxy` is the parameter the host is about to use and may be replaced.
    fn before_http_client(
        &self,
        logger: &dyn HostLogger,
        proxy: &mut Option<ProxyDescriptor>,
        extended_timeout: bool,
    );
}

/// Hooks installed into the host's construction paths
#[derive(Default, Clone)]
pub struct HookPoints {
    hooks: Vec<Arc<dyn ConnectionHooks>>,
}

impl HookPoints {
    /// Create with no hooks installed
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook
    pub fn register(&mut self, hooks: Arc<dyn ConnectionHooks>) {
        self.hooks.push(hooks);
    }

    /// Whether nothing is installed
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Number of installed hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run the post-construction hooks of a duplex connection context
    pub fn fire_duplex_context(&self, connection: &dyn HostConnection, socket: &mut SocketOptions) {
        for hooks in &self.hooks {
            hooks.after_duplex_context(connection, socket);
        }
    }

    /// Run the pre-construction hooks of an HTTP client wrapper
    pub fn fire_http_client(
        &self,
        logger: &dyn HostLogger,
        proxy: &mut Option<ProxyDescriptor>,
        extended_timeout: bool,
    ) {
        for hooks in &self.hooks {
            hooks.before_http_client(logger, proxy, extended_timeout);
        }
    }
}

impl std::fmt::Debug for HookPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookPoints")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
