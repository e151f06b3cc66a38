//! Connection interceptor
//!
//! Overrides the proxy of every duplex connection and HTTP client the host
//! constructs, based on the identity that owns it.

use crate::host::{ConnectionHooks, HookPoints, HostConnection, HostLogger, SocketOptions};
use crate::identity::{resolve_from_connection, resolve_from_logger};
use crate::{GlobalConfig, ProxyDescriptor, ProxyRegistry};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Proxy injection hooks backed by a registry
#[derive(Debug, Clone)]
pub struct ProxyInterceptor {
    registry: Arc<ProxyRegistry>,
}

impl ProxyInterceptor {
    /// Create over a loaded registry
    pub fn new(registry: Arc<ProxyRegistry>) -> Self {
        Self { registry }
    }

    /// Registry consulted by the hooks
    pub fn registry(&self) -> &ProxyRegistry {
        &self.registry
    }

    /// Install the hooks if the host connects over WebSocket only
    ///
    /// Returns whether anything was installed.
    pub fn install(global: &GlobalConfig, registry: Arc<ProxyRegistry>, hooks: &mut HookPoints) -> bool {
        if !global.transport_protocols.is_web_socket_only() {
            return false;
        }

        info!("Installing proxy injection hooks...");
        hooks.register(Arc::new(Self::new(registry)));
        true
    }
}

impl ConnectionHooks for ProxyInterceptor {
    fn after_duplex_context(&self, connection: &dyn HostConnection, socket: &mut SocketOptions) {
        let identity = match resolve_from_connection(connection) {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Leaving connection proxy unchanged: {}", e);
                return;
            }
        };

        trace!(bot = %identity, "Looking up connection proxy...");
        let Some(proxy) = self.registry.resolve(identity.as_str()) else {
            return;
        };

        trace!(bot = %identity, "Injecting connection proxy {}", proxy);
        socket.set_proxy(proxy.clone());
    }

    fn before_http_client(
        &self,
        logger: &dyn HostLogger,
        proxy: &mut Option<ProxyDescriptor>,
        _extended_timeout: bool,
    ) {
        let identity = match resolve_from_logger(logger) {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Leaving HTTP client proxy unchanged: {}", e);
                return;
            }
        };

        trace!(bot = %identity, "Looking up HTTP client proxy...");
        // The host's own default already sits in `proxy`.
        let Some(replacement) = self.registry.lookup(identity.as_str()) else {
            return;
        };

        trace!(bot = %identity, "Injecting HTTP client proxy {}", replacement);
        *proxy = Some(replacement.clone());
    }
}
