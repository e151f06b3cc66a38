//! Plugin lifecycle

use crate::host::HookPoints;
use crate::{GlobalConfig, ProxyInterceptor, ProxyRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, trace};

/// Per-bot proxy injection plugin
#[derive(Debug, Default, Clone, Copy)]
pub struct ProxyInjectionPlugin;

impl ProxyInjectionPlugin {
    /// Plugin name
    pub const NAME: &'static str = "BotProxyInjection";

    /// Plugin name
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Plugin version
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Called once the host has loaded the plugin
    pub fn on_loaded(&self) {
        info!("{} v{} loaded", self.name(), self.version());
    }

    /// Called once the host has read its configuration
    ///
    /// Loads the registry and installs the hooks when the host connects over
    /// WebSocket only. Returns the installed registry, `None` when inert.
    pub fn on_init(&self, config_dir: &Path, hooks: &mut HookPoints) -> Option<Arc<ProxyRegistry>> {
        let global = match GlobalConfig::load(config_dir) {
            Ok(global) => global,
            Err(e) => {
                error!("{} disabled, failed to load global config: {}", self.name(), e);
                return None;
            }
        };

        if !global.transport_protocols.is_web_socket_only() {
            info!(
                "{} is disabled by your configuration. Set TransportProtocols to WebSocket ({}) to enable it.",
                self.name(),
                crate::TransportProtocols::WEB_SOCKET.0
            );
            return None;
        }

        trace!("Loading proxies...");
        let registry = Arc::new(ProxyRegistry::load_or_fallback(
            config_dir,
            global.fallback_proxy(),
        ));

        if !ProxyInterceptor::install(&global, Arc::clone(&registry), hooks) {
            return None;
        }

        info!("Successfully injected!");
        Some(registry)
    }
}
