//! Per-bot proxy injection
//!
//! Gives every bot running inside one host process its own outbound proxy.
//! A registry built from per-bot configuration documents is consulted
//! whenever the host constructs a duplex connection or an HTTP client, and
//! the proxy of the new connection is overridden before it is used.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod identity;
pub mod interceptor;
pub mod plugin;
pub mod proxy;
pub mod registry;

// Re-export main types
pub use config::{GlobalConfig, ProxySettings, TransportProtocols, GLOBAL_CONFIG_FILE};
pub use error::{Error, Result};
pub use host::{
    ConnectionHooks, HookPoints, HostClient, HostConnection, HostLogger, NamedLogger, SocketOptions,
};
pub use http::HttpClientFactory;
pub use identity::{resolve_from_connection, resolve_from_logger, Identity};
pub use interceptor::ProxyInterceptor;
pub use plugin::ProxyInjectionPlugin;
pub use proxy::ProxyDescriptor;
pub use registry::{ProxyProvider, ProxyRegistry};
