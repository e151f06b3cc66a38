//! Connection interception tests
//!
//! Simulates the host firing its construction hooks for several bots.

use botproxy_net::{
    ConnectionHooks, GlobalConfig, HookPoints, HostClient, HostConnection, HostLogger, NamedLogger,
    ProxyDescriptor, ProxyInjectionPlugin, ProxyInterceptor, ProxyRegistry, SocketOptions,
    TransportProtocols,
};
use std::fs;
use std::sync::Arc;
use std::thread;

struct SteamClient {
    id: Option<String>,
}

impl HostClient for SteamClient {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

struct WebSocketConnection {
    client: Option<SteamClient>,
}

impl WebSocketConnection {
    fn for_bot(id: &str) -> Self {
        Self {
            client: Some(SteamClient {
                id: Some(id.to_string()),
            }),
        }
    }
}

impl HostConnection for WebSocketConnection {
    fn owning_client(&self) -> Option<&dyn HostClient> {
        self.client.as_ref().map(|client| client as &dyn HostClient)
    }
}

struct InnerLogger {
    name: Option<String>,
}

impl NamedLogger for InnerLogger {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

struct BotLogger {
    inner: Option<InnerLogger>,
}

impl BotLogger {
    fn for_bot(name: &str) -> Self {
        Self {
            inner: Some(InnerLogger {
                name: Some(name.to_string()),
            }),
        }
    }
}

impl HostLogger for BotLogger {
    fn inner(&self) -> Option<&dyn NamedLogger> {
        self.inner.as_ref().map(|inner| inner as &dyn NamedLogger)
    }
}

fn proxy(uri: &str) -> ProxyDescriptor {
    ProxyDescriptor::parse(uri).unwrap()
}

fn interceptor() -> ProxyInterceptor {
    let registry = ProxyRegistry::new(Some(proxy("http://pdefault:3128")))
        .with_proxy("bot1", proxy("http://p1:3128").with_username("alice"));
    ProxyInterceptor::new(Arc::new(registry))
}

#[test]
fn test_duplex_uses_identity_proxy() {
    let mut socket = SocketOptions::default();

    interceptor().after_duplex_context(&WebSocketConnection::for_bot("bot1"), &mut socket);

    assert_eq!(socket.proxy().unwrap().redacted(), "http://alice@p1:3128");
}

#[test]
fn test_duplex_falls_back_to_global_proxy() {
    let mut socket = SocketOptions::default();

    interceptor().after_duplex_context(&WebSocketConnection::for_bot("bot2"), &mut socket);

    assert_eq!(socket.proxy().unwrap().host(), "pdefault");
}

#[test]
fn test_duplex_without_any_proxy_leaves_socket_alone() {
    let interceptor = ProxyInterceptor::new(Arc::new(ProxyRegistry::default()));
    let host_default = proxy("http://hostdefault:8080");
    let mut socket = SocketOptions::with_proxy(Some(host_default.clone()));

    interceptor.after_duplex_context(&WebSocketConnection::for_bot("bot1"), &mut socket);

    assert_eq!(socket.proxy(), Some(&host_default));
}

#[test]
fn test_duplex_unresolvable_identity_is_skipped() {
    let mut socket = SocketOptions::default();

    interceptor().after_duplex_context(&WebSocketConnection { client: None }, &mut socket);
    interceptor().after_duplex_context(
        &WebSocketConnection {
            client: Some(SteamClient { id: None }),
        },
        &mut socket,
    );

    assert!(socket.proxy().is_none());
}

#[test]
fn test_http_replaces_parameter_with_identity_proxy() {
    let mut parameter = Some(proxy("http://hostdefault:8080"));

    interceptor().before_http_client(&BotLogger::for_bot("bot1"), &mut parameter, false);

    assert_eq!(parameter.unwrap().host(), "p1");
}

#[test]
fn test_http_without_override_keeps_host_parameter() {
    let mut parameter = Some(proxy("http://hostdefault:8080"));
    interceptor().before_http_client(&BotLogger::for_bot("bot2"), &mut parameter, true);
    assert_eq!(parameter.unwrap().host(), "hostdefault");

    let mut parameter = None;
    interceptor().before_http_client(&BotLogger::for_bot("bot2"), &mut parameter, false);
    assert!(parameter.is_none());
}

#[test]
fn test_http_unresolvable_identity_is_skipped() {
    let mut parameter = None;

    interceptor().before_http_client(&BotLogger { inner: None }, &mut parameter, false);
    interceptor().before_http_client(
        &BotLogger {
            inner: Some(InnerLogger { name: None }),
        },
        &mut parameter,
        false,
    );

    assert!(parameter.is_none());
}

#[test]
fn test_repeated_firing_is_deterministic() {
    let interceptor = interceptor();
    let connection = WebSocketConnection::for_bot("bot1");

    let outcomes: Vec<_> = (0..3)
        .map(|_| {
            let mut socket = SocketOptions::default();
            interceptor.after_duplex_context(&connection, &mut socket);
            socket
        })
        .collect();

    assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_concurrent_bots_get_their_own_proxies() {
    let mut registry = ProxyRegistry::new(None);
    for i in 0..16 {
        registry = registry.with_proxy(format!("bot{}", i), proxy(&format!("http://p{}:3128", i)));
    }
    let interceptor = Arc::new(ProxyInterceptor::new(Arc::new(registry)));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let interceptor = Arc::clone(&interceptor);
            thread::spawn(move || {
                let mut socket = SocketOptions::default();
                let connection = WebSocketConnection::for_bot(&format!("bot{}", i));
                interceptor.after_duplex_context(&connection, &mut socket);
                (i, socket.proxy().map(|proxy| proxy.host().to_string()))
            })
        })
        .collect();

    for handle in handles {
        let (i, host) = handle.join().unwrap();
        assert_eq!(host, Some(format!("p{}", i)));
    }
}

#[test]
fn test_hook_points_fire_installed_interceptor() {
    let global = GlobalConfig {
        transport_protocols: TransportProtocols::WEB_SOCKET,
        ..Default::default()
    };
    let registry = Arc::new(ProxyRegistry::default().with_proxy("bot1", proxy("http://p1:3128")));
    let mut hooks = HookPoints::new();
    assert!(ProxyInterceptor::install(&global, registry, &mut hooks));

    let mut socket = SocketOptions::default();
    hooks.fire_duplex_context(&WebSocketConnection::for_bot("bot1"), &mut socket);
    let mut parameter = None;
    hooks.fire_http_client(&BotLogger::for_bot("bot1"), &mut parameter, false);

    assert_eq!(socket.proxy().unwrap().host(), "p1");
    assert_eq!(parameter.unwrap().host(), "p1");
}

#[test]
fn test_plugin_inert_unless_web_socket_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("global.json"), r#"{"TransportProtocols": 7}"#).unwrap();
    fs::write(dir.path().join("bot1.json"), r#"{"WebProxy": "http://p1:3128"}"#).unwrap();
    let mut hooks = HookPoints::new();

    assert!(ProxyInjectionPlugin.on_init(dir.path(), &mut hooks).is_none());
    assert!(hooks.is_empty());

    let mut socket = SocketOptions::default();
    hooks.fire_duplex_context(&WebSocketConnection::for_bot("bot1"), &mut socket);
    assert!(socket.proxy().is_none());
}

#[test]
fn test_plugin_installs_from_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("global.json"),
        r#"{"TransportProtocols": 4, "WebProxy": "http://pdefault:3128"}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("bot1.json"),
        r#"{"WebProxy": "http://p1:3128", "WebProxyUsername": "alice", "WebProxyPassword": "pw"}"#,
    )
    .unwrap();
    let plugin = ProxyInjectionPlugin;
    let mut hooks = HookPoints::new();

    plugin.on_loaded();
    let registry = plugin.on_init(dir.path(), &mut hooks).unwrap();

    assert_eq!(plugin.name(), "BotProxyInjection");
    assert!(!plugin.version().is_empty());
    assert_eq!(registry.identities(), vec!["bot1"]);
    assert_eq!(hooks.len(), 1);

    let mut socket = SocketOptions::default();
    hooks.fire_duplex_context(&WebSocketConnection::for_bot("bot3"), &mut socket);
    assert_eq!(socket.proxy().unwrap().host(), "pdefault");
}

#[test]
fn test_plugin_survives_corrupt_bot_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("global.json"),
        r#"{"TransportProtocols": 4, "WebProxy": "http://pdefault:3128"}"#,
    )
    .unwrap();
    fs::write(dir.path().join("bot1.json"), r#"{"WebProxy": "http://p1:3128"}"#).unwrap();
    fs::write(dir.path().join("bot2.json"), "{ corrupt").unwrap();
    let mut hooks = HookPoints::new();

    let registry = ProxyInjectionPlugin.on_init(dir.path(), &mut hooks).unwrap();

    assert!(registry.is_empty());
    let mut socket = SocketOptions::default();
    hooks.fire_duplex_context(&WebSocketConnection::for_bot("bot1"), &mut socket);
    assert_eq!(socket.proxy().unwrap().host(), "pdefault");
}

#[test]
fn test_plugin_installs_despite_non_string_global_proxy() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("global.json"),
        r#"{"TransportProtocols": 4, "WebProxy": 42}"#,
    )
    .unwrap();
    fs::write(dir.path().join("bot1.json"), r#"{"WebProxy": "http://p1:3128"}"#).unwrap();
    let mut hooks = HookPoints::new();

    let registry = ProxyInjectionPlugin.on_init(dir.path(), &mut hooks).unwrap();

    assert_eq!(hooks.len(), 1);
    assert!(registry.fallback().is_none());
    let mut socket = SocketOptions::default();
    hooks.fire_duplex_context(&WebSocketConnection::for_bot("bot1"), &mut socket);
    assert_eq!(socket.proxy().unwrap().host(), "p1");
    let mut socket = SocketOptions::default();
    hooks.fire_duplex_context(&WebSocketConnection::for_bot("bot2"), &mut socket);
    assert!(socket.proxy().is_none());
}
