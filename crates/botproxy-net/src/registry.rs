//! Proxy registry
//!
//! Maps each identity to its configured proxy. Built once from the config
//! directory and read-only afterwards; share it as `Arc<ProxyRegistry>`.

use crate::config::{read_document, ProxySettings, CONFIG_EXTENSION, GLOBAL_CONFIG_FILE};
use crate::{ProxyDescriptor, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};

/// Supplies the proxy a new connection for `identity` should use
pub trait ProxyProvider: Send + Sync {
    /// Proxy for the identity, or `None` to leave the connection unchanged
    fn proxy_for(&self, identity: &str) -> Option<ProxyDescriptor>;
}

/// Identity → proxy mapping with a process-wide fallback
#[derive(Debug, Clone, Default)]
pub struct ProxyRegistry {
    proxies: HashMap<String, ProxyDescriptor>,
    fallback: Option<ProxyDescriptor>,
}

#[allow(dead_code)]
fn _assert_proxy_registry_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProxyRegistry>();
}

impl ProxyRegistry {
    /// Empty registry with only a fallback
    pub fn new(fallback: Option<ProxyDescriptor>) -> Self {
        Self {
            proxies: HashMap::new(),
            fallback,
        }
    }

    /// Add a per-identity proxy
    pub fn with_proxy(mut self, identity: impl Into<String>, proxy: ProxyDescriptor) -> Self {
        self.proxies.insert(identity.into(), proxy);
        self
    }

    /// Load every per-identity document in `config_dir`
    ///
    /// All-or-nothing: a document that is not a JSON object fails the whole
    /// load. A missing or malformed proxy URI only skips that identity.
    pub fn load(config_dir: &Path, fallback: Option<ProxyDescriptor>) -> Result<Self> {
        debug!("Loading bot proxies from {}", config_dir.display());

        let mut proxies = HashMap::new();
        for path in identity_documents(config_dir)? {
            let Some(identity) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let text = read_document(&path)?;
            match ProxySettings::from_document(&path, &text)?.to_descriptor() {
                Ok(Some(proxy)) => {
                    trace!(bot = identity, "Registered proxy {}", proxy);
                    proxies.insert(identity.to_string(), proxy);
                }
                Ok(None) => {}
                Err(e) => debug!(bot = identity, "Skipping proxy: {}", e),
            }
        }

        info!(
            "Loaded {} bot proxies from {}",
            proxies.len(),
            config_dir.display()
        );

        Ok(Self { proxies, fallback })
    }

    /// Load, degrading to a fallback-only registry on failure
    pub fn load_or_fallback(config_dir: &Path, fallback: Option<ProxyDescriptor>) -> Self {
        match Self::load(config_dir, fallback.clone()) {
            Ok(registry) => registry,
            Err(e) => {
                error!("Failed to load bot proxies, no per-bot overrides: {}", e);
                Self::new(fallback)
            }
        }
    }

    /// Per-identity proxy, else the fallback
    pub fn resolve(&self, identity: &str) -> Option<&ProxyDescriptor> {
        self.lookup(identity).or(self.fallback.as_ref())
    }

    /// Per-identity proxy only
    pub fn lookup(&self, identity: &str) -> Option<&ProxyDescriptor> {
        self.proxies.get(identity)
    }

    /// Process-wide fallback
    pub fn fallback(&self) -> Option<&ProxyDescriptor> {
        self.fallback.as_ref()
    }

    /// Identities with an override, sorted
    pub fn identities(&self) -> Vec<&str> {
        let mut identities: Vec<&str> = self.proxies.keys().map(String::as_str).collect();
        identities.sort_unstable();
        identities
    }

    /// Number of per-identity overrides
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Whether there are no per-identity overrides
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl ProxyProvider for ProxyRegistry {
    fn proxy_for(&self, identity: &str) -> Option<ProxyDescriptor> {
        self.resolve(identity).cloned()
    }
}

/// Per-identity documents in `config_dir`, sorted, excluding the global one
fn identity_documents(config_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(config_dir)? {
        let path = entry?.path();
        let is_document = path.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(CONFIG_EXTENSION)
            && path.file_name().and_then(|name| name.to_str()) != Some(GLOBAL_CONFIG_FILE);
        if is_document {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
