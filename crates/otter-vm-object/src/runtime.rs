//! VM runtime - the main entry point
//!
//! The runtime owns the realm registry and the `Symbol.for` registry, and
//! hands out execution contexts bound to a realm.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::VmContext;
use crate::error::{VmError, VmResult};
use crate::realm::{Realm, RealmRegistry};
use crate::symbol::SymbolRegistry;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Maximum re-entrant dispatch depth (calls, traps, accessors, JSON nesting)
    pub max_stack_depth: usize,
    /// Largest ArrayBuffer byte length that may be allocated
    pub max_array_buffer_length: usize,
    /// Whether failed assignments throw
    pub strict_mode: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: 2500,
            max_array_buffer_length: 1 << 31,
            strict_mode: false,
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON configuration; absent fields keep their defaults.
    pub fn from_json_str(text: &str) -> VmResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| VmError::syntax_error(format!("Invalid runtime config: {e}")))
    }
}

/// The VM runtime
///
/// It is `Send + Sync` and can be shared across threads; contexts are not
/// meant to be.
pub struct VmRuntime {
    config: RuntimeConfig,
    realms: Arc<RealmRegistry>,
    symbols: Arc<SymbolRegistry>,
    default_realm: Arc<Realm>,
}

impl VmRuntime {
    /// Create a new runtime with default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        let realms = RealmRegistry::new();
        let symbols = Arc::new(SymbolRegistry::new());
        let default_realm = realms.create(symbols.clone());
        Self {
            config,
            realms,
            symbols,
            default_realm,
        }
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The realm created with the runtime
    pub fn default_realm(&self) -> &Arc<Realm> {
        &self.default_realm
    }

    /// Create an additional realm with its own intrinsics
    pub fn create_realm(&self) -> Arc<Realm> {
        self.realms.create(self.symbols.clone())
    }

    /// Registry of all realms
    pub fn realms(&self) -> &Arc<RealmRegistry> {
        &self.realms
    }

    /// `Symbol.for` registry shared by every realm
    pub fn symbol_registry(&self) -> &Arc<SymbolRegistry> {
        &self.symbols
    }

    /// Create a context in the default realm
    pub fn create_context(&self) -> VmContext {
        self.create_context_in(self.default_realm.clone())
    }

    /// Create a context in the given realm
    pub fn create_context_in(&self, realm: Arc<Realm>) -> VmContext {
        VmContext::new(realm, self.config.clone())
    }
}

impl Default for VmRuntime {
    fn default() -> Self {
        Self::new()
    }
}
