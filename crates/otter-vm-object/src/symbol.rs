//! Symbols, well-known symbols and the `Symbol.for` registry

use crate::string::JsString;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct SymbolData {
    id: u64,
    description: Option<JsString>,
    registry_key: Option<JsString>,
}

/// A unique symbol. Identity is the allocation, never the description.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    /// Create a fresh symbol
    pub fn new(description: Option<JsString>) -> Self {
        Self(Arc::new(SymbolData {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description,
            registry_key: None,
        }))
    }

    fn registered(key: JsString) -> Self {
        Self(Arc::new(SymbolData {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(key.clone()),
            registry_key: Some(key),
        }))
    }

    /// Unique ID
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Description passed at creation
    pub fn description(&self) -> Option<&JsString> {
        self.0.description.as_ref()
    }

    /// Key under which this symbol lives in the global registry
    pub fn registry_key(&self) -> Option<&JsString> {
        self.0.registry_key.as_ref()
    }

    /// `SymbolDescriptiveString`: `Symbol(desc)`
    pub fn descriptive_string(&self) -> JsString {
        let desc = self
            .description()
            .map(|d| d.to_std_string())
            .unwrap_or_default();
        JsString::new(&format!("Symbol({desc})"))
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.id);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(d) => write!(f, "Symbol({})", d),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Symbols shared by every realm in the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum WellKnownSymbol {
    AsyncIterator,
    HasInstance,
    IsConcatSpreadable,
    Iterator,
    Match,
    MatchAll,
    Replace,
    Search,
    Species,
    Split,
    ToPrimitive,
    ToStringTag,
    Unscopables,
}

const WELL_KNOWN_COUNT: usize = 13;

static WELL_KNOWN: std::sync::LazyLock<[Symbol; WELL_KNOWN_COUNT]> =
    std::sync::LazyLock::new(|| {
        WellKnownSymbol::ALL.map(|wk| Symbol::new(Some(JsString::intern(wk.description()))))
    });

impl WellKnownSymbol {
    /// Every well-known symbol in table order
    pub const ALL: [WellKnownSymbol; WELL_KNOWN_COUNT] = [
        Self::AsyncIterator,
        Self::HasInstance,
        Self::IsConcatSpreadable,
        Self::Iterator,
        Self::Match,
        Self::MatchAll,
        Self::Replace,
        Self::Search,
        Self::Species,
        Self::Split,
        Self::ToPrimitive,
        Self::ToStringTag,
        Self::Unscopables,
    ];

    /// `"Symbol.iterator"` etc.
    pub fn description(self) -> &'static str {
        match self {
            Self::AsyncIterator => "Symbol.asyncIterator",
            Self::HasInstance => "Symbol.hasInstance",
            Self::IsConcatSpreadable => "Symbol.isConcatSpreadable",
            Self::Iterator => "Symbol.iterator",
            Self::Match => "Symbol.match",
            Self::MatchAll => "Symbol.matchAll",
            Self::Replace => "Symbol.replace",
            Self::Search => "Symbol.search",
            Self::Species => "Symbol.species",
            Self::Split => "Symbol.split",
            Self::ToPrimitive => "Symbol.toPrimitive",
            Self::ToStringTag => "Symbol.toStringTag",
            Self::Unscopables => "Symbol.unscopables",
        }
    }

    /// The process-wide symbol
    pub fn symbol(self) -> Symbol {
        WELL_KNOWN[self as usize].clone()
    }
}

/// Registry backing `Symbol.for()` / `Symbol.keyFor()`
///
/// One registry is shared by all realms of a runtime.
pub struct SymbolRegistry {
    map: Mutex<FxHashMap<JsString, Symbol>>,
}

impl SymbolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            map: Mutex::new(FxHashMap::default()),
        }
    }

    /// `Symbol.for(key)`
    pub fn for_key(&self, key: &JsString) -> Symbol {
        self.map
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Symbol::registered(key.clone()))
            .clone()
    }

    /// `Symbol.keyFor(sym)`
    pub fn key_for(&self, symbol: &Symbol) -> Option<JsString> {
        let key = symbol.registry_key()?;
        let map = self.map.lock();
        match map.get(key) {
            Some(found) if found == symbol => Some(key.clone()),
            _ => None,
        }
    }

    /// Number of registered symbols
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    /// Check if no symbol has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new(Some(JsString::new("x")));
        let b = Symbol::new(Some(JsString::new("x")));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_well_known_symbols_are_stable() {
        let a = WellKnownSymbol::Iterator.symbol();
        let b = WellKnownSymbol::Iterator.symbol();
        assert_eq!(a, b);
        assert_ne!(a, WellKnownSymbol::ToPrimitive.symbol());
        assert!(a.description().unwrap().eq_str("Symbol.iterator"));
    }

    #[test]
    fn test_registry_for_and_key_for() {
        let registry = SymbolRegistry::new();
        let key = JsString::new("app");
        let a = registry.for_key(&key);
        let b = registry.for_key(&JsString::new("app"));
        assert_eq!(a, b);
        assert_eq!(registry.key_for(&a), Some(key));
        assert_eq!(registry.key_for(&Symbol::new(None)), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_descriptive_string() {
        let s = Symbol::new(Some(JsString::new("tag")));
        assert!(s.descriptive_string().eq_str("Symbol(tag)"));
        assert!(Symbol::new(None).descriptive_string().eq_str("Symbol()"));
    }
}
