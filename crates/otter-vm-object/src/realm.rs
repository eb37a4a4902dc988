//! Realm registry and metadata.
//!
//! A realm owns its own intrinsics and global object and shares the
//! `Symbol.for` registry with the other realms of its runtime.

use parking_lot::RwLock;
use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use crate::intrinsics::Intrinsics;
use crate::object::ObjectRef;
use crate::symbol::SymbolRegistry;

/// Unique realm identifier.
pub type RealmId = u32;

/// One realm.
pub struct Realm {
    id: RealmId,
    intrinsics: Intrinsics,
    global: ObjectRef,
    symbols: Arc<SymbolRegistry>,
}

impl Realm {
    /// Realm id
    pub fn id(&self) -> RealmId {
        self.id
    }

    /// Root prototypes
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Global object (an ordinary object; populated by the host)
    pub fn global(&self) -> &ObjectRef {
        &self.global
    }

    /// `Symbol.for` registry
    pub fn symbol_registry(&self) -> &Arc<SymbolRegistry> {
        &self.symbols
    }
}

/// Registry of all realms created by a runtime.
pub struct RealmRegistry {
    realms: RwLock<Vec<Arc<Realm>>>,
    next_id: AtomicU32,
}

impl RealmRegistry {
    /// Empty registry
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            realms: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        })
    }

    /// Allocate, populate and register a realm.
    pub fn create(&self, symbols: Arc<SymbolRegistry>) -> Arc<Realm> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let intrinsics = Intrinsics::new();
        let global = ObjectRef::ordinary(Some(intrinsics.object_prototype.clone()));
        let realm = Arc::new(Realm {
            id,
            intrinsics,
            global,
            symbols,
        });
        self.realms.write().push(realm.clone());
        tracing::debug!(realm = id, "realm created");
        realm
    }

    /// Lookup a realm by id.
    pub fn get(&self, id: RealmId) -> Option<Arc<Realm>> {
        self.realms.read().iter().find(|r| r.id == id).cloned()
    }

    /// Remove a realm by id, dropping the registry's reference.
    pub fn remove(&self, id: RealmId) -> Option<Arc<Realm>> {
        let mut realms = self.realms.write();
        let pos = realms.iter().position(|r| r.id == id)?;
        Some(realms.swap_remove(pos))
    }

    /// Number of live realms.
    pub fn len(&self) -> usize {
        self.realms.read().len()
    }

    /// Check if no realm is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
