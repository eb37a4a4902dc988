//! Backing storage for Map and Set.
//!
//! Keys compare with SameValueZero through [`MapKey`]. Entries live in a
//! `Vec` in insertion order; deletion leaves a tombstone so a cursor that is
//! part-way through keeps its position and still sees entries appended
//! after it was created.

use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::context::VmContext;
use crate::error::{VmError, VmResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::value::{CANONICAL_NAN_BITS, Value, same_value_zero};

/// A `Value` hashed and compared with SameValueZero.
///
/// Construction normalizes `-0` to `+0`, which is the key Map and Set
/// actually store.
#[derive(Clone, Debug)]
pub struct MapKey(Value);

impl MapKey {
    /// Wrap a key, normalizing `-0`
    pub fn new(value: Value) -> Self {
        match value {
            Value::Number(n) if n == 0.0 => Self(Value::number(0.0)),
            other => Self(other),
        }
    }

    /// The stored key
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consume into the stored key
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        same_value_zero(&self.0, &other.0)
    }
}

impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Undefined | Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Number(n) => {
                let bits = if n.is_nan() {
                    CANONICAL_NAN_BITS
                } else if *n == 0.0 {
                    0
                } else {
                    n.to_bits()
                };
                bits.hash(state);
            }
            Value::String(s) => s.hash(state),
            Value::Symbol(s) => s.hash(state),
            Value::BigInt(b) => b.hash(state),
            Value::Object(o) => o.hash(state),
        }
    }
}

struct Entries<V> {
    /// Insertion order; `None` is a tombstone
    slots: Vec<Option<(MapKey, V)>>,
    index: FxHashMap<MapKey, usize>,
    live: usize,
}

impl<V: Clone> Entries<V> {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: FxHashMap::default(),
            live: 0,
        }
    }

    fn get(&self, key: &MapKey) -> Option<&V> {
        let position = *self.index.get(key)?;
        self.slots.get(position)?.as_ref().map(|(_, v)| v)
    }

    /// Insert or overwrite in place; true when the key was new
    fn insert(&mut self, key: MapKey, value: V) -> bool {
        if let Some(&position) = self.index.get(&key) {
            if let Some(Some((_, slot))) = self.slots.get_mut(position) {
                *slot = value;
            }
            return false;
        }
        self.index.insert(key.clone(), self.slots.len());
        self.slots.push(Some((key, value)));
        self.live += 1;
        true
    }

    fn remove(&mut self, key: &MapKey) -> bool {
        let Some(position) = self.index.remove(key) else {
            return false;
        };
        self.slots[position] = None;
        self.live -= 1;
        true
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.index.clear();
        self.live = 0;
    }

    fn at(&self, position: usize) -> Option<(Value, V)> {
        match self.slots.get(position) {
            Some(Some((k, v))) => Some((k.value().clone(), v.clone())),
            _ => None,
        }
    }

    fn snapshot(&self) -> Vec<(Value, V)> {
        self.slots
            .iter()
            .flatten()
            .map(|(k, v)| (k.value().clone(), v.clone()))
            .collect()
    }
}

/// `[[MapData]]`
pub struct MapData {
    inner: Mutex<Entries<Value>>,
}

impl Default for MapData {
    fn default() -> Self {
        Self::new()
    }
}

impl MapData {
    /// Empty map
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Entries::new()),
        }
    }

    /// Number of live entries
    pub fn size(&self) -> usize {
        self.inner.lock().live
    }

    /// `Map.prototype.get`
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.inner.lock().get(&MapKey::new(key.clone())).cloned()
    }

    /// `Map.prototype.has`
    pub fn has(&self, key: &Value) -> bool {
        self.inner.lock().index.contains_key(&MapKey::new(key.clone()))
    }

    /// `Map.prototype.set`; an existing key keeps its position
    pub fn set(&self, key: Value, value: Value) {
        self.inner.lock().insert(MapKey::new(key), value);
    }

    /// `Map.prototype.delete`
    pub fn delete(&self, key: &Value) -> bool {
        self.inner.lock().remove(&MapKey::new(key.clone()))
    }

    /// `Map.prototype.clear`
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Entry at a cursor position, `None` for a tombstone or past the end
    pub fn entry_at(&self, position: usize) -> Option<(Value, Value)> {
        self.inner.lock().at(position)
    }

    /// Cursor bound, tombstones included
    pub fn entries_len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Live entries in insertion order. The lock is released on return, so
    /// callers may run callbacks that mutate the map.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.inner.lock().snapshot()
    }

    /// Live keys in insertion order
    pub fn keys(&self) -> Vec<Value> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    /// Live values in insertion order
    pub fn values(&self) -> Vec<Value> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }
}

impl std::fmt::Debug for MapData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MapData(size={})", self.size())
    }
}

/// `[[SetData]]`
pub struct SetData {
    inner: Mutex<Entries<()>>,
}

impl Default for SetData {
    fn default() -> Self {
        Self::new()
    }
}

impl SetData {
    /// Empty set
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Entries::new()),
        }
    }

    /// Number of live entries
    pub fn size(&self) -> usize {
        self.inner.lock().live
    }

    /// `Set.prototype.has`
    pub fn has(&self, value: &Value) -> bool {
        self.inner.lock().index.contains_key(&MapKey::new(value.clone()))
    }

    /// `Set.prototype.add`; true when the value was new
    pub fn add(&self, value: Value) -> bool {
        self.inner.lock().insert(MapKey::new(value), ())
    }

    /// `Set.prototype.delete`
    pub fn delete(&self, value: &Value) -> bool {
        self.inner.lock().remove(&MapKey::new(value.clone()))
    }

    /// `Set.prototype.clear`
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Entry at a cursor position
    pub fn entry_at(&self, position: usize) -> Option<Value> {
        self.inner.lock().at(position).map(|(k, _)| k)
    }

    /// Cursor bound, tombstones included
    pub fn entries_len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Live values in insertion order
    pub fn values(&self) -> Vec<Value> {
        self.inner.lock().snapshot().into_iter().map(|(k, _)| k).collect()
    }
}

impl std::fmt::Debug for SetData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SetData(size={})", self.size())
    }
}

/// Iteration position over a Map or Set.
///
/// Each step re-reads the live storage, so entries deleted ahead of the
/// cursor are skipped and entries appended during iteration are visited.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionCursor {
    position: usize,
    done: bool,
}

impl CollectionCursor {
    /// Cursor at the first entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Next live map entry
    pub fn next_entry(&mut self, map: &MapData) -> Option<(Value, Value)> {
        while !self.done {
            if self.position >= map.entries_len() {
                self.done = true;
                break;
            }
            let position = self.position;
            self.position += 1;
            if let Some(entry) = map.entry_at(position) {
                return Some(entry);
            }
        }
        None
    }

    /// Next live set value
    pub fn next_value(&mut self, set: &SetData) -> Option<Value> {
        while !self.done {
            if self.position >= set.entries_len() {
                self.done = true;
                break;
            }
            let position = self.position;
            self.position += 1;
            if let Some(value) = set.entry_at(position) {
                return Some(value);
            }
        }
        None
    }
}

/// A new empty Map object with `%Map.prototype%`
pub fn map_create(ctx: &VmContext) -> ObjectRef {
    let proto = ctx.intrinsics().map_prototype.clone();
    ObjectRef::new(ObjectKind::Map(MapData::new()), Some(proto))
}

/// A new empty Set object with `%Set.prototype%`
pub fn set_create(ctx: &VmContext) -> ObjectRef {
    let proto = ctx.intrinsics().set_prototype.clone();
    ObjectRef::new(ObjectKind::Set(SetData::new()), Some(proto))
}

/// `[[MapData]]` of `obj`, or a TypeError naming `method`
pub fn this_map_data<'a>(obj: &'a Value, method: &str) -> VmResult<&'a MapData> {
    obj.as_object().and_then(ObjectRef::as_map).ok_or_else(|| {
        VmError::type_error(format!("Method Map.prototype.{method} called on incompatible receiver"))
    })
}

/// `[[SetData]]` of `obj`, or a TypeError naming `method`
pub fn this_set_data<'a>(obj: &'a Value, method: &str) -> VmResult<&'a SetData> {
    obj.as_object().and_then(ObjectRef::as_set).ok_or_else(|| {
        VmError::type_error(format!("Method Set.prototype.{method} called on incompatible receiver"))
    })
}
