//! JavaScript objects
//!
//! Every object is a [`JsObject`] behind an `Arc`: a fixed [`ObjectKind`]
//! chosen at creation, plus lock-protected ordinary state (prototype,
//! extensibility, own properties and internal slots). The kind selects the
//! internal-method table used by dispatch; see [`crate::internal_methods`].
//!
//! Locks guard only plain data. Nothing in this crate holds an object lock
//! while calling a getter, setter, trap or other user callback.

use crate::arguments::ArgumentsData;
use crate::array_buffer::ArrayBufferRegion;
use crate::data_view::DataViewData;
use crate::descriptor::Property;
use crate::function::FunctionData;
use crate::map_data::{MapData, SetData};
use crate::property_key::PropertyKey;
use crate::property_table::PropertyTable;
use crate::proxy::ProxyData;
use crate::string::JsString;
use crate::typed_array::TypedArrayData;
use crate::value::Value;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Named internal slots carried by otherwise ordinary objects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InternalSlot {
    /// `[[BooleanData]]` of Boolean wrapper objects
    BooleanData,
    /// `[[NumberData]]` of Number wrapper objects
    NumberData,
    /// `[[SymbolData]]` of Symbol wrapper objects
    SymbolData,
    /// `[[BigIntData]]` of BigInt wrapper objects
    BigIntData,
    /// `[[ErrorData]]` of error instances
    ErrorData,
    /// Slot owned by the embedding
    Host(&'static str),
}

/// The variant part of an object
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array exotic object
    Array,
    /// Callable object
    Function(FunctionData),
    /// Proxy exotic object
    Proxy(ProxyData),
    /// Arguments object, mapped or unmapped
    Arguments(ArgumentsData),
    /// String exotic object wrapping a primitive string
    String(JsString),
    /// ArrayBuffer with its byte region
    ArrayBuffer(ArrayBufferRegion),
    /// Typed array view
    TypedArray(TypedArrayData),
    /// DataView
    DataView(DataViewData),
    /// Map
    Map(MapData),
    /// Set
    Set(SetData),
}

impl ObjectKind {
    /// Short name used in debug output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ordinary => "Object",
            Self::Array => "Array",
            Self::Function(_) => "Function",
            Self::Proxy(_) => "Proxy",
            Self::Arguments(_) => "Arguments",
            Self::String(_) => "String",
            Self::ArrayBuffer(_) => "ArrayBuffer",
            Self::TypedArray(ta) => ta.kind().name(),
            Self::DataView(_) => "DataView",
            Self::Map(_) => "Map",
            Self::Set(_) => "Set",
        }
    }
}

/// Mutable ordinary state of an object
pub struct ObjectData {
    /// `[[Prototype]]`
    pub prototype: Option<ObjectRef>,
    /// `[[Extensible]]`
    pub extensible: bool,
    /// Own properties
    pub properties: PropertyTable,
    /// Internal slots
    pub slots: FxHashMap<InternalSlot, Value>,
}

/// A JavaScript object
pub struct JsObject {
    kind: ObjectKind,
    data: RwLock<ObjectData>,
}

/// Shared reference to an object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<JsObject>);

impl ObjectRef {
    /// Allocate an object of `kind` with the given prototype
    pub fn new(kind: ObjectKind, prototype: Option<ObjectRef>) -> Self {
        Self(Arc::new(JsObject {
            kind,
            data: RwLock::new(ObjectData {
                prototype,
                extensible: true,
                properties: PropertyTable::new(),
                slots: FxHashMap::default(),
            }),
        }))
    }

    /// `OrdinaryObjectCreate(proto)`
    pub fn ordinary(prototype: Option<ObjectRef>) -> Self {
        Self::new(ObjectKind::Ordinary, prototype)
    }

    /// The object's kind
    #[inline]
    pub fn kind(&self) -> &ObjectKind {
        &self.0.kind
    }

    /// Identity comparison
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address, usable as an identity key while the object is alive
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Lock ordinary state for reading
    pub(crate) fn data(&self) -> RwLockReadGuard<'_, ObjectData> {
        self.0.data.read()
    }

    /// Lock ordinary state for writing
    pub(crate) fn data_mut(&self) -> RwLockWriteGuard<'_, ObjectData> {
        self.0.data.write()
    }

    // ===== Raw state =====
    //
    // These bypass dispatch entirely. They exist for object construction
    // and for the ordinary algorithms; everything else should go through
    // the internal methods.

    /// `[[Prototype]]` slot, without consulting proxy traps
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.data().prototype.clone()
    }

    /// `[[Extensible]]` slot, without consulting proxy traps
    pub fn extensible_flag(&self) -> bool {
        self.data().extensible
    }

    /// Own stored property, without exotic behaviour
    pub fn own_property(&self, key: &PropertyKey) -> Option<Property> {
        self.data().properties.get(key).cloned()
    }

    /// Store a property directly (object setup only)
    pub fn insert_property(&self, key: PropertyKey, property: Property) {
        self.data_mut().properties.insert(key, property);
    }

    /// Remove a stored property directly
    pub fn remove_property(&self, key: &PropertyKey) -> Option<Property> {
        self.data_mut().properties.remove(key)
    }

    /// Read an internal slot
    pub fn slot(&self, slot: InternalSlot) -> Option<Value> {
        self.data().slots.get(&slot).cloned()
    }

    /// Write an internal slot
    pub fn set_slot(&self, slot: InternalSlot, value: Value) {
        self.data_mut().slots.insert(slot, value);
    }

    /// Check whether an internal slot is present
    pub fn has_slot(&self, slot: InternalSlot) -> bool {
        self.data().slots.contains_key(&slot)
    }

    // ===== Kind queries =====

    /// Has `[[Call]]`
    pub fn is_callable(&self) -> bool {
        match self.kind() {
            ObjectKind::Function(_) => true,
            ObjectKind::Proxy(p) => p.is_callable(),
            _ => false,
        }
    }

    /// Has `[[Construct]]`
    pub fn is_constructor(&self) -> bool {
        match self.kind() {
            ObjectKind::Function(f) => f.is_constructor(),
            ObjectKind::Proxy(p) => p.is_constructor(),
            _ => false,
        }
    }

    /// Array exotic object (proxies are not; see `operations::is_array`)
    pub fn is_array_exotic(&self) -> bool {
        matches!(self.kind(), ObjectKind::Array)
    }

    /// Proxy data
    pub fn as_proxy(&self) -> Option<&ProxyData> {
        match self.kind() {
            ObjectKind::Proxy(p) => Some(p),
            _ => None,
        }
    }

    /// Function data
    pub fn as_function(&self) -> Option<&FunctionData> {
        match self.kind() {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Arguments data
    pub fn as_arguments(&self) -> Option<&ArgumentsData> {
        match self.kind() {
            ObjectKind::Arguments(a) => Some(a),
            _ => None,
        }
    }

    /// `[[StringData]]` of a String exotic object
    pub fn as_string_exotic(&self) -> Option<&JsString> {
        match self.kind() {
            ObjectKind::String(s) => Some(s),
            _ => None,
        }
    }

    /// ArrayBuffer region
    pub fn as_array_buffer(&self) -> Option<&ArrayBufferRegion> {
        match self.kind() {
            ObjectKind::ArrayBuffer(b) => Some(b),
            _ => None,
        }
    }

    /// Typed array data
    pub fn as_typed_array(&self) -> Option<&TypedArrayData> {
        match self.kind() {
            ObjectKind::TypedArray(ta) => Some(ta),
            _ => None,
        }
    }

    /// DataView data
    pub fn as_data_view(&self) -> Option<&DataViewData> {
        match self.kind() {
            ObjectKind::DataView(dv) => Some(dv),
            _ => None,
        }
    }

    /// Map data
    pub fn as_map(&self) -> Option<&MapData> {
        match self.kind() {
            ObjectKind::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Set data
    pub fn as_set(&self) -> Option<&SetData> {
        match self.kind() {
            ObjectKind::Set(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr());
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object {}]@{:#x}", self.kind().name(), self.addr())
    }
}
