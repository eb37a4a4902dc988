//! Property descriptors
//!
//! Two shapes live here. [`Property`] is what a property table stores: always
//! complete, either data or accessor. [`PropertyDescriptor`] is the partial
//! record passed to `[[DefineOwnProperty]]` and returned by
//! `[[GetOwnProperty]]`, where every field may be absent.

use crate::context::VmContext;
use crate::error::{VmError, VmResult};
use crate::object::ObjectRef;
use crate::operations;
use crate::property_key::PropertyKey;
use crate::value::Value;

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable (ignored for accessors)
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Explicit attributes
    pub const fn new(writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            writable,
            enumerable,
            configurable,
        }
    }

    /// Default data property attributes (as created by assignment)
    pub const fn data() -> Self {
        Self::new(true, true, true)
    }

    /// Writable, configurable, not enumerable (built-in methods)
    pub const fn hidden() -> Self {
        Self::new(true, false, true)
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self::new(false, false, false)
    }
}

/// A complete stored property
#[derive(Clone, Debug)]
pub enum Property {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<ObjectRef>,
        /// Setter function
        set: Option<ObjectRef>,
        /// Attributes (`writable` is unused)
        attributes: PropertyAttributes,
    },
}

impl Property {
    /// Create a data property with default attributes
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Create an accessor property
    pub fn accessor(
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self::Accessor {
            get,
            set,
            attributes: PropertyAttributes::new(false, enumerable, configurable),
        }
    }

    /// Get the value (for data properties)
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Attributes
    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    /// Attributes, mutably
    pub fn attributes_mut(&mut self) -> &mut PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => attributes,
        }
    }

    /// Check if accessor
    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// Check if writable (accessors never are)
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.writable,
            Self::Accessor { .. } => false,
        }
    }

    /// Check if enumerable
    pub fn is_enumerable(&self) -> bool {
        self.attributes().enumerable
    }

    /// Check if configurable
    pub fn is_configurable(&self) -> bool {
        self.attributes().configurable
    }
}

/// A partial property descriptor
///
/// `get`/`set` use a nested option: the outer layer is presence, the inner
/// one distinguishes a function from an explicit `undefined`.
#[derive(Clone, Debug, Default)]
pub struct PropertyDescriptor {
    /// `[[Value]]`
    pub value: Option<Value>,
    /// `[[Writable]]`
    pub writable: Option<bool>,
    /// `[[Get]]`
    pub get: Option<Option<ObjectRef>>,
    /// `[[Set]]`
    pub set: Option<Option<ObjectRef>>,
    /// `[[Enumerable]]`
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Fully populated data descriptor
    pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Default::default()
        }
    }

    /// Fully populated accessor descriptor
    pub fn accessor(
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Default::default()
        }
    }

    /// `{ [[Value]]: value }` alone, as `[[Set]]` uses on an existing property
    pub fn value_only(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    /// `IsAccessorDescriptor`
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// `IsDataDescriptor`
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// `IsGenericDescriptor`
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// Whether no field is present
    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    /// Configurable flag, treating absence as false
    pub fn is_configurable(&self) -> bool {
        self.configurable == Some(true)
    }

    /// Enumerable flag, treating absence as false
    pub fn is_enumerable(&self) -> bool {
        self.enumerable == Some(true)
    }

    /// Writable flag, treating absence as false
    pub fn is_writable(&self) -> bool {
        self.writable == Some(true)
    }

    /// Descriptor for a stored property (every field present)
    pub fn from_property(property: &Property) -> Self {
        match property {
            Property::Data { value, attributes } => Self::data(
                value.clone(),
                attributes.writable,
                attributes.enumerable,
                attributes.configurable,
            ),
            Property::Accessor {
                get,
                set,
                attributes,
            } => Self::accessor(
                get.clone(),
                set.clone(),
                attributes.enumerable,
                attributes.configurable,
            ),
        }
    }

    /// `CompletePropertyDescriptor`, producing the stored form
    pub fn to_property(&self) -> Property {
        let attributes = PropertyAttributes::new(
            self.is_writable(),
            self.is_enumerable(),
            self.is_configurable(),
        );
        if self.is_accessor_descriptor() {
            Property::Accessor {
                get: self.get.clone().flatten(),
                set: self.set.clone().flatten(),
                attributes,
            }
        } else {
            Property::Data {
                value: self.value.clone().unwrap_or_default(),
                attributes,
            }
        }
    }
}

/// `FromPropertyDescriptor`: reflect a descriptor as a plain object.
pub fn from_property_descriptor(
    ctx: &mut VmContext,
    desc: Option<&PropertyDescriptor>,
) -> VmResult<Value> {
    let Some(desc) = desc else {
        return Ok(Value::undefined());
    };
    let obj = ctx.new_object();
    let mut put = |name: &str, value: Value| {
        operations::create_data_property_or_throw(ctx, &obj, &PropertyKey::intern(name), value)
    };
    if let Some(value) = &desc.value {
        put("value", value.clone())?;
    }
    if let Some(writable) = desc.writable {
        put("writable", Value::boolean(writable))?;
    }
    if let Some(get) = &desc.get {
        put("get", get.clone().map_or(Value::undefined(), Value::object))?;
    }
    if let Some(set) = &desc.set {
        put("set", set.clone().map_or(Value::undefined(), Value::object))?;
    }
    if let Some(enumerable) = desc.enumerable {
        put("enumerable", Value::boolean(enumerable))?;
    }
    if let Some(configurable) = desc.configurable {
        put("configurable", Value::boolean(configurable))?;
    }
    Ok(Value::object(obj))
}

/// `ToPropertyDescriptor`: read a descriptor out of an object.
///
/// Fields are probed with `[[HasProperty]]` then `[[Get]]`, so getters and
/// proxy traps on the descriptor object run in the standard order.
pub fn to_property_descriptor(ctx: &mut VmContext, value: &Value) -> VmResult<PropertyDescriptor> {
    let Some(obj) = value.as_object() else {
        return Err(VmError::type_error(
            "Property description must be an object",
        ));
    };
    let mut desc = PropertyDescriptor::default();

    let mut field = |ctx: &mut VmContext, name: &str| -> VmResult<Option<Value>> {
        let key = PropertyKey::intern(name);
        if operations::has_property(ctx, obj, &key)? {
            Ok(Some(operations::get(ctx, obj, &key)?))
        } else {
            Ok(None)
        }
    };

    if let Some(v) = field(ctx, "enumerable")? {
        desc.enumerable = Some(v.to_boolean());
    }
    if let Some(v) = field(ctx, "configurable")? {
        desc.configurable = Some(v.to_boolean());
    }
    if let Some(v) = field(ctx, "value")? {
        desc.value = Some(v);
    }
    if let Some(v) = field(ctx, "writable")? {
        desc.writable = Some(v.to_boolean());
    }
    if let Some(v) = field(ctx, "get")? {
        desc.get = Some(accessor_function(&v, "Getter")?);
    }
    if let Some(v) = field(ctx, "set")? {
        desc.set = Some(accessor_function(&v, "Setter")?);
    }

    if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
        return Err(VmError::type_error(
            "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
        ));
    }
    Ok(desc)
}

fn accessor_function(value: &Value, which: &str) -> VmResult<Option<ObjectRef>> {
    match value {
        Value::Undefined => Ok(None),
        Value::Object(o) if o.is_callable() => Ok(Some(o.clone())),
        other => Err(VmError::type_error(format!(
            "{} must be a function: {:?}",
            which, other
        ))),
    }
}
