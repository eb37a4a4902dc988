//! Internal-method dispatch
//!
//! Each object kind maps to one static [`InternalMethods`] table. Exotic
//! kinds build their table from [`ORDINARY_METHODS`] with struct-update
//! syntax, overriding only the operations they change, so every operation
//! either has a kind-specific implementation or explicitly falls through to
//! the ordinary algorithm.
//!
//! The `internal_*` methods on [`ObjectRef`] are the only entry points.
//! Exotic implementations that forward (proxy to target, ordinary `[[Get]]`
//! to the prototype) call these again rather than the ordinary functions,
//! so proxy-of-proxy and proxy-of-typed-array compose.

use crate::context::VmContext;
use crate::descriptor::PropertyDescriptor;
use crate::error::{VmError, VmResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::ordinary;
use crate::property_key::PropertyKey;
use crate::value::Value;
use crate::{arguments, array, function, proxy_operations, string_object, typed_array};

/// `[[GetPrototypeOf]]`
pub type GetPrototypeOfFn = fn(&mut VmContext, &ObjectRef) -> VmResult<Option<ObjectRef>>;
/// `[[SetPrototypeOf]]`
pub type SetPrototypeOfFn = fn(&mut VmContext, &ObjectRef, Option<ObjectRef>) -> VmResult<bool>;
/// `[[IsExtensible]]` / `[[PreventExtensions]]`
pub type ExtensibilityFn = fn(&mut VmContext, &ObjectRef) -> VmResult<bool>;
/// `[[GetOwnProperty]]`
pub type GetOwnPropertyFn =
    fn(&mut VmContext, &ObjectRef, &PropertyKey) -> VmResult<Option<PropertyDescriptor>>;
/// `[[DefineOwnProperty]]`
pub type DefineOwnPropertyFn =
    fn(&mut VmContext, &ObjectRef, &PropertyKey, &PropertyDescriptor) -> VmResult<bool>;
/// `[[HasProperty]]` / `[[Delete]]`
pub type KeyPredicateFn = fn(&mut VmContext, &ObjectRef, &PropertyKey) -> VmResult<bool>;
/// `[[Get]]`
pub type GetFn = fn(&mut VmContext, &ObjectRef, &PropertyKey, &Value) -> VmResult<Value>;
/// `[[Set]]`
pub type SetFn = fn(&mut VmContext, &ObjectRef, &PropertyKey, Value, &Value) -> VmResult<bool>;
/// `[[OwnPropertyKeys]]`
pub type OwnPropertyKeysFn = fn(&mut VmContext, &ObjectRef) -> VmResult<Vec<PropertyKey>>;
/// `[[Call]]`
pub type CallFn = fn(&mut VmContext, &ObjectRef, &Value, &[Value]) -> VmResult<Value>;
/// `[[Construct]]`
pub type ConstructFn = fn(&mut VmContext, &ObjectRef, &[Value], &ObjectRef) -> VmResult<Value>;

/// The essential internal methods of one object kind
pub struct InternalMethods {
    /// `[[GetPrototypeOf]]`
    pub get_prototype_of: GetPrototypeOfFn,
    /// `[[SetPrototypeOf]]`
    pub set_prototype_of: SetPrototypeOfFn,
    /// `[[IsExtensible]]`
    pub is_extensible: ExtensibilityFn,
    /// `[[PreventExtensions]]`
    pub prevent_extensions: ExtensibilityFn,
    /// `[[GetOwnProperty]]`
    pub get_own_property: GetOwnPropertyFn,
    /// `[[DefineOwnProperty]]`
    pub define_own_property: DefineOwnPropertyFn,
    /// `[[HasProperty]]`
    pub has_property: KeyPredicateFn,
    /// `[[Get]]`
    pub get: GetFn,
    /// `[[Set]]`
    pub set: SetFn,
    /// `[[Delete]]`
    pub delete: KeyPredicateFn,
    /// `[[OwnPropertyKeys]]`
    pub own_property_keys: OwnPropertyKeysFn,
    /// `[[Call]]`, for callable kinds
    pub call: Option<CallFn>,
    /// `[[Construct]]`, for kinds that may construct
    pub construct: Option<ConstructFn>,
}

/// The ordinary object internal methods; exotic tables start from this.
pub const ORDINARY_METHODS: InternalMethods = InternalMethods {
    get_prototype_of: ordinary::ordinary_get_prototype_of,
    set_prototype_of: ordinary::ordinary_set_prototype_of,
    is_extensible: ordinary::ordinary_is_extensible,
    prevent_extensions: ordinary::ordinary_prevent_extensions,
    get_own_property: ordinary::ordinary_get_own_property,
    define_own_property: ordinary::ordinary_define_own_property,
    has_property: ordinary::ordinary_has_property,
    get: ordinary::ordinary_get,
    set: ordinary::ordinary_set,
    delete: ordinary::ordinary_delete,
    own_property_keys: ordinary::ordinary_own_property_keys,
    call: None,
    construct: None,
};

static ORDINARY_TABLE: InternalMethods = ORDINARY_METHODS;

/// Ordinary objects with `[[Call]]` and `[[Construct]]`
static FUNCTION_METHODS: InternalMethods = InternalMethods {
    call: Some(function::function_call),
    construct: Some(function::function_construct),
    ..ORDINARY_METHODS
};

impl ObjectKind {
    /// The dispatch table for this kind
    pub fn internal_methods(&self) -> &'static InternalMethods {
        match self {
            Self::Ordinary | Self::ArrayBuffer(_) | Self::DataView(_) | Self::Map(_) | Self::Set(_) => {
                &ORDINARY_TABLE
            }
            Self::Array => &array::ARRAY_METHODS,
            Self::Function(_) => &FUNCTION_METHODS,
            Self::Proxy(_) => &proxy_operations::PROXY_METHODS,
            Self::Arguments(_) => &arguments::ARGUMENTS_METHODS,
            Self::String(_) => &string_object::STRING_METHODS,
            Self::TypedArray(_) => &typed_array::TYPED_ARRAY_METHODS,
        }
    }
}

impl ObjectRef {
    #[inline]
    fn methods(&self) -> &'static InternalMethods {
        self.kind().internal_methods()
    }

    /// `O.[[GetPrototypeOf]]()`
    pub fn internal_get_prototype_of(&self, ctx: &mut VmContext) -> VmResult<Option<ObjectRef>> {
        (self.methods().get_prototype_of)(ctx, self)
    }

    /// `O.[[SetPrototypeOf]](V)`
    pub fn internal_set_prototype_of(
        &self,
        ctx: &mut VmContext,
        proto: Option<ObjectRef>,
    ) -> VmResult<bool> {
        (self.methods().set_prototype_of)(ctx, self, proto)
    }

    /// `O.[[IsExtensible]]()`
    pub fn internal_is_extensible(&self, ctx: &mut VmContext) -> VmResult<bool> {
        (self.methods().is_extensible)(ctx, self)
    }

    /// `O.[[PreventExtensions]]()`
    pub fn internal_prevent_extensions(&self, ctx: &mut VmContext) -> VmResult<bool> {
        (self.methods().prevent_extensions)(ctx, self)
    }

    /// `O.[[GetOwnProperty]](P)`
    pub fn internal_get_own_property(
        &self,
        ctx: &mut VmContext,
        key: &PropertyKey,
    ) -> VmResult<Option<PropertyDescriptor>> {
        (self.methods().get_own_property)(ctx, self, key)
    }

    /// `O.[[DefineOwnProperty]](P, Desc)`
    pub fn internal_define_own_property(
        &self,
        ctx: &mut VmContext,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> VmResult<bool> {
        (self.methods().define_own_property)(ctx, self, key, desc)
    }

    /// `O.[[HasProperty]](P)`
    pub fn internal_has_property(&self, ctx: &mut VmContext, key: &PropertyKey) -> VmResult<bool> {
        let has = self.methods().has_property;
        ctx.enter(|ctx| has(ctx, self, key))
    }

    /// `O.[[Get]](P, Receiver)`
    pub fn internal_get(
        &self,
        ctx: &mut VmContext,
        key: &PropertyKey,
        receiver: &Value,
    ) -> VmResult<Value> {
        let get = self.methods().get;
        ctx.enter(|ctx| get(ctx, self, key, receiver))
    }

    /// `O.[[Set]](P, V, Receiver)`
    pub fn internal_set(
        &self,
        ctx: &mut VmContext,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> VmResult<bool> {
        let set = self.methods().set;
        ctx.enter(|ctx| set(ctx, self, key, value, receiver))
    }

    /// `O.[[Delete]](P)`
    pub fn internal_delete(&self, ctx: &mut VmContext, key: &PropertyKey) -> VmResult<bool> {
        (self.methods().delete)(ctx, self, key)
    }

    /// `O.[[OwnPropertyKeys]]()`
    pub fn internal_own_property_keys(&self, ctx: &mut VmContext) -> VmResult<Vec<PropertyKey>> {
        (self.methods().own_property_keys)(ctx, self)
    }

    /// `F.[[Call]](thisArgument, argumentsList)`
    pub fn internal_call(
        &self,
        ctx: &mut VmContext,
        this: &Value,
        args: &[Value],
    ) -> VmResult<Value> {
        match self.methods().call {
            Some(call) if self.is_callable() => call(ctx, self, this, args),
            _ => Err(VmError::type_error(format!("{:?} is not a function", self))),
        }
    }

    /// `F.[[Construct]](argumentsList, newTarget)`
    pub fn internal_construct(
        &self,
        ctx: &mut VmContext,
        args: &[Value],
        new_target: &ObjectRef,
    ) -> VmResult<Value> {
        match self.methods().construct {
            Some(construct) if self.is_constructor() => construct(ctx, self, args, new_target),
            _ => Err(VmError::type_error(format!(
                "{:?} is not a constructor",
                self
            ))),
        }
    }
}
