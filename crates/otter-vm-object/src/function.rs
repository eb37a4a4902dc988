//! Callable objects
//!
//! Function bodies are host closures. The excluded compiler/interpreter
//! layer wraps its own closures the same way, so `[[Call]]` and
//! `[[Construct]]` are uniform here: look up the closure, enter a new
//! depth level, run it.

use crate::context::VmContext;
use crate::descriptor::{Property, PropertyAttributes};
use crate::error::{VmError, VmResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::property_key::PropertyKey;
use crate::string::JsString;
use crate::symbol::Symbol;
use crate::value::Value;
use std::sync::Arc;

/// `[[Call]]` body: `(ctx, this, args)`
pub type NativeFn = Arc<dyn Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync>;

/// `[[Construct]]` body: `(ctx, args, new_target)`; must return an object
pub type NativeConstructFn =
    Arc<dyn Fn(&mut VmContext, &[Value], &ObjectRef) -> VmResult<Value> + Send + Sync>;

/// Internal state of a function object
pub struct FunctionData {
    name: JsString,
    call: NativeFn,
    construct: Option<NativeConstructFn>,
    /// Objects the closure keeps alive, reported to the collector
    captures: Vec<ObjectRef>,
}

impl FunctionData {
    /// Initial `name`
    pub fn name(&self) -> &JsString {
        &self.name
    }

    /// Has `[[Construct]]`
    pub fn is_constructor(&self) -> bool {
        self.construct.is_some()
    }

    /// Objects registered as captured by the closure
    pub fn captures(&self) -> &[ObjectRef] {
        &self.captures
    }
}

/// Builder for function objects
pub struct FunctionBuilder {
    name: JsString,
    length: u32,
    call: NativeFn,
    construct: Option<NativeConstructFn>,
    captures: Vec<ObjectRef>,
    prototype: Option<ObjectRef>,
}

impl FunctionBuilder {
    /// Start a function with the given `[[Call]]` body
    pub fn new<F>(name: &str, length: u32, f: F) -> Self
    where
        F: Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: JsString::new(name),
            length,
            call: Arc::new(f),
            construct: None,
            captures: Vec::new(),
            prototype: None,
        }
    }

    /// Make the function a constructor
    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut VmContext, &[Value], &ObjectRef) -> VmResult<Value> + Send + Sync + 'static,
    {
        self.construct = Some(Arc::new(f));
        self
    }

    /// Register an object the closure holds on to
    pub fn capture(mut self, obj: ObjectRef) -> Self {
        self.captures.push(obj);
        self
    }

    /// `[[Prototype]]` of the function object
    pub fn prototype(mut self, proto: ObjectRef) -> Self {
        self.prototype = Some(proto);
        self
    }

    /// Allocate the function object
    pub fn build(self) -> ObjectRef {
        let length = self.length;
        let name = self.name.clone();
        let func = ObjectRef::new(
            ObjectKind::Function(FunctionData {
                name: self.name,
                call: self.call,
                construct: self.construct,
                captures: self.captures,
            }),
            self.prototype,
        );
        let attrs = PropertyAttributes::new(false, false, true);
        func.insert_property(
            PropertyKey::intern("length"),
            Property::data_with_attrs(Value::number(f64::from(length)), attrs),
        );
        func.insert_property(
            PropertyKey::intern("name"),
            Property::data_with_attrs(Value::String(name), attrs),
        );
        func
    }
}

/// Function object with `%Function.prototype%` of the context's realm
pub fn native_function<F>(ctx: &VmContext, name: &str, length: u32, f: F) -> ObjectRef
where
    F: Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
{
    FunctionBuilder::new(name, length, f)
        .prototype(ctx.intrinsics().function_prototype.clone())
        .build()
}

/// `[[Call]]` of a function object
pub(crate) fn function_call(
    ctx: &mut VmContext,
    func: &ObjectRef,
    this: &Value,
    args: &[Value],
) -> VmResult<Value> {
    let Some(data) = func.as_function() else {
        return Err(VmError::internal("function_call on a non-function"));
    };
    let body = data.call.clone();
    ctx.enter(|ctx| body(ctx, this, args))
}

/// `[[Construct]]` of a function object
pub(crate) fn function_construct(
    ctx: &mut VmContext,
    func: &ObjectRef,
    args: &[Value],
    new_target: &ObjectRef,
) -> VmResult<Value> {
    let Some(body) = func.as_function().and_then(|d| d.construct.clone()) else {
        return Err(VmError::type_error(format!(
            "{} is not a constructor",
            function_display_name(func)
        )));
    };
    let result = ctx.enter(|ctx| body(ctx, args, new_target))?;
    if !result.is_object() {
        return Err(VmError::type_error(
            "Constructor did not return an object",
        ));
    }
    Ok(result)
}

/// Name used in error messages
pub(crate) fn function_display_name(func: &ObjectRef) -> String {
    match func.as_function() {
        Some(data) if !data.name.is_empty() => data.name.to_std_string(),
        _ => "anonymous".to_string(),
    }
}

/// Installs non-enumerable built-in members on an object
pub struct BuiltinBuilder<'a> {
    target: &'a ObjectRef,
    fn_proto: ObjectRef,
}

impl<'a> BuiltinBuilder<'a> {
    /// Install onto `target`, giving new functions `fn_proto` as prototype
    pub fn new(target: &'a ObjectRef, fn_proto: ObjectRef) -> Self {
        Self { target, fn_proto }
    }

    /// Method `{ writable: true, enumerable: false, configurable: true }`
    pub fn method<F>(self, name: &str, length: u32, f: F) -> Self
    where
        F: Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
    {
        let func = FunctionBuilder::new(name, length, f)
            .prototype(self.fn_proto.clone())
            .build();
        self.target.insert_property(
            PropertyKey::intern(name),
            Property::data_with_attrs(Value::object(func), PropertyAttributes::hidden()),
        );
        self
    }

    /// Symbol-keyed method; `name` is the function's `name`
    pub fn symbol_method<F>(
        self,
        symbol: Symbol,
        name: &str,
        length: u32,
        attributes: PropertyAttributes,
        f: F,
    ) -> Self
    where
        F: Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
    {
        let func = FunctionBuilder::new(name, length, f)
            .prototype(self.fn_proto.clone())
            .build();
        self.target.insert_property(
            PropertyKey::symbol(symbol),
            Property::data_with_attrs(Value::object(func), attributes),
        );
        self
    }

    /// Configurable, non-enumerable getter
    pub fn getter<F>(self, key: PropertyKey, name: &str, f: F) -> Self
    where
        F: Fn(&mut VmContext, &Value, &[Value]) -> VmResult<Value> + Send + Sync + 'static,
    {
        let getter = FunctionBuilder::new(&format!("get {name}"), 0, f)
            .prototype(self.fn_proto.clone())
            .build();
        self.target
            .insert_property(key, Property::accessor(Some(getter), None, false, true));
        self
    }

    /// Data property with explicit attributes
    pub fn value(self, key: PropertyKey, value: Value, attributes: PropertyAttributes) -> Self {
        self.target
            .insert_property(key, Property::data_with_attrs(value, attributes));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_name_and_length() {
        let f = FunctionBuilder::new("add", 2, |_, _, _| Ok(Value::undefined())).build();
        assert!(f.is_callable());
        assert!(!f.is_constructor());

        let length = f.own_property(&PropertyKey::intern("length")).unwrap();
        assert_eq!(length.value(), Some(&Value::int32(2)));
        assert!(!length.is_writable());
        assert!(!length.is_enumerable());
        assert!(length.is_configurable());

        let name = f.own_property(&PropertyKey::intern("name")).unwrap();
        assert_eq!(name.value(), Some(&Value::string("add")));
    }

    #[test]
    fn test_constructor_flag_and_captures() {
        let held = ObjectRef::ordinary(None);
        let f = FunctionBuilder::new("Point", 0, |_, _, _| Ok(Value::undefined()))
            .constructor(|_, _, _| Ok(Value::object(ObjectRef::ordinary(None))))
            .capture(held.clone())
            .build();
        assert!(f.is_constructor());
        assert_eq!(f.as_function().unwrap().captures(), &[held]);
    }
}
