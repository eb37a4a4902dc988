//! # Otter VM Object
//!
//! Value and object model for the Otter JavaScript runtime: the value
//! domain, property keys and descriptors, ordinary and exotic objects
//! (arrays, strings, proxies, typed arrays, arguments), binary data, keyed
//! collections, JSON, and the abstract operations tying them together.
//!
//! ## Design Principles
//!
//! - **Uniform dispatch**: every object carries a static table of internal
//!   methods selected by its kind; callers never branch on the kind
//! - **Thread-safe**: objects are `Arc` + `parking_lot` locks, and no lock is
//!   held across a call back into user code
//! - **Bounded re-entrancy**: calls, traps, accessors and JSON nesting all
//!   count against one depth limit on [`VmContext`]

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod arguments;
pub mod array;
pub mod array_buffer;
pub mod context;
pub mod conversion;
pub mod data_view;
pub mod descriptor;
pub mod element;
pub mod error;
pub mod function;
pub mod internal_methods;
pub mod intrinsics;
pub mod json;
pub mod map_data;
pub mod number;
pub mod object;
pub mod operations;
pub mod ordinary;
pub mod property_key;
pub mod property_table;
pub mod proxy;
mod proxy_operations;
pub mod realm;
pub mod runtime;
pub mod string;
pub mod string_object;
pub mod symbol;
pub mod trace;
pub mod typed_array;
pub mod value;

pub use context::VmContext;
pub use descriptor::{Property, PropertyAttributes, PropertyDescriptor};
pub use element::ElementKind;
pub use error::{VmError, VmResult};
pub use function::{BuiltinBuilder, FunctionBuilder};
pub use intrinsics::Intrinsics;
pub use object::{InternalSlot, ObjectKind, ObjectRef};
pub use property_key::PropertyKey;
pub use runtime::{RuntimeConfig, VmRuntime};
pub use string::JsString;
pub use symbol::{Symbol, WellKnownSymbol};
pub use trace::Trace;
pub use value::{BindingCell, Value};
