//! Outgoing-reference enumeration for a tracing collector
//!
//! The object graph is reference counted, so nothing here frees memory.
//! A collector built on top (cycle detection, heap snapshots) asks each
//! object for the objects it points at through [`Trace`]. Every edge that
//! keeps an object alive must be reported: the prototype, property values
//! and accessors, internal slots, and whatever the object's kind holds.

use crate::descriptor::Property;
use crate::object::{ObjectKind, ObjectRef};
use crate::property_table::PropertyTable;
use crate::value::Value;
use rustc_hash::FxHashSet;

/// Something that can hold object references
pub trait Trace {
    /// Whether values of this type can hold references at all
    const NEEDS_TRACE: bool = true;

    /// Report every directly held object to `tracer`
    fn trace(&self, tracer: &mut dyn FnMut(&ObjectRef));
}

impl Trace for Value {
    fn trace(&self, tracer: &mut dyn FnMut(&ObjectRef)) {
        // strings, symbols and bigints own no objects
        if let Value::Object(obj) = self {
            tracer(obj);
        }
    }
}

impl Trace for Property {
    fn trace(&self, tracer: &mut dyn FnMut(&ObjectRef)) {
        match self {
            Property::Data { value, .. } => value.trace(tracer),
            Property::Accessor { get, set, .. } => {
                get.iter().chain(set.iter()).for_each(|f| tracer(f));
            }
        }
    }
}

impl Trace for PropertyTable {
    fn trace(&self, tracer: &mut dyn FnMut(&ObjectRef)) {
        for property in self.values() {
            property.trace(tracer);
        }
    }
}

impl Trace for ObjectRef {
    fn trace(&self, tracer: &mut dyn FnMut(&ObjectRef)) {
        // the ordinary-state lock is released before the kind data takes its own
        {
            let data = self.data();
            if let Some(proto) = &data.prototype {
                tracer(proto);
            }
            data.properties.trace(tracer);
            for value in data.slots.values() {
                value.trace(tracer);
            }
        }

        match self.kind() {
            ObjectKind::Ordinary | ObjectKind::Array | ObjectKind::String(_) | ObjectKind::ArrayBuffer(_) => {}
            ObjectKind::Function(f) => f.captures().iter().for_each(|o| tracer(o)),
            ObjectKind::Proxy(p) => {
                // a revoked proxy holds nothing
                if let Some(target) = p.target() {
                    tracer(&target);
                }
                if let Some(handler) = p.handler() {
                    tracer(&handler);
                }
            }
            ObjectKind::Arguments(a) => a.binding_values().iter().for_each(|v| v.trace(tracer)),
            ObjectKind::TypedArray(ta) => tracer(ta.buffer()),
            ObjectKind::DataView(dv) => tracer(dv.buffer()),
            ObjectKind::Map(m) => {
                for (k, v) in m.entries() {
                    k.trace(tracer);
                    v.trace(tracer);
                }
            }
            ObjectKind::Set(s) => s.values().iter().for_each(|v| v.trace(tracer)),
        }
    }
}

impl ObjectRef {
    /// Objects this object directly keeps alive, in discovery order, each
    /// reported once
    pub fn outgoing_references(&self) -> Vec<ObjectRef> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        self.trace(&mut |obj| {
            if seen.insert(obj.addr()) {
                out.push(obj.clone());
            }
        });
        out
    }
}

/// Every object reachable from `roots`, roots included
pub fn reachable_from(roots: &[ObjectRef]) -> Vec<ObjectRef> {
    let mut seen: FxHashSet<usize> = roots.iter().map(ObjectRef::addr).collect();
    let mut order: Vec<ObjectRef> = roots.to_vec();
    let mut next = 0;
    while next < order.len() {
        let current = order[next].clone();
        next += 1;
        current.trace(&mut |obj| {
            if seen.insert(obj.addr()) {
                order.push(obj.clone());
            }
        });
    }
    tracing::trace!(roots = roots.len(), reachable = order.len(), "reachability walk");
    order
}
