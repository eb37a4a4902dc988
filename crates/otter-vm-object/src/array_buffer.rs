//! ArrayBuffer implementation
//!
//! An `ArrayBufferRegion` exclusively owns its bytes. Typed arrays and
//! DataViews hold a reference to the buffer *object* plus an offset, and
//! read through the region on every access, so writes through one view
//! are visible through every other view at once. Detaching empties the
//! region; every view checks for that before touching memory.

use parking_lot::RwLock;

use crate::context::VmContext;
use crate::conversion;
use crate::error::{VmError, VmResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::value::Value;

/// Backing store of an ArrayBuffer
#[derive(Debug)]
pub struct ArrayBufferRegion {
    /// The bytes; `None` once detached
    data: RwLock<Option<Vec<u8>>>,
    /// Maximum byte length for resizable buffers
    max_byte_length: Option<usize>,
}

impl ArrayBufferRegion {
    /// Fixed-length, zero-filled region
    pub fn new(byte_length: usize) -> Self {
        Self {
            data: RwLock::new(Some(vec![0; byte_length])),
            max_byte_length: None,
        }
    }

    /// Resizable region
    pub fn new_resizable(byte_length: usize, max_byte_length: usize) -> Self {
        Self {
            data: RwLock::new(Some(vec![0; byte_length])),
            max_byte_length: Some(max_byte_length),
        }
    }

    fn from_bytes(bytes: Vec<u8>, max_byte_length: Option<usize>) -> Self {
        Self {
            data: RwLock::new(Some(bytes)),
            max_byte_length,
        }
    }

    /// Check if the buffer is detached
    pub fn is_detached(&self) -> bool {
        self.data.read().is_none()
    }

    /// Drop the bytes. Irreversible.
    pub fn detach(&self) {
        if self.data.write().take().is_some() {
            tracing::debug!("array buffer detached");
        }
    }

    /// Byte length (0 if detached)
    pub fn byte_length(&self) -> usize {
        self.data.read().as_ref().map_or(0, Vec::len)
    }

    /// Max byte length of a resizable buffer
    pub fn max_byte_length(&self) -> Option<usize> {
        self.max_byte_length
    }

    /// Check if this is a resizable buffer
    pub fn is_resizable(&self) -> bool {
        self.max_byte_length.is_some()
    }

    /// Grow or shrink in place; growth is zero-filled.
    pub fn resize(&self, new_length: usize) -> VmResult<()> {
        let Some(max) = self.max_byte_length else {
            return Err(VmError::type_error("ArrayBuffer is not resizable"));
        };
        if new_length > max {
            return Err(VmError::range_error(format!(
                "Invalid length {new_length} exceeds maxByteLength {max}"
            )));
        }
        let mut guard = self.data.write();
        let data = guard
            .as_mut()
            .ok_or_else(|| VmError::type_error("ArrayBuffer is detached"))?;
        tracing::trace!(from = data.len(), to = new_length, "array buffer resized");
        data.resize(new_length, 0);
        Ok(())
    }

    /// Copy `dest.len()` bytes starting at `offset`. False if out of range or detached.
    pub fn read_bytes(&self, offset: usize, dest: &mut [u8]) -> bool {
        let guard = self.data.read();
        let Some(data) = guard.as_ref() else {
            return false;
        };
        match offset.checked_add(dest.len()) {
            Some(end) if end <= data.len() => {
                dest.copy_from_slice(&data[offset..end]);
                true
            }
            _ => false,
        }
    }

    /// Write `src` at `offset`. False if out of range or detached.
    pub fn write_bytes(&self, offset: usize, src: &[u8]) -> bool {
        let mut guard = self.data.write();
        let Some(data) = guard.as_mut() else {
            return false;
        };
        match offset.checked_add(src.len()) {
            Some(end) if end <= data.len() => {
                data[offset..end].copy_from_slice(src);
                true
            }
            _ => false,
        }
    }

    /// Copy `[start, end)` out of the region
    pub fn copy_range(&self, start: usize, end: usize) -> Option<Vec<u8>> {
        let guard = self.data.read();
        let data = guard.as_ref()?;
        let end = end.min(data.len());
        let start = start.min(end);
        Some(data[start..end].to_vec())
    }

    /// Run `f` over the bytes, `None` if detached
    pub fn with_data_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        self.data.write().as_mut().map(|d| f(d.as_mut_slice()))
    }

    fn take(&self) -> Option<Vec<u8>> {
        self.data.write().take()
    }
}

/// Clamp a relative index the way `slice`, `fill` and `copyWithin` do:
/// negative values count back from `len`.
pub fn relative_index(relative: f64, len: usize) -> usize {
    if relative < 0.0 {
        let from_end = len as f64 + relative;
        if from_end <= 0.0 { 0 } else { from_end as usize }
    } else {
        relative.min(len as f64) as usize
    }
}

/// The region of an ArrayBuffer object, or a TypeError
pub fn this_array_buffer<'a>(obj: &'a ObjectRef, method: &str) -> VmResult<&'a ArrayBufferRegion> {
    obj.as_array_buffer().ok_or_else(|| {
        VmError::type_error(format!(
            "Method ArrayBuffer.prototype.{method} called on incompatible receiver"
        ))
    })
}

/// `AllocateArrayBuffer`; `proto` defaults to `%ArrayBuffer.prototype%`
pub fn allocate_array_buffer(
    ctx: &VmContext,
    byte_length: usize,
    max_byte_length: Option<usize>,
    proto: Option<ObjectRef>,
) -> VmResult<ObjectRef> {
    let limit = ctx.config().max_array_buffer_length;
    if byte_length > limit || max_byte_length.is_some_and(|m| m > limit) {
        return Err(VmError::range_error("Array buffer allocation failed"));
    }
    let region = match max_byte_length {
        Some(max) if byte_length > max => {
            return Err(VmError::range_error(format!(
                "Invalid array buffer max length {max}"
            )));
        }
        Some(max) => ArrayBufferRegion::new_resizable(byte_length, max),
        None => ArrayBufferRegion::new(byte_length),
    };
    Ok(wrap_region(ctx, region, proto))
}

fn wrap_region(ctx: &VmContext, region: ArrayBufferRegion, proto: Option<ObjectRef>) -> ObjectRef {
    let proto = proto.unwrap_or_else(|| ctx.intrinsics().array_buffer_prototype.clone());
    ObjectRef::new(ObjectKind::ArrayBuffer(region), Some(proto))
}

/// `new ArrayBuffer(length, { maxByteLength })` with JS-level arguments
pub fn array_buffer_constructor(
    ctx: &mut VmContext,
    length: &Value,
    max_byte_length: &Value,
) -> VmResult<ObjectRef> {
    let byte_length = conversion::to_index(ctx, length)?;
    let max = if max_byte_length.is_undefined() {
        None
    } else {
        Some(conversion::to_index(ctx, max_byte_length)?)
    };
    allocate_array_buffer(ctx, byte_length, max, None)
}

/// `ArrayBuffer.prototype.slice(start, end)`
///
/// Always copies into a fresh region.
pub fn array_buffer_slice(
    ctx: &mut VmContext,
    buffer: &ObjectRef,
    start: &Value,
    end: &Value,
) -> VmResult<ObjectRef> {
    let region = this_array_buffer(buffer, "slice")?;
    if region.is_detached() {
        return Err(VmError::type_error("Cannot perform ArrayBuffer.prototype.slice on a detached ArrayBuffer"));
    }
    let len = region.byte_length();
    let first = relative_index(conversion::to_integer_or_infinity(ctx, start)?, len);
    let last = if end.is_undefined() {
        len
    } else {
        relative_index(conversion::to_integer_or_infinity(ctx, end)?, len)
    };

    // start/end conversion may run user code that detaches the buffer
    let bytes = region
        .copy_range(first, last.max(first))
        .ok_or_else(|| VmError::type_error("Cannot perform ArrayBuffer.prototype.slice on a detached ArrayBuffer"))?;
    Ok(wrap_region(ctx, ArrayBufferRegion::from_bytes(bytes, None), None))
}

/// `ArrayBuffer.prototype.resize(newLength)`
pub fn array_buffer_resize(ctx: &mut VmContext, buffer: &ObjectRef, new_length: &Value) -> VmResult<()> {
    let region = this_array_buffer(buffer, "resize")?;
    if !region.is_resizable() {
        return Err(VmError::type_error("Method ArrayBuffer.prototype.resize called on a fixed-length buffer"));
    }
    let new_length = conversion::to_index(ctx, new_length)?;
    region.resize(new_length)
}

/// `ArrayBuffer.prototype.transfer` / `transferToFixedLength`
///
/// Moves the bytes into a new buffer and detaches `buffer`. With
/// `preserve_resizability` the new buffer keeps the old maximum.
pub fn array_buffer_transfer(
    ctx: &mut VmContext,
    buffer: &ObjectRef,
    new_length: &Value,
    preserve_resizability: bool,
) -> VmResult<ObjectRef> {
    let region = this_array_buffer(buffer, "transfer")?;
    let new_length = if new_length.is_undefined() {
        region.byte_length()
    } else {
        conversion::to_index(ctx, new_length)?
    };
    let max = if preserve_resizability {
        region.max_byte_length()
    } else {
        None
    };
    if max.is_some_and(|m| new_length > m) {
        return Err(VmError::range_error("Invalid array buffer length"));
    }
    if new_length > ctx.config().max_array_buffer_length {
        return Err(VmError::range_error("Array buffer allocation failed"));
    }
    let mut bytes = region
        .take()
        .ok_or_else(|| VmError::type_error("Cannot transfer a detached ArrayBuffer"))?;
    bytes.resize(new_length, 0);
    tracing::debug!(length = new_length, "array buffer transferred");
    Ok(wrap_region(ctx, ArrayBufferRegion::from_bytes(bytes, max), None))
}

/// `DetachArrayBuffer`
pub fn detach_array_buffer(buffer: &ObjectRef) -> VmResult<()> {
    this_array_buffer(buffer, "detach")?.detach();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{RuntimeConfig, VmRuntime};

    fn setup() -> VmContext {
        VmRuntime::new().create_context()
    }

    #[test]
    fn test_region_read_write() {
        let region = ArrayBufferRegion::new(8);
        assert!(region.write_bytes(2, &[1, 2, 3, 4]));
        let mut dest = [0u8; 4];
        assert!(region.read_bytes(2, &mut dest));
        assert_eq!(dest, [1, 2, 3, 4]);
        assert!(!region.write_bytes(6, &[0, 0, 0]));
        assert!(!region.read_bytes(usize::MAX, &mut dest));
    }

    #[test]
    fn test_detach() {
        let region = ArrayBufferRegion::new(8);
        region.detach();
        assert!(region.is_detached());
        assert_eq!(region.byte_length(), 0);
        assert!(!region.write_bytes(0, &[1]));
        region.detach();
    }

    #[test]
    fn test_resize() {
        let region = ArrayBufferRegion::new_resizable(4, 8);
        assert!(region.write_bytes(0, &[9]));
        region.resize(8).unwrap();
        assert_eq!(region.byte_length(), 8);
        let mut dest = [0u8; 2];
        assert!(region.read_bytes(0, &mut dest));
        assert_eq!(dest, [9, 0]);
        assert!(region.resize(9).unwrap_err().is_range_error());
        assert!(ArrayBufferRegion::new(4).resize(2).unwrap_err().is_type_error());
    }

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(-2.0, 10), 8);
        assert_eq!(relative_index(-20.0, 10), 0);
        assert_eq!(relative_index(f64::NEG_INFINITY, 10), 0);
        assert_eq!(relative_index(f64::INFINITY, 10), 10);
        assert_eq!(relative_index(3.0, 10), 3);
    }

    #[test]
    fn test_slice_copies() {
        let mut ctx = setup();
        let buffer = allocate_array_buffer(&ctx, 8, None, None).unwrap();
        let region = buffer.as_array_buffer().unwrap();
        region.write_bytes(0, &[1, 2, 3, 4, 5, 6, 7, 8]);

        let copy = array_buffer_slice(&mut ctx, &buffer, &Value::int32(2), &Value::int32(-2)).unwrap();
        let copy_region = copy.as_array_buffer().unwrap();
        assert_eq!(copy_region.byte_length(), 4);

        copy_region.write_bytes(0, &[0xFF]);
        let mut byte = [0u8; 1];
        region.read_bytes(2, &mut byte);
        assert_eq!(byte, [3]);
    }

    #[test]
    fn test_transfer_detaches_source() {
        let mut ctx = setup();
        let buffer = allocate_array_buffer(&ctx, 4, Some(16), None).unwrap();
        buffer.as_array_buffer().unwrap().write_bytes(0, &[7]);

        let moved = array_buffer_transfer(&mut ctx, &buffer, &Value::int32(6), true).unwrap();
        assert!(buffer.as_array_buffer().unwrap().is_detached());
        let moved_region = moved.as_array_buffer().unwrap();
        assert_eq!(moved_region.byte_length(), 6);
        assert_eq!(moved_region.max_byte_length(), Some(16));

        let err = array_buffer_transfer(&mut ctx, &buffer, &Value::undefined(), false).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_allocation_limit() {
        let runtime = VmRuntime::with_config(RuntimeConfig {
            max_array_buffer_length: 16,
            ..Default::default()
        });
        let ctx = runtime.create_context();
        assert!(allocate_array_buffer(&ctx, 17, None, None).unwrap_err().is_range_error());
        assert!(allocate_array_buffer(&ctx, 8, Some(4), None).unwrap_err().is_range_error());
    }
}
