//! DataView implementation
//!
//! A DataView reads and writes any element kind at arbitrary byte offsets of
//! an ArrayBuffer, with the byte order chosen per access. Big-endian is the
//! default when the flag is omitted.

use crate::array_buffer::ArrayBufferRegion;
use crate::context::VmContext;
use crate::conversion;
use crate::element::ElementKind;
use crate::error::{VmError, VmResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::value::Value;

/// Internal slots of a DataView
#[derive(Debug)]
pub struct DataViewData {
    buffer: ObjectRef,
    byte_offset: usize,
    /// `None` when the view tracks a resizable buffer's length
    byte_length: Option<usize>,
}

impl DataViewData {
    /// `[[ViewedArrayBuffer]]`
    pub fn buffer(&self) -> &ObjectRef {
        &self.buffer
    }

    /// `[[ByteOffset]]`
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    fn region(&self) -> Option<&ArrayBufferRegion> {
        self.buffer.as_array_buffer()
    }

    /// Check if the underlying buffer is detached
    pub fn is_detached(&self) -> bool {
        self.region().is_none_or(ArrayBufferRegion::is_detached)
    }

    /// `IsViewOutOfBounds`
    pub fn is_out_of_bounds(&self) -> bool {
        let Some(region) = self.region().filter(|r| !r.is_detached()) else {
            return true;
        };
        let buffer_length = region.byte_length();
        match self.byte_length {
            Some(len) => self.byte_offset + len > buffer_length,
            None => self.byte_offset > buffer_length,
        }
    }

    /// `GetViewByteLength`, 0 when out of bounds
    pub fn byte_length(&self) -> usize {
        if self.is_out_of_bounds() {
            return 0;
        }
        match self.byte_length {
            Some(len) => len,
            None => self.region().map_or(0, |r| r.byte_length() - self.byte_offset),
        }
    }

    fn check_access(&self, offset: usize, kind: ElementKind) -> VmResult<usize> {
        if self.is_detached() {
            return Err(VmError::type_error("Cannot access a DataView on a detached ArrayBuffer"));
        }
        if self.is_out_of_bounds() {
            return Err(VmError::type_error("DataView is out of bounds"));
        }
        // checked against the end of the access, not just its start
        let end = offset.checked_add(kind.element_size());
        if end.is_none_or(|end| end > self.byte_length()) {
            return Err(VmError::range_error("Offset is outside the bounds of the DataView"));
        }
        Ok(self.byte_offset + offset)
    }

    /// Raw read with an already converted offset
    pub fn get_bits(&self, offset: usize, kind: ElementKind, little_endian: bool) -> VmResult<u64> {
        let start = self.check_access(offset, kind)?;
        let mut bytes = [0u8; 8];
        let size = kind.element_size();
        let read = self
            .region()
            .is_some_and(|r| r.read_bytes(start, &mut bytes[..size]));
        if !read {
            return Err(VmError::type_error("Cannot access a DataView on a detached ArrayBuffer"));
        }
        Ok(kind.bytes_to_bits(&bytes[..size], little_endian))
    }

    /// Raw write with an already converted offset and value
    pub fn set_bits(
        &self,
        offset: usize,
        kind: ElementKind,
        bits: u64,
        little_endian: bool,
    ) -> VmResult<()> {
        let start = self.check_access(offset, kind)?;
        let bytes = kind.bits_to_bytes(bits, little_endian);
        if self.region().is_some_and(|r| r.write_bytes(start, &bytes)) {
            Ok(())
        } else {
            Err(VmError::type_error("Cannot access a DataView on a detached ArrayBuffer"))
        }
    }
}

fn this_data_view<'a>(view: &'a ObjectRef, method: &str) -> VmResult<&'a DataViewData> {
    view.as_data_view().ok_or_else(|| {
        VmError::type_error(format!(
            "Method DataView.prototype.{method} called on incompatible receiver"
        ))
    })
}

/// `new DataView(buffer, byteOffset, byteLength)`
pub fn data_view_create(
    ctx: &mut VmContext,
    buffer: &Value,
    byte_offset: &Value,
    byte_length: &Value,
) -> VmResult<ObjectRef> {
    let Some(buffer) = buffer.as_object().filter(|b| b.as_array_buffer().is_some()) else {
        return Err(VmError::type_error("First argument to DataView constructor must be an ArrayBuffer"));
    };
    let offset = conversion::to_index(ctx, byte_offset)?;
    let region = buffer
        .as_array_buffer()
        .ok_or_else(|| VmError::internal("DataView buffer lost its region"))?;
    if region.is_detached() {
        return Err(VmError::type_error("Cannot construct a DataView on a detached ArrayBuffer"));
    }
    let buffer_length = region.byte_length();
    if offset > buffer_length {
        return Err(VmError::range_error(format!(
            "Start offset {offset} is outside the bounds of the buffer"
        )));
    }

    let view_length = if byte_length.is_undefined() {
        if region.is_resizable() {
            None
        } else {
            Some(buffer_length - offset)
        }
    } else {
        let len = conversion::to_index(ctx, byte_length)?;
        if offset.checked_add(len).is_none_or(|end| end > buffer_length) {
            return Err(VmError::range_error(format!("Invalid DataView length {len}")));
        }
        Some(len)
    };

    // the conversions above may have run user code
    if region.is_detached() {
        return Err(VmError::type_error("Cannot construct a DataView on a detached ArrayBuffer"));
    }

    let proto = ctx.intrinsics().data_view_prototype.clone();
    Ok(ObjectRef::new(
        ObjectKind::DataView(DataViewData {
            buffer: buffer.clone(),
            byte_offset: offset,
            byte_length: view_length,
        }),
        Some(proto),
    ))
}

/// `GetViewValue(view, requestIndex, isLittleEndian, type)`
pub fn get_view_value(
    ctx: &mut VmContext,
    view: &ObjectRef,
    request_index: &Value,
    little_endian: &Value,
    kind: ElementKind,
) -> VmResult<Value> {
    this_data_view(view, "get")?;
    let offset = conversion::to_index(ctx, request_index)?;
    let little_endian = little_endian.to_boolean();
    let data = this_data_view(view, "get")?;
    let bits = data.get_bits(offset, kind, little_endian)?;
    Ok(kind.bits_to_value(bits))
}

/// `SetViewValue(view, requestIndex, isLittleEndian, type, value)`
pub fn set_view_value(
    ctx: &mut VmContext,
    view: &ObjectRef,
    request_index: &Value,
    little_endian: &Value,
    kind: ElementKind,
    value: &Value,
) -> VmResult<()> {
    this_data_view(view, "set")?;
    let offset = conversion::to_index(ctx, request_index)?;
    let bits = kind.value_to_bits(ctx, value)?;
    let little_endian = little_endian.to_boolean();
    let data = this_data_view(view, "set")?;
    data.set_bits(offset, kind, bits, little_endian)
}

/// `DataView.prototype.byteLength`; TypeError on a detached buffer
pub fn data_view_byte_length(view: &ObjectRef) -> VmResult<usize> {
    let data = this_data_view(view, "byteLength")?;
    if data.is_out_of_bounds() {
        return Err(VmError::type_error("DataView is out of bounds"));
    }
    Ok(data.byte_length())
}
