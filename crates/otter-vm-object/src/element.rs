//! Element kinds and the raw byte codec
//!
//! Shared by typed arrays and DataView. Values are packed into a `u64` bit
//! pattern first, then split into bytes with explicit shifts, so byte order
//! is decided in one place and never depends on the host.

use num_bigint::BigInt;
use smallvec::SmallVec;

use crate::context::VmContext;
use crate::conversion;
use crate::error::VmResult;
use crate::number::{
    bigint_to_i64_wrapping, bigint_to_u64_wrapping, to_int8, to_int16, to_int32, to_uint8,
    to_uint8_clamp, to_uint16, to_uint32,
};
use crate::value::{CANONICAL_NAN_BITS, Value};

/// The kind of a typed array element or DataView access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 8-bit signed integer
    Int8,
    /// 8-bit unsigned integer
    Uint8,
    /// 8-bit unsigned integer, clamped on write
    Uint8Clamped,
    /// 16-bit signed integer
    Int16,
    /// 16-bit unsigned integer
    Uint16,
    /// 32-bit signed integer
    Int32,
    /// 32-bit unsigned integer
    Uint32,
    /// IEEE-754 binary32
    Float32,
    /// IEEE-754 binary64
    Float64,
    /// 64-bit signed BigInt
    BigInt64,
    /// 64-bit unsigned BigInt
    BigUint64,
}

impl ElementKind {
    /// All kinds, in intrinsic table order
    pub const ALL: [ElementKind; 11] = [
        ElementKind::Int8,
        ElementKind::Uint8,
        ElementKind::Uint8Clamped,
        ElementKind::Int16,
        ElementKind::Uint16,
        ElementKind::Int32,
        ElementKind::Uint32,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::BigInt64,
        ElementKind::BigUint64,
    ];

    /// Position in [`ElementKind::ALL`]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Bytes per element
    pub fn element_size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Uint8Clamped => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 | Self::BigInt64 | Self::BigUint64 => 8,
        }
    }

    /// Constructor name of the typed array of this kind
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
            Self::BigInt64 => "BigInt64Array",
            Self::BigUint64 => "BigUint64Array",
        }
    }

    /// Content type is BigInt
    pub fn is_bigint(self) -> bool {
        matches!(self, Self::BigInt64 | Self::BigUint64)
    }

    /// Convert a JS value to this kind's bit pattern.
    ///
    /// Runs `ToNumber` or `ToBigInt` first, which may call user code.
    pub fn value_to_bits(self, ctx: &mut VmContext, value: &Value) -> VmResult<u64> {
        if self.is_bigint() {
            let big = conversion::to_big_int(ctx, value)?;
            return Ok(self.bigint_to_bits(&big));
        }
        let n = conversion::to_number(ctx, value)?;
        Ok(self.number_to_bits(n))
    }

    /// Bit pattern of an already converted Number (non-BigInt kinds)
    pub fn number_to_bits(self, n: f64) -> u64 {
        match self {
            Self::Int8 => to_int8(n) as u8 as u64,
            Self::Uint8 => u64::from(to_uint8(n)),
            Self::Uint8Clamped => u64::from(to_uint8_clamp(n)),
            Self::Int16 => to_int16(n) as u16 as u64,
            Self::Uint16 => u64::from(to_uint16(n)),
            Self::Int32 => to_int32(n) as u32 as u64,
            Self::Uint32 => u64::from(to_uint32(n)),
            Self::Float32 => u64::from((n as f32).to_bits()),
            Self::Float64 => n.to_bits(),
            Self::BigInt64 | Self::BigUint64 => n as i64 as u64,
        }
    }

    /// Bit pattern of an already converted BigInt (BigInt kinds)
    pub fn bigint_to_bits(self, big: &BigInt) -> u64 {
        match self {
            Self::BigInt64 => bigint_to_i64_wrapping(big) as u64,
            _ => bigint_to_u64_wrapping(big),
        }
    }

    /// Decode a bit pattern into a JS value
    pub fn bits_to_value(self, bits: u64) -> Value {
        match self {
            Self::Int8 => Value::int32(i32::from(bits as u8 as i8)),
            Self::Uint8 | Self::Uint8Clamped => Value::int32(i32::from(bits as u8)),
            Self::Int16 => Value::int32(i32::from(bits as u16 as i16)),
            Self::Uint16 => Value::int32(i32::from(bits as u16)),
            Self::Int32 => Value::int32(bits as u32 as i32),
            Self::Uint32 => Value::number(f64::from(bits as u32)),
            Self::Float32 => Value::number(f64::from(f32::from_bits(bits as u32))),
            Self::Float64 => Value::number(f64::from_bits(bits)),
            Self::BigInt64 => Value::bigint(BigInt::from(bits as i64)),
            Self::BigUint64 => Value::bigint(BigInt::from(bits)),
        }
    }

    /// Encode `bits` into `element_size()` bytes
    pub fn bits_to_bytes(self, bits: u64, little_endian: bool) -> SmallVec<[u8; 8]> {
        let size = self.element_size();
        let bits = self.canonicalize_nan(bits);
        let mut bytes: SmallVec<[u8; 8]> = (0..size).map(|i| (bits >> (8 * i)) as u8).collect();
        if !little_endian {
            bytes.reverse();
        }
        bytes
    }

    /// Decode `element_size()` bytes into a bit pattern
    pub fn bytes_to_bits(self, bytes: &[u8], little_endian: bool) -> u64 {
        let size = self.element_size();
        let mut bits = 0u64;
        for i in 0..size {
            let byte = if little_endian {
                bytes[i]
            } else {
                bytes[size - 1 - i]
            };
            bits |= u64::from(byte) << (8 * i);
        }
        bits
    }

    fn canonicalize_nan(self, bits: u64) -> u64 {
        match self {
            Self::Float64 if f64::from_bits(bits).is_nan() => CANONICAL_NAN_BITS,
            Self::Float32 if f32::from_bits(bits as u32).is_nan() => 0x7FC0_0000,
            _ => bits,
        }
    }
}
