use ff::PrimeField;

use super::cursor::ByteReader;
use super::error::{SerError, SerKind, SerResult};
use super::primitives::{ensure_u32, read_u32, write_u32};
use crate::params::{CircuitScalar, ELEMENT_SIZE};

/// Writes a field element in its canonical little-endian representation.
pub fn write_element(out: &mut Vec<u8>, value: &CircuitScalar) {
    out.extend_from_slice(value.to_repr().as_ref());
}

/// Reads a canonical field element from the byte cursor.
///
/// Representations at or above the field modulus are rejected rather than
/// reduced, so every element has exactly one wire encoding.
pub fn read_element(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<CircuitScalar> {
    let repr = cursor.read_array::<ELEMENT_SIZE>(kind, field)?;
    Option::<CircuitScalar>::from(CircuitScalar::from_repr(repr))
        .ok_or_else(|| SerError::invalid_value(kind, field))
}

/// Writes a slice of field elements with a `u32` item count prefix.
pub fn write_element_vec(
    out: &mut Vec<u8>,
    values: &[CircuitScalar],
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    let count = ensure_u32(values.len(), kind, field)?;
    write_u32(out, count);
    for value in values {
        write_element(out, value);
    }
    Ok(())
}

/// Reads a length-prefixed vector of field elements.
pub fn read_element_vec(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<Vec<CircuitScalar>> {
    let count = read_u32(cursor, kind, field)? as usize;
    if count.saturating_mul(ELEMENT_SIZE) > cursor.remaining() {
        return Err(SerError::invalid_length(kind, field));
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(read_element(cursor, kind, field)?);
    }
    Ok(out)
}
