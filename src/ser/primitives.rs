use super::cursor::ByteReader;
use super::error::{SerError, SerKind, SerResult};

/// Encodes a `u8` into the output buffer.
pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Encodes a `u32` in little-endian order.
pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Encodes a `u64` in little-endian order.
pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Writes a boolean flag as a single byte (`0` or `1`).
pub fn write_bool(out: &mut Vec<u8>, value: bool) {
    write_u8(out, value as u8);
}

/// Converts a `usize` into a `u32` length prefix.
pub fn ensure_u32(value: usize, kind: SerKind, field: &'static str) -> SerResult<u32> {
    u32::try_from(value).map_err(|_| SerError::invalid_length(kind, field))
}

/// Reads a `u8` from the cursor.
pub fn read_u8(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u8> {
    Ok(cursor.read_array::<1>(kind, field)?[0])
}

/// Reads a `u32` in little-endian order.
pub fn read_u32(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u32> {
    let bytes = cursor.read_array::<4>(kind, field)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Reads a `u64` in little-endian order.
pub fn read_u64(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<u64> {
    let bytes = cursor.read_array::<8>(kind, field)?;
    Ok(u64::from_le_bytes(bytes))
}

/// Reads a boolean flag encoded as `0` or `1`.
pub fn read_bool(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<bool> {
    match read_u8(cursor, kind, field)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(SerError::invalid_value(kind, field)),
    }
}

/// Writes a slice of `u64` values with a `u32` item count prefix.
pub fn write_u64_vec(
    out: &mut Vec<u8>,
    values: &[u64],
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    let count = ensure_u32(values.len(), kind, field)?;
    write_u32(out, count);
    for value in values {
        write_u64(out, *value);
    }
    Ok(())
}

/// Reads a length-prefixed vector of `u64` values.
///
/// The declared count is checked against the remaining bytes before any
/// allocation happens, so a corrupt prefix cannot request an oversized
/// buffer.
pub fn read_u64_vec(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<Vec<u64>> {
    let count = read_u32(cursor, kind, field)? as usize;
    if count.saturating_mul(8) > cursor.remaining() {
        return Err(SerError::invalid_length(kind, field));
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(read_u64(cursor, kind, field)?);
    }
    Ok(out)
}

/// Writes a UTF-8 string with a `u32` byte length prefix.
pub fn write_string(
    out: &mut Vec<u8>,
    value: &str,
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    let len = ensure_u32(value.len(), kind, field)?;
    write_u32(out, len);
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Reads a length-prefixed UTF-8 string.
pub fn read_string(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<String> {
    let len = read_u32(cursor, kind, field)? as usize;
    let bytes = cursor.read_exact(len, kind, field)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| SerError::invalid_value(kind, field))
}

/// Writes an optional value with a `u8` discriminant (0 = None, 1 = Some).
pub fn write_option<T, F>(out: &mut Vec<u8>, value: &Option<T>, mut write: F) -> SerResult<()>
where
    F: FnMut(&mut Vec<u8>, &T) -> SerResult<()>,
{
    match value {
        Some(inner) => {
            write_u8(out, 1);
            write(out, inner)?;
        }
        None => write_u8(out, 0),
    }
    Ok(())
}

/// Reads an optional value encoded with a `u8` discriminant.
pub fn read_option<T, F>(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
    mut read: F,
) -> SerResult<Option<T>>
where
    F: FnMut(&mut ByteReader<'_>) -> SerResult<T>,
{
    match read_u8(cursor, kind, field)? {
        0 => Ok(None),
        1 => Ok(Some(read(cursor)?)),
        _ => Err(SerError::invalid_value(kind, field)),
    }
}
