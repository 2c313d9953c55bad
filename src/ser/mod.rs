//! Canonical serialization helpers for the invocation protocol.
//!
//! Every envelope exchanged with a gadget host uses the little-endian
//! layouts implemented here: primitive integers, length-prefixed vectors
//! and strings, optional values with a one-byte discriminant, and field
//! elements in their canonical `PrimeField` representation. The helpers
//! share a vocabulary of [`SerKind`] section markers so decode failures
//! name the exact envelope section and field that was being processed.

mod cursor;
mod element;
mod error;
mod primitives;

pub use cursor::ByteReader;
pub use element::{read_element, read_element_vec, write_element, write_element_vec};
pub use error::{SerError, SerKind, SerResult};
pub use primitives::{
    ensure_u32, read_bool, read_option, read_string, read_u32, read_u64, read_u64_vec, read_u8,
    write_bool, write_option, write_string, write_u32, write_u64, write_u64_vec, write_u8,
};
