//! Field parameter registry and the process-wide initialization barrier.
//!
//! Gadget hosts may invoke the dispatcher from several threads; the one
//! piece of process-wide state is the field parameter record held here.
//! [`ensure_init`] is cheap and idempotent: the first call materializes
//! the parameters behind a thread-safe barrier and runs a one-time
//! self-check of the field constants, every later call is a no-op that
//! returns the cached record. The dispatcher calls it on every invocation
//! so a host never has to sequence an explicit setup step.

use ff::{Field, PrimeField};
use once_cell::sync::Lazy;

/// Scalar field every gadget in this crate is synthesized over.
///
/// The constraint-system vocabulary (`bellpepper_core`) is generic over
/// `PrimeField`; the protocol fixes one concrete field so that wire
/// encodings of elements are unambiguous.
pub type CircuitScalar = pasta_curves::Fp;

/// Byte width of the canonical [`CircuitScalar`] representation on the
/// wire.
pub const ELEMENT_SIZE: usize = 32;

/// Immutable description of the field the protocol operates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldParams {
    /// Number of bytes in the canonical element encoding.
    pub element_size: usize,
    /// Bit length of the field modulus.
    pub modulus_bits: u32,
    /// Two-adicity of the multiplicative group, kept for hosts that size
    /// evaluation domains from it.
    pub two_adicity: u32,
}

static FIELD_PARAMS: Lazy<FieldParams> = Lazy::new(|| {
    // One-time consistency check: the advertised 2^S root of unity must
    // collapse to one after S squarings. A failure here is a broken build
    // of the field backend, not recoverable data.
    let mut root = CircuitScalar::ROOT_OF_UNITY;
    for _ in 0..CircuitScalar::S {
        root = root.square();
    }
    assert_eq!(
        root,
        CircuitScalar::ONE,
        "field backend self-check failed: root of unity has wrong order"
    );

    FieldParams {
        element_size: ELEMENT_SIZE,
        modulus_bits: CircuitScalar::NUM_BITS,
        two_adicity: CircuitScalar::S,
    }
});

/// Initializes the field parameters if this is the first call in the
/// process and returns the cached record.
pub fn ensure_init() -> &'static FieldParams {
    &FIELD_PARAMS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_stable() {
        let first = ensure_init();
        let second = ensure_init();
        assert_eq!(first, second);
        assert_eq!(first.element_size, ELEMENT_SIZE);
        assert_eq!(first.modulus_bits, CircuitScalar::NUM_BITS);
    }
}
