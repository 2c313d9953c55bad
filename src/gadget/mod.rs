//! Gadget contract and instance metadata.
//!
//! A gadget is a self-contained circuit component with a fixed
//! input/output arity. It declares its variables inside a shared
//! [`Protoboard`], emits the constraints that make its outputs a pure
//! function of its inputs, and — given concrete input elements —
//! computes the witness for every variable it owns.
//!
//! # Variable layout
//!
//! Gadgets allocate their input variables first and their output
//! variables last; local (auxiliary) variables sit in between. The
//! message layer relies on that discipline to remap protoboard indices
//! into the caller's global namespace: inputs land on
//! `incoming_variable_ids`, outputs on `outgoing_variable_ids`, and
//! locals on the contiguous range starting at
//! `free_variable_id_before`.
//!
//! # Error classes
//!
//! Arity violations are contract errors: they indicate a mismatched
//! build between caller and gadget, and tolerating them would silently
//! desynchronize the shared variable numbering for every later gadget in
//! the same circuit. [`ContractError`] therefore bypasses the
//! recoverable protocol-error channel; the dispatcher aborts the call
//! instead of answering with a structured error.

mod sha256;

pub use sha256::{Sha256Compress, BLOCK_BITS, INPUT_BITS, OUTPUT_BITS};

use core::fmt;

use bellpepper_core::SynthesisError;
use serde::{Deserialize, Serialize};

use crate::params::CircuitScalar;
use crate::protoboard::Protoboard;

/// Caller-supplied description of one gadget invocation, immutable for
/// the duration of the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetInstance {
    /// Variable identifiers already allocated by the caller, bound to the
    /// gadget's inputs in order.
    pub incoming_variable_ids: Vec<u64>,
    /// Variable identifiers to bind to the gadget's outputs in order.
    pub outgoing_variable_ids: Vec<u64>,
    /// First identifier not yet allocated in the shared constraint
    /// system at call time.
    pub free_variable_id_before: u64,
}

/// Fatal contract violations between caller and gadget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractError {
    /// `incoming_variable_ids` does not match the gadget's input arity.
    IncomingArity {
        /// Arity the gadget declares.
        expected: usize,
        /// Arity the instance supplied.
        got: usize,
    },
    /// `outgoing_variable_ids` does not match the gadget's output arity.
    OutgoingArity {
        /// Arity the gadget declares.
        expected: usize,
        /// Arity the instance supplied.
        got: usize,
    },
    /// The witness input vector does not match the gadget's input arity.
    WitnessInputLength {
        /// Arity the gadget declares.
        expected: usize,
        /// Number of elements supplied.
        got: usize,
    },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::IncomingArity { expected, got } => write!(
                f,
                "incoming variable ids: expected {expected} entries, got {got}"
            ),
            ContractError::OutgoingArity { expected, got } => write!(
                f,
                "outgoing variable ids: expected {expected} entries, got {got}"
            ),
            ContractError::WitnessInputLength { expected, got } => write!(
                f,
                "witness inputs: expected {expected} elements, got {got}"
            ),
        }
    }
}

impl std::error::Error for ContractError {}

/// Failures surfaced by a gadget while driving the protoboard.
#[derive(Debug)]
pub enum GadgetError {
    /// Fatal caller/gadget contract violation.
    Contract(ContractError),
    /// The circuit library failed to synthesize.
    Synthesis(SynthesisError),
}

impl fmt::Display for GadgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GadgetError::Contract(err) => write!(f, "contract violation: {err}"),
            GadgetError::Synthesis(err) => write!(f, "synthesis failed: {err}"),
        }
    }
}

impl std::error::Error for GadgetError {}

impl From<ContractError> for GadgetError {
    fn from(err: ContractError) -> Self {
        GadgetError::Contract(err)
    }
}

impl From<SynthesisError> for GadgetError {
    fn from(err: SynthesisError) -> Self {
        GadgetError::Synthesis(err)
    }
}

/// Capability set every gadget variant implements.
///
/// Arities are fixed and known before any phase runs. Constraint
/// generation declares the gadget's variables and records its
/// constraints; witness generation replays the allocation with concrete
/// values and returns the output elements. Both operations mutate the
/// protoboard the dispatcher owns for the duration of one call.
pub trait Gadget {
    /// Number of input variables the gadget binds.
    fn num_inputs(&self) -> usize;

    /// Number of output variables the gadget binds.
    fn num_outputs(&self) -> usize;

    /// Declares the gadget's variables and emits every constraint
    /// required to enforce its function. Called at most once per
    /// instance, on a fresh protoboard.
    fn generate_constraints(&mut self, pb: &mut Protoboard) -> Result<(), GadgetError>;

    /// Computes and stores the full witness for the gadget's variables
    /// and returns the output values in order.
    ///
    /// `inputs` must hold exactly [`Gadget::num_inputs`] elements;
    /// anything else is a fatal [`ContractError`].
    fn generate_witness(
        &mut self,
        pb: &mut Protoboard,
        inputs: &[CircuitScalar],
    ) -> Result<Vec<CircuitScalar>, GadgetError>;
}
