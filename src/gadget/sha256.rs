//! Two-to-one SHA-256 compression gadget.
//!
//! The round logic comes from `bellpepper`'s SHA-256 block function; this
//! module wires it into the invocation contract: 512 input bits (left
//! block followed by right block), 256 output bits, with explicitly
//! allocated output variables constrained equal to the hasher's digest
//! bits so outputs occupy the final positions of the allocation order.

use bellpepper::gadgets::sha256::sha256_block_no_padding;
use bellpepper_core::boolean::{AllocatedBit, Boolean};
use bellpepper_core::{ConstraintSystem, SynthesisError};
use ff::Field;

use super::{ContractError, Gadget, GadgetError, GadgetInstance};
use crate::params::CircuitScalar;
use crate::protoboard::Protoboard;

/// Bits per hash block and per digest.
pub const BLOCK_BITS: usize = 256;
/// Input arity: two blocks.
pub const INPUT_BITS: usize = 2 * BLOCK_BITS;
/// Output arity: one digest.
pub const OUTPUT_BITS: usize = 256;

/// SHA-256 compression of two 256-bit blocks into one 256-bit digest.
///
/// Input elements are interpreted as bits: an element equal to exactly
/// one is true, every other value (zero, two, minus one, ...) is false.
/// This is a binary gadget, not a general field-arithmetic one.
#[derive(Debug)]
pub struct Sha256Compress {
    _private: (),
}

impl Sha256Compress {
    /// Builds the gadget for one instance, checking the caller supplied
    /// identifier lists against the fixed arity before any other work.
    pub fn from_instance(instance: &GadgetInstance) -> Result<Self, ContractError> {
        if instance.incoming_variable_ids.len() != INPUT_BITS {
            return Err(ContractError::IncomingArity {
                expected: INPUT_BITS,
                got: instance.incoming_variable_ids.len(),
            });
        }
        if instance.outgoing_variable_ids.len() != OUTPUT_BITS {
            return Err(ContractError::OutgoingArity {
                expected: OUTPUT_BITS,
                got: instance.outgoing_variable_ids.len(),
            });
        }
        Ok(Self { _private: () })
    }

    /// One deterministic synthesis of the whole circuit: input bits,
    /// hasher internals, then output bits bound to the digest. Both
    /// protocol phases run this same shape, so variable indices agree
    /// between the declare and assign passes.
    fn synthesize(
        &self,
        pb: &mut Protoboard,
        bits: Option<&[bool]>,
    ) -> Result<Vec<Boolean>, SynthesisError> {
        let mut input_bits = Vec::with_capacity(INPUT_BITS);
        for i in 0..INPUT_BITS {
            let value = bits.map(|bits| bits[i]);
            let bit = AllocatedBit::alloc(pb.namespace(|| format!("input {i}")), value)?;
            input_bits.push(Boolean::from(bit));
        }

        let digest = sha256_block_no_padding(pb.namespace(|| "sha256"), &input_bits)?;

        let mut outputs = Vec::with_capacity(OUTPUT_BITS);
        for (i, digest_bit) in digest.iter().enumerate() {
            let out =
                AllocatedBit::alloc(pb.namespace(|| format!("output {i}")), digest_bit.get_value())?;
            let out = Boolean::from(out);
            Boolean::enforce_equal(
                pb.namespace(|| format!("output {i} binding")),
                &out,
                digest_bit,
            )?;
            outputs.push(out);
        }
        Ok(outputs)
    }
}

impl Gadget for Sha256Compress {
    fn num_inputs(&self) -> usize {
        INPUT_BITS
    }

    fn num_outputs(&self) -> usize {
        OUTPUT_BITS
    }

    fn generate_constraints(&mut self, pb: &mut Protoboard) -> Result<(), GadgetError> {
        self.synthesize(pb, None)?;
        Ok(())
    }

    fn generate_witness(
        &mut self,
        pb: &mut Protoboard,
        inputs: &[CircuitScalar],
    ) -> Result<Vec<CircuitScalar>, GadgetError> {
        if inputs.len() != INPUT_BITS {
            return Err(ContractError::WitnessInputLength {
                expected: INPUT_BITS,
                got: inputs.len(),
            }
            .into());
        }

        // Recover bits by exact equality with one; every other element is
        // false.
        let bits: Vec<bool> = inputs
            .iter()
            .map(|element| *element == CircuitScalar::ONE)
            .collect();

        pb.begin_assignment();
        let outputs = self.synthesize(pb, Some(&bits))?;

        outputs
            .iter()
            .map(|bit| {
                bit.get_value()
                    .map(|bit| {
                        if bit {
                            CircuitScalar::ONE
                        } else {
                            CircuitScalar::ZERO
                        }
                    })
                    .ok_or(GadgetError::Synthesis(SynthesisError::AssignmentMissing))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> GadgetInstance {
        GadgetInstance {
            incoming_variable_ids: (1..=INPUT_BITS as u64).collect(),
            outgoing_variable_ids: (INPUT_BITS as u64 + 1..=(INPUT_BITS + OUTPUT_BITS) as u64)
                .collect(),
            free_variable_id_before: (INPUT_BITS + OUTPUT_BITS) as u64 + 1,
        }
    }

    #[test]
    fn arity_checks_run_before_any_work() {
        let mut bad = instance();
        bad.incoming_variable_ids.pop();
        assert!(matches!(
            Sha256Compress::from_instance(&bad),
            Err(ContractError::IncomingArity { .. })
        ));

        let mut bad = instance();
        bad.outgoing_variable_ids.push(0);
        assert!(matches!(
            Sha256Compress::from_instance(&bad),
            Err(ContractError::OutgoingArity { .. })
        ));
    }

    #[test]
    fn witness_input_length_is_a_contract_error() {
        let mut gadget = Sha256Compress::from_instance(&instance()).unwrap();
        let mut pb = Protoboard::new();
        let err = gadget
            .generate_witness(&mut pb, &[CircuitScalar::ONE; 3])
            .unwrap_err();
        assert!(matches!(
            err,
            GadgetError::Contract(ContractError::WitnessInputLength { .. })
        ));
    }

    #[test]
    fn witness_satisfies_declared_constraints() {
        let mut gadget = Sha256Compress::from_instance(&instance()).unwrap();
        let mut pb = Protoboard::new();
        gadget.generate_constraints(&mut pb).unwrap();
        let declared_vars = pb.num_variables();
        let declared_constraints = pb.num_constraints();

        let inputs = vec![CircuitScalar::ZERO; INPUT_BITS];
        let outputs = gadget.generate_witness(&mut pb, &inputs).unwrap();

        assert_eq!(outputs.len(), OUTPUT_BITS);
        assert_eq!(pb.num_variables(), declared_vars);
        assert_eq!(pb.num_constraints(), declared_constraints);
        assert!(pb.is_satisfied());
    }
}
