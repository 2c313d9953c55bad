//! Shared constraint-system handle gadgets synthesize into.
//!
//! [`Protoboard`] is the capability every gadget receives explicitly: it
//! stores named variables, their witness values and the R1CS constraints
//! a gadget emits, and it implements
//! [`bellpepper_core::ConstraintSystem`] so the ecosystem's circuit
//! gadgets can drive it directly.
//!
//! A protoboard runs in one of two passes. The *declare* pass (the
//! default) records the allocation order and the constraints without
//! evaluating assignment closures, which keeps constraint-only calls free
//! of witness work. [`Protoboard::begin_assignment`] switches to the
//! *assign* pass: a second synthesis of the same circuit replays the
//! allocation order, evaluates every closure and fills the witness
//! column, while already-recorded constraints are skipped. Synthesis is
//! deterministic, so both passes see identical variable indices.
//!
//! Variables live in the protoboard's local aux namespace; the message
//! layer remaps them into the caller's global namespace when a report is
//! serialized. `Index::Input(0)` is the conventional constant-one wire.

use bellpepper_core::{ConstraintSystem, Index, LinearCombination, SynthesisError, Variable};
use ff::Field;

use crate::params::CircuitScalar;

/// One recorded rank-1 constraint `A * B = C` with its namespace path.
#[derive(Clone, Debug)]
pub struct ConstraintEntry {
    /// Left linear combination.
    pub a: LinearCombination<CircuitScalar>,
    /// Right linear combination.
    pub b: LinearCombination<CircuitScalar>,
    /// Output linear combination.
    pub c: LinearCombination<CircuitScalar>,
    /// Human-readable path assigned at `enforce` time.
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Declare,
    Assign,
}

/// In-memory constraint system recording variables, constraints and the
/// witness assignment for one gadget call.
#[derive(Debug)]
pub struct Protoboard {
    input_names: Vec<String>,
    input_values: Vec<Option<CircuitScalar>>,
    aux_names: Vec<String>,
    aux_values: Vec<Option<CircuitScalar>>,
    constraints: Vec<ConstraintEntry>,
    path: Vec<String>,
    pass: Pass,
    alloc_cursor: usize,
    enforce_cursor: usize,
}

impl Protoboard {
    /// Creates an empty protoboard in the declare pass. The constant-one
    /// wire occupies `Index::Input(0)`.
    pub fn new() -> Self {
        Self {
            input_names: vec!["one".to_string()],
            input_values: vec![Some(CircuitScalar::ONE)],
            aux_names: Vec::new(),
            aux_values: Vec::new(),
            constraints: Vec::new(),
            path: Vec::new(),
            pass: Pass::Declare,
            alloc_cursor: 0,
            enforce_cursor: 0,
        }
    }

    /// Switches the protoboard into the assign pass. The next synthesis
    /// replays the declared allocation order and stores witness values;
    /// constraints recorded during the declare pass are not duplicated.
    pub fn begin_assignment(&mut self) {
        self.pass = Pass::Assign;
        self.alloc_cursor = 0;
        self.enforce_cursor = 0;
        self.path.clear();
    }

    /// Total number of variables the gadget has allocated.
    pub fn num_variables(&self) -> usize {
        self.aux_values.len()
    }

    /// Number of recorded constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Recorded constraints in emission order.
    pub fn constraints(&self) -> &[ConstraintEntry] {
        &self.constraints
    }

    /// Witness column for gadget-allocated variables, in allocation
    /// order. Entries are `None` until the assign pass stores them.
    pub fn assignment(&self) -> &[Option<CircuitScalar>] {
        &self.aux_values
    }

    /// Witness value of one gadget-allocated variable.
    pub fn value(&self, index: usize) -> Option<CircuitScalar> {
        self.aux_values.get(index).copied().flatten()
    }

    /// Name recorded for one gadget-allocated variable.
    pub fn variable_name(&self, index: usize) -> Option<&str> {
        self.aux_names.get(index).map(String::as_str)
    }

    /// Evaluates a linear combination against the stored witness. `None`
    /// if any referenced variable has no value yet.
    pub fn eval(&self, lc: &LinearCombination<CircuitScalar>) -> Option<CircuitScalar> {
        let mut acc = CircuitScalar::ZERO;
        for (variable, coeff) in lc.iter() {
            let value = match variable.get_unchecked() {
                Index::Input(i) => (*self.input_values.get(i)?)?,
                Index::Aux(i) => (*self.aux_values.get(i)?)?,
            };
            acc += value * coeff;
        }
        Some(acc)
    }

    /// Checks every recorded constraint against the stored witness.
    pub fn is_satisfied(&self) -> bool {
        self.constraints.iter().all(|entry| {
            match (self.eval(&entry.a), self.eval(&entry.b), self.eval(&entry.c)) {
                (Some(a), Some(b), Some(c)) => a * b == c,
                _ => false,
            }
        })
    }

    fn compute_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            let mut path = self.path.join("/");
            path.push('/');
            path.push_str(name);
            path
        }
    }
}

impl Default for Protoboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSystem<CircuitScalar> for Protoboard {
    type Root = Self;

    fn alloc<F, A, AR>(&mut self, annotation: A, f: F) -> Result<Variable, SynthesisError>
    where
        F: FnOnce() -> Result<CircuitScalar, SynthesisError>,
        A: FnOnce() -> AR,
        AR: Into<String>,
    {
        match self.pass {
            Pass::Declare => {
                let index = self.aux_values.len();
                self.aux_names.push(self.compute_path(&annotation().into()));
                self.aux_values.push(None);
                Ok(Variable::new_unchecked(Index::Aux(index)))
            }
            Pass::Assign => {
                let index = self.alloc_cursor;
                let value = f()?;
                if index < self.aux_values.len() {
                    self.aux_values[index] = Some(value);
                } else {
                    // Assign pass without a prior declare pass: grow the
                    // allocation as we go.
                    self.aux_names.push(self.compute_path(&annotation().into()));
                    self.aux_values.push(Some(value));
                }
                self.alloc_cursor += 1;
                Ok(Variable::new_unchecked(Index::Aux(index)))
            }
        }
    }

    fn alloc_input<F, A, AR>(&mut self, annotation: A, f: F) -> Result<Variable, SynthesisError>
    where
        F: FnOnce() -> Result<CircuitScalar, SynthesisError>,
        A: FnOnce() -> AR,
        AR: Into<String>,
    {
        // Gadgets own no public inputs in this protocol; the slot exists
        // so the protoboard stays a complete `ConstraintSystem`.
        let index = self.input_values.len();
        self.input_names.push(self.compute_path(&annotation().into()));
        self.input_values.push(f().ok());
        Ok(Variable::new_unchecked(Index::Input(index)))
    }

    fn enforce<A, AR, LA, LB, LC>(&mut self, annotation: A, a: LA, b: LB, c: LC)
    where
        A: FnOnce() -> AR,
        AR: Into<String>,
        LA: FnOnce(LinearCombination<CircuitScalar>) -> LinearCombination<CircuitScalar>,
        LB: FnOnce(LinearCombination<CircuitScalar>) -> LinearCombination<CircuitScalar>,
        LC: FnOnce(LinearCombination<CircuitScalar>) -> LinearCombination<CircuitScalar>,
    {
        if self.pass == Pass::Assign && self.enforce_cursor < self.constraints.len() {
            // Replay of a constraint recorded during the declare pass.
            self.enforce_cursor += 1;
            return;
        }
        self.constraints.push(ConstraintEntry {
            a: a(LinearCombination::zero()),
            b: b(LinearCombination::zero()),
            c: c(LinearCombination::zero()),
            name: self.compute_path(&annotation().into()),
        });
        if self.pass == Pass::Assign {
            self.enforce_cursor = self.constraints.len();
        }
    }

    fn push_namespace<NR, N>(&mut self, name_fn: N)
    where
        NR: Into<String>,
        N: FnOnce() -> NR,
    {
        self.path.push(name_fn().into());
    }

    fn pop_namespace(&mut self) {
        self.path.pop();
    }

    fn get_root(&mut self) -> &mut Self::Root {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellpepper_core::boolean::AllocatedBit;

    fn toy_synthesis(pb: &mut Protoboard, bit: Option<bool>) -> Variable {
        let allocated = AllocatedBit::alloc(pb.namespace(|| "flag"), bit).unwrap();
        allocated.get_variable()
    }

    #[test]
    fn declare_then_assign_replays_indices() {
        let mut pb = Protoboard::new();
        let declared = toy_synthesis(&mut pb, None);
        assert_eq!(pb.num_variables(), 1);
        assert_eq!(pb.num_constraints(), 1);
        assert_eq!(pb.value(0), None);

        pb.begin_assignment();
        let assigned = toy_synthesis(&mut pb, Some(true));
        assert_eq!(declared.get_unchecked(), assigned.get_unchecked());
        assert_eq!(pb.num_variables(), 1);
        assert_eq!(pb.num_constraints(), 1, "replay must not duplicate constraints");
        assert_eq!(pb.value(0), Some(CircuitScalar::ONE));
        assert!(pb.is_satisfied());
    }

    #[test]
    fn assign_without_declare_grows_allocation() {
        let mut pb = Protoboard::new();
        pb.begin_assignment();
        toy_synthesis(&mut pb, Some(false));
        assert_eq!(pb.num_variables(), 1);
        assert_eq!(pb.value(0), Some(CircuitScalar::ZERO));
        assert!(pb.is_satisfied());
    }

    #[test]
    fn namespace_paths_are_recorded() {
        let mut pb = Protoboard::new();
        {
            let mut ns = pb.namespace(|| "outer");
            AllocatedBit::alloc(ns.namespace(|| "inner"), None).unwrap();
        }
        assert_eq!(pb.variable_name(0), Some("outer/inner/boolean"));
    }

    #[test]
    fn unsatisfied_constraint_is_detected() {
        let mut pb = Protoboard::new();
        pb.begin_assignment();
        // Claim two is a bit; the booleanity constraint must fail.
        let var = pb
            .alloc(|| "not a bit", || Ok(CircuitScalar::from(2u64)))
            .unwrap();
        pb.enforce(
            || "booleanity",
            |lc| lc + var,
            |lc| lc + Protoboard::one() - var,
            |lc| lc,
        );
        assert!(!pb.is_satisfied());
    }
}
