//! Invocation message layer: typed envelopes and their canonical codec.
//!
//! Pure transformation, no business logic. Every message is framed as a
//! `u32` little-endian size prefix covering the payload, followed by a
//! one-byte message type and the body:
//!
//! | type | message |
//! |------|---------|
//! | 1 | [`ComponentCall`] |
//! | 2 | [`ComponentReturn`] |
//! | 3 | [`ConstraintsReport`] |
//! | 4 | [`AssignmentReport`] |
//!
//! The layer also owns the variable-numbering discipline:
//! [`VariableMap`] remaps a gadget's protoboard-local indices into the
//! global identifier namespace shared by every gadget invoked against
//! one constraint system, which is what lets independently compiled
//! gadgets compose without collisions.

use bellpepper_core::{Index, LinearCombination};

use crate::gadget::GadgetInstance;
use crate::params::CircuitScalar;
use crate::protoboard::Protoboard;
use crate::ser::{
    read_bool, read_element_vec, read_option, read_string, read_u32, read_u64, read_u64_vec,
    read_u8, write_bool, write_element, write_element_vec, write_option, write_string, write_u32,
    write_u64, write_u64_vec, write_u8, ByteReader, SerError, SerKind, SerResult,
};

const MESSAGE_TYPE_CALL: u8 = 1;
const MESSAGE_TYPE_RETURN: u8 = 2;
const MESSAGE_TYPE_CONSTRAINTS: u8 = 3;
const MESSAGE_TYPE_ASSIGNMENT: u8 = 4;

/// Request driving one gadget invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCall {
    /// Instance metadata binding the gadget into the shared namespace.
    pub instance: GadgetInstance,
    /// Whether to run the constraint phase.
    pub generate_r1cs: bool,
    /// Whether to run the witness phase.
    pub generate_assignment: bool,
    /// Concrete input elements, one per input variable. Present on the
    /// wire iff `generate_assignment` is set; empty otherwise.
    pub inputs: Vec<CircuitScalar>,
}

/// Final response of one gadget invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentReturn {
    /// New high-water mark of the shared variable namespace.
    pub free_variable_id_after: u64,
    /// Structured protocol error, if the call failed recoverably.
    pub error: Option<String>,
    /// Output elements, present only when the witness phase ran.
    pub outputs: Option<Vec<CircuitScalar>>,
}

/// One term of a linear combination, in global identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// Global variable identifier.
    pub id: u64,
    /// Coefficient applied to the variable.
    pub coeff: CircuitScalar,
}

/// One rank-1 constraint `A * B = C` in global identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct R1csConstraint {
    /// Left linear combination.
    pub a: Vec<Term>,
    /// Right linear combination.
    pub b: Vec<Term>,
    /// Output linear combination.
    pub c: Vec<Term>,
}

/// One entry of the variable-assignment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentEntry {
    /// Global variable identifier.
    pub id: u64,
    /// Witness value stored for the variable.
    pub value: CircuitScalar,
}

/// Streamed report carrying the full constraint list emitted so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintsReport {
    /// Instance the constraints belong to.
    pub instance: GadgetInstance,
    /// Constraints in emission order, ids remapped globally.
    pub constraints: Vec<R1csConstraint>,
}

/// Streamed report carrying the full variable-assignment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Instance the assignment belongs to.
    pub instance: GadgetInstance,
    /// Assignment entries in allocation order, ids remapped globally.
    pub assignment: Vec<AssignmentEntry>,
}

/// Any message of the invocation protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Request envelope.
    Call(ComponentCall),
    /// Response envelope.
    Return(ComponentReturn),
    /// Streamed constraints report.
    Constraints(ConstraintsReport),
    /// Streamed assignment report.
    Assignment(AssignmentReport),
}

impl Message {
    /// Encodes the message as a size-prefixed envelope.
    pub fn encode(&self) -> SerResult<Vec<u8>> {
        let mut body = Vec::new();
        match self {
            Message::Call(call) => {
                write_u8(&mut body, MESSAGE_TYPE_CALL);
                encode_call(&mut body, call)?;
            }
            Message::Return(ret) => {
                write_u8(&mut body, MESSAGE_TYPE_RETURN);
                encode_return(&mut body, ret)?;
            }
            Message::Constraints(report) => {
                write_u8(&mut body, MESSAGE_TYPE_CONSTRAINTS);
                encode_constraints(&mut body, report)?;
            }
            Message::Assignment(report) => {
                write_u8(&mut body, MESSAGE_TYPE_ASSIGNMENT);
                encode_assignment(&mut body, report)?;
            }
        }

        let mut out = Vec::with_capacity(body.len() + 4);
        let len = crate::ser::ensure_u32(body.len(), SerKind::Envelope, "size prefix")?;
        write_u32(&mut out, len);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decodes a size-prefixed envelope into a typed message.
    pub fn decode(bytes: &[u8]) -> SerResult<Self> {
        let mut cursor = ByteReader::new(bytes);
        let len = read_u32(&mut cursor, SerKind::Envelope, "size prefix")? as usize;
        if len != cursor.remaining() {
            return Err(SerError::invalid_length(SerKind::Envelope, "size prefix"));
        }

        let message = match read_u8(&mut cursor, SerKind::Envelope, "message type")? {
            MESSAGE_TYPE_CALL => Message::Call(decode_call(&mut cursor)?),
            MESSAGE_TYPE_RETURN => Message::Return(decode_return(&mut cursor)?),
            MESSAGE_TYPE_CONSTRAINTS => Message::Constraints(decode_constraints(&mut cursor)?),
            MESSAGE_TYPE_ASSIGNMENT => Message::Assignment(decode_assignment(&mut cursor)?),
            _ => return Err(SerError::invalid_value(SerKind::Envelope, "message type")),
        };

        cursor.finish(SerKind::Envelope)?;
        Ok(message)
    }
}

fn encode_instance(out: &mut Vec<u8>, instance: &GadgetInstance) -> SerResult<()> {
    write_u64_vec(
        out,
        &instance.incoming_variable_ids,
        SerKind::Instance,
        "incoming variable ids",
    )?;
    write_u64_vec(
        out,
        &instance.outgoing_variable_ids,
        SerKind::Instance,
        "outgoing variable ids",
    )?;
    write_u64(out, instance.free_variable_id_before);
    Ok(())
}

fn decode_instance(cursor: &mut ByteReader<'_>) -> SerResult<GadgetInstance> {
    Ok(GadgetInstance {
        incoming_variable_ids: read_u64_vec(cursor, SerKind::Instance, "incoming variable ids")?,
        outgoing_variable_ids: read_u64_vec(cursor, SerKind::Instance, "outgoing variable ids")?,
        free_variable_id_before: read_u64(cursor, SerKind::Instance, "free variable id before")?,
    })
}

fn encode_call(out: &mut Vec<u8>, call: &ComponentCall) -> SerResult<()> {
    encode_instance(out, &call.instance)?;
    write_bool(out, call.generate_r1cs);
    write_bool(out, call.generate_assignment);
    if call.generate_assignment {
        write_element_vec(out, &call.inputs, SerKind::Call, "inputs")?;
    }
    Ok(())
}

fn decode_call(cursor: &mut ByteReader<'_>) -> SerResult<ComponentCall> {
    let instance = decode_instance(cursor)?;
    let generate_r1cs = read_bool(cursor, SerKind::Call, "generate r1cs")?;
    let generate_assignment = read_bool(cursor, SerKind::Call, "generate assignment")?;
    let inputs = if generate_assignment {
        read_element_vec(cursor, SerKind::Call, "inputs")?
    } else {
        Vec::new()
    };
    Ok(ComponentCall {
        instance,
        generate_r1cs,
        generate_assignment,
        inputs,
    })
}

fn encode_return(out: &mut Vec<u8>, ret: &ComponentReturn) -> SerResult<()> {
    write_u64(out, ret.free_variable_id_after);
    write_option(out, &ret.error, |out, error| {
        write_string(out, error, SerKind::Return, "error")
    })?;
    write_option(out, &ret.outputs, |out, outputs| {
        write_element_vec(out, outputs, SerKind::Return, "outputs")
    })?;
    Ok(())
}

fn decode_return(cursor: &mut ByteReader<'_>) -> SerResult<ComponentReturn> {
    Ok(ComponentReturn {
        free_variable_id_after: read_u64(cursor, SerKind::Return, "free variable id after")?,
        error: read_option(cursor, SerKind::Return, "error", |cursor| {
            read_string(cursor, SerKind::Return, "error")
        })?,
        outputs: read_option(cursor, SerKind::Return, "outputs", |cursor| {
            read_element_vec(cursor, SerKind::Return, "outputs")
        })?,
    })
}

fn encode_terms(
    out: &mut Vec<u8>,
    terms: &[Term],
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    let count = crate::ser::ensure_u32(terms.len(), kind, field)?;
    write_u32(out, count);
    for term in terms {
        write_u64(out, term.id);
        write_element(out, &term.coeff);
    }
    Ok(())
}

fn decode_terms(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<Vec<Term>> {
    let count = read_u32(cursor, kind, field)? as usize;
    if count.saturating_mul(8 + crate::params::ELEMENT_SIZE) > cursor.remaining() {
        return Err(SerError::invalid_length(kind, field));
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(Term {
            id: read_u64(cursor, kind, field)?,
            coeff: crate::ser::read_element(cursor, kind, field)?,
        });
    }
    Ok(out)
}

fn encode_constraints(out: &mut Vec<u8>, report: &ConstraintsReport) -> SerResult<()> {
    encode_instance(out, &report.instance)?;
    let kind = SerKind::ConstraintsReport;
    let count = crate::ser::ensure_u32(report.constraints.len(), kind, "constraints")?;
    write_u32(out, count);
    for constraint in &report.constraints {
        encode_terms(out, &constraint.a, kind, "a terms")?;
        encode_terms(out, &constraint.b, kind, "b terms")?;
        encode_terms(out, &constraint.c, kind, "c terms")?;
    }
    Ok(())
}

fn decode_constraints(cursor: &mut ByteReader<'_>) -> SerResult<ConstraintsReport> {
    let instance = decode_instance(cursor)?;
    let kind = SerKind::ConstraintsReport;
    let count = read_u32(cursor, kind, "constraints")? as usize;
    // Every constraint occupies at least three term-count prefixes.
    if count.saturating_mul(12) > cursor.remaining() {
        return Err(SerError::invalid_length(kind, "constraints"));
    }
    let mut constraints = Vec::with_capacity(count);
    for _ in 0..count {
        constraints.push(R1csConstraint {
            a: decode_terms(cursor, kind, "a terms")?,
            b: decode_terms(cursor, kind, "b terms")?,
            c: decode_terms(cursor, kind, "c terms")?,
        });
    }
    Ok(ConstraintsReport {
        instance,
        constraints,
    })
}

fn encode_assignment(out: &mut Vec<u8>, report: &AssignmentReport) -> SerResult<()> {
    encode_instance(out, &report.instance)?;
    let kind = SerKind::AssignmentReport;
    let count = crate::ser::ensure_u32(report.assignment.len(), kind, "assignment")?;
    write_u32(out, count);
    for entry in &report.assignment {
        write_u64(out, entry.id);
        write_element(out, &entry.value);
    }
    Ok(())
}

fn decode_assignment(cursor: &mut ByteReader<'_>) -> SerResult<AssignmentReport> {
    let instance = decode_instance(cursor)?;
    let kind = SerKind::AssignmentReport;
    let count = read_u32(cursor, kind, "assignment")? as usize;
    if count.saturating_mul(8 + crate::params::ELEMENT_SIZE) > cursor.remaining() {
        return Err(SerError::invalid_length(kind, "assignment"));
    }
    let mut assignment = Vec::with_capacity(count);
    for _ in 0..count {
        assignment.push(AssignmentEntry {
            id: read_u64(cursor, kind, "assignment id")?,
            value: crate::ser::read_element(cursor, kind, "assignment value")?,
        });
    }
    Ok(AssignmentReport {
        instance,
        assignment,
    })
}

/// Remaps a gadget's protoboard-local variable indices into the global
/// identifier namespace.
///
/// The gadget layout discipline (inputs first, outputs last, locals in
/// between) makes the map total: input positions resolve to
/// `incoming_variable_ids`, output positions to
/// `outgoing_variable_ids`, and locals to the contiguous range starting
/// at `free_variable_id_before`. The constant-one wire resolves to
/// global id 0.
#[derive(Debug, Clone, Copy)]
pub struct VariableMap<'a> {
    instance: &'a GadgetInstance,
    num_inputs: usize,
    num_outputs: usize,
    total_variables: usize,
}

impl<'a> VariableMap<'a> {
    /// Builds the map for a gadget whose synthesis allocated
    /// `total_variables` variables.
    pub fn new(
        instance: &'a GadgetInstance,
        num_inputs: usize,
        num_outputs: usize,
        total_variables: usize,
    ) -> Self {
        debug_assert!(total_variables >= num_inputs + num_outputs);
        Self {
            instance,
            num_inputs,
            num_outputs,
            total_variables,
        }
    }

    /// Number of local variables the gadget allocated.
    pub fn num_locals(&self) -> usize {
        self.total_variables - self.num_inputs - self.num_outputs
    }

    /// Resolves one protoboard index to its global identifier.
    pub fn global_id(&self, index: Index) -> u64 {
        let first_output = self.total_variables - self.num_outputs;
        match index {
            Index::Input(i) => i as u64,
            Index::Aux(i) if i < self.num_inputs => self.instance.incoming_variable_ids[i],
            Index::Aux(i) if i >= first_output => {
                self.instance.outgoing_variable_ids[i - first_output]
            }
            Index::Aux(i) => self.instance.free_variable_id_before + (i - self.num_inputs) as u64,
        }
    }
}

fn lc_terms(lc: &LinearCombination<CircuitScalar>, map: &VariableMap<'_>) -> Vec<Term> {
    lc.iter()
        .map(|(variable, coeff)| Term {
            id: map.global_id(variable.get_unchecked()),
            coeff: *coeff,
        })
        .collect()
}

/// Builds the constraints report for the protoboard's current state,
/// with every variable reference remapped globally.
pub fn constraints_report(
    instance: &GadgetInstance,
    pb: &Protoboard,
    num_inputs: usize,
    num_outputs: usize,
) -> ConstraintsReport {
    let map = VariableMap::new(instance, num_inputs, num_outputs, pb.num_variables());
    let constraints = pb
        .constraints()
        .iter()
        .map(|entry| R1csConstraint {
            a: lc_terms(&entry.a, &map),
            b: lc_terms(&entry.b, &map),
            c: lc_terms(&entry.c, &map),
        })
        .collect();
    ConstraintsReport {
        instance: instance.clone(),
        constraints,
    }
}

/// Builds the assignment report for the protoboard's current state: the
/// full variable-assignment table in allocation order.
pub fn assignment_report(
    instance: &GadgetInstance,
    pb: &Protoboard,
    num_inputs: usize,
    num_outputs: usize,
) -> AssignmentReport {
    let map = VariableMap::new(instance, num_inputs, num_outputs, pb.num_variables());
    let assignment = pb
        .assignment()
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            value.map(|value| AssignmentEntry {
                id: map.global_id(Index::Aux(i)),
                value,
            })
        })
        .collect();
    AssignmentReport {
        instance: instance.clone(),
        assignment,
    }
}
