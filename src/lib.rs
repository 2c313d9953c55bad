#![forbid(unsafe_code)]

//! Invocation bridge for independently built R1CS gadgets.
//!
//! A gadget host ("the caller") drives circuit components that were
//! compiled separately from it: each gadget allocates variables inside a
//! shared rank-1 constraint system, emits the constraints defining its
//! function, and — given concrete inputs — computes the witness for its
//! own variables. This crate implements the invocation side of that
//! boundary:
//!
//! * [`gadget`] — the gadget capability set, instance metadata and the
//!   built-in SHA-256 two-to-one compression gadget;
//! * [`protoboard`] — the constraint-system handle gadgets synthesize
//!   into, built on `bellpepper-core`;
//! * [`messages`] — the typed call/return/report envelopes, their
//!   canonical codec and the global variable-numbering map;
//! * [`dispatch`] — the per-call state machine streaming reports and
//!   building the final response;
//! * [`ser`] — the little-endian serialization vocabulary shared by all
//!   envelopes;
//! * [`params`] — the process-wide field parameter barrier.
//!
//! Variable identifiers form a single monotonically increasing
//! namespace shared by every gadget invoked against one constraint
//! system: a call binds its inputs and outputs to caller-chosen ids and
//! claims locals from `free_variable_id_before` upward, reporting the
//! new high-water mark in its response. Consecutive calls chain on that
//! value and never collide.
//!
//! ```
//! use r1cs_bridge::gadget::{GadgetInstance, INPUT_BITS, OUTPUT_BITS};
//! use r1cs_bridge::messages::{ComponentCall, Message};
//! use r1cs_bridge::{call_gadget, VecSink};
//!
//! let first_input = 1u64;
//! let instance = GadgetInstance {
//!     incoming_variable_ids: (first_input..first_input + INPUT_BITS as u64).collect(),
//!     outgoing_variable_ids: (513..513 + OUTPUT_BITS as u64).collect(),
//!     free_variable_id_before: 769,
//! };
//! let request = Message::Call(ComponentCall {
//!     instance,
//!     generate_r1cs: true,
//!     generate_assignment: false,
//!     inputs: Vec::new(),
//! })
//! .encode()
//! .unwrap();
//!
//! let mut reports = VecSink::new();
//! let mut response = VecSink::new();
//! call_gadget(&request, Some(&mut reports), Some(&mut response)).unwrap();
//! assert_eq!(reports.len(), 1);
//! assert_eq!(response.len(), 1);
//! ```

pub mod dispatch;
pub mod gadget;
pub mod messages;
pub mod params;
pub mod protoboard;
pub mod ser;

pub use dispatch::{call_gadget, dispatch_call, CallError, CallResult, ReportSink, VecSink, WriteSink};
pub use gadget::{Gadget, GadgetInstance, Sha256Compress};
pub use params::{CircuitScalar, FieldParams};
